//! Prompt templates and per-operation sampling settings.

use genelinker_common::Persona;

use crate::backend::{LlmRequest, Message};

pub const RESEARCH_SYSTEM: &str = "You are a bioinformatics research assistant specializing in gene function \
analysis and molecular biology. Provide scientifically accurate, well-referenced responses to research \
questions. Focus on peer-reviewed research and established biological mechanisms.";

pub const ANALYSIS_SYSTEM: &str = r#"You are a scientific research analyst. Analyze the provided research paper and provide a comprehensive analysis including summary, key findings, methodology, conclusions, research gaps, and future directions. Respond with JSON only, using this structure:
{
  "title": "Short title of the paper",
  "summary": "Brief overview of the paper",
  "key_findings": ["finding1", "finding2"],
  "methodology": "Description of methods used",
  "conclusions": "Main conclusions",
  "research_gaps": ["gap1", "gap2"],
  "future_directions": ["direction1", "direction2"],
  "confidence_score": 0.85
}"#;

const STUDENT_SUFFIX: &str = " Explain your answer for a student without specialist training: define technical \
terms when they first appear and prefer short sentences.";

pub const QUESTION_TEMPERATURE: f32 = 0.3;
pub const QUESTION_MAX_TOKENS: u32 = 800;
pub const GENE_TEMPERATURE: f32 = 0.2;
pub const GENE_MAX_TOKENS: u32 = 500;
pub const ANALYSIS_TEMPERATURE: f32 = 0.3;
pub const ANALYSIS_MAX_TOKENS: u32 = 1500;

/// Paper text beyond this many characters is cut before prompting.
pub const MAX_PAPER_CHARS: usize = 12_000;

fn with_persona(system: &str, persona: Persona) -> String {
    match persona {
        Persona::Researcher => system.to_string(),
        Persona::Student => format!("{system}{STUDENT_SUFFIX}"),
    }
}

pub fn question_request(question: &str, persona: Persona) -> LlmRequest {
    LlmRequest {
        messages: vec![
            Message::system(with_persona(RESEARCH_SYSTEM, persona)),
            Message::user(question),
        ],
        model: None,
        max_tokens: Some(QUESTION_MAX_TOKENS),
        temperature: Some(QUESTION_TEMPERATURE),
    }
}

pub fn gene_request(gene_id: &str, persona: Persona) -> LlmRequest {
    let system = format!(
        "You are a molecular biology expert. Provide a concise scientific summary of the gene {gene_id}, \
         including its function, pathways, and clinical significance. Be factual and cite relevant research areas."
    );
    LlmRequest {
        messages: vec![
            Message::system(with_persona(&system, persona)),
            Message::user(format!(
                "Analyze gene {gene_id}: What is its function, what pathways is it involved in, \
                 and what are the key research areas surrounding this gene?"
            )),
        ],
        model: None,
        max_tokens: Some(GENE_MAX_TOKENS),
        temperature: Some(GENE_TEMPERATURE),
    }
}

pub fn analysis_request(paper_text: &str, persona: Persona) -> LlmRequest {
    let text: String = paper_text.chars().take(MAX_PAPER_CHARS).collect();
    LlmRequest {
        messages: vec![
            Message::system(with_persona(ANALYSIS_SYSTEM, persona)),
            Message::user(format!("Analyze this research paper: {text}")),
        ],
        model: None,
        max_tokens: Some(ANALYSIS_MAX_TOKENS),
        temperature: Some(ANALYSIS_TEMPERATURE),
    }
}

/// Strip a Markdown code fence the model may wrap around its JSON.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
