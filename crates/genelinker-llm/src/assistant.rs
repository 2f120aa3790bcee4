//! The research assistant: question answering, gene linking and paper
//! analysis over an [`LlmBackend`], with canned fallbacks on failure.

use std::sync::Arc;
use std::time::Instant;

use genelinker_common::confidence::{self, ANSWER_BAND, GENE_BAND};
use genelinker_common::{require_input, AnalysisResult, GeneReport, Persona, QueryOutcome, Result};

use crate::audit::LlmAuditEntry;
use crate::backend::{LlmBackend, LlmError, LlmRequest, LlmResponse};
use crate::fallback::{self, GENERIC_SOURCES, GENE_FALLBACK_CONFIDENCE, MOCK_ANALYSIS_CONFIDENCE};
use crate::prompts;

/// Sources attached to live answers.
pub const CURATED_SOURCES: &[&str] = &[
    "Nature Genetics (2024)",
    "Cell Biology Reviews (2023)",
    "PubMed Central Database",
];

pub struct ResearchAssistant {
    backend: Arc<dyn LlmBackend>,
    persona: Persona,
}

impl ResearchAssistant {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend, persona: Persona::default() }
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn set_persona(&mut self, persona: Persona) {
        self.persona = persona;
    }

    /// Answer a research question. Provider failures produce a canned
    /// `Degraded` answer; only blank input is an error.
    pub async fn ask(&self, question: &str) -> Result<QueryOutcome<String>> {
        let question = require_input("question", question)?;
        let req = prompts::question_request(question, self.persona);
        match self.call("ask", req).await {
            Ok(resp) => Ok(QueryOutcome::Success {
                confidence: confidence::synthesize(&resp.content, ANSWER_BAND),
                value: resp.content,
                sources: owned(CURATED_SOURCES),
            }),
            Err(err) => {
                let canned = fallback::answer_for(question);
                tracing::warn!(error = %err, "question answered from fallback table");
                Ok(QueryOutcome::Degraded {
                    value: canned.answer.to_string(),
                    confidence: canned.confidence,
                    sources: canned.sources_owned(),
                    reason: err.fallback_reason(),
                })
            }
        }
    }

    /// Summarize a gene and attach keywords and literature pointers.
    pub async fn link_gene(&self, gene_id: &str) -> Result<QueryOutcome<GeneReport>> {
        let gene_id = require_input("gene id", gene_id)?;
        let req = prompts::gene_request(gene_id, self.persona);
        match self.call("gene", req).await {
            Ok(resp) => {
                let symbol = gene_id.to_uppercase();
                let report = GeneReport {
                    keywords: fallback::extract_keywords(&resp.content),
                    papers: fallback::generated_papers(&symbol),
                    gene_id: symbol,
                    summary: resp.content,
                };
                Ok(QueryOutcome::Success {
                    confidence: confidence::synthesize(&report.summary, GENE_BAND),
                    value: report,
                    sources: owned(CURATED_SOURCES),
                })
            }
            Err(err) => {
                tracing::warn!(gene = gene_id, error = %err, "gene summary taken from local profiles");
                Ok(QueryOutcome::Degraded {
                    value: fallback::gene_report(gene_id),
                    confidence: GENE_FALLBACK_CONFIDENCE,
                    sources: owned(GENERIC_SOURCES),
                    reason: err.fallback_reason(),
                })
            }
        }
    }

    /// Ask the model for a structured analysis of `paper_text`.
    ///
    /// A reply that is not valid analysis JSON is treated like a failed call.
    /// `title` labels the result when the model does not supply one.
    pub async fn analyze_paper(&self, title: &str, paper_text: &str) -> Result<QueryOutcome<AnalysisResult>> {
        let paper_text = require_input("paper content", paper_text)?;
        let title = title.trim();
        let req = prompts::analysis_request(paper_text, self.persona);
        let parsed = self
            .call("analyze", req)
            .await
            .and_then(|resp| parse_analysis(&resp.content));
        match parsed {
            Ok(analysis) => {
                let analysis = if analysis.title.trim().is_empty() { analysis.with_title(title) } else { analysis };
                Ok(QueryOutcome::Success {
                    confidence: analysis.confidence_score,
                    sources: vec![format!("{} analysis", self.backend.model_id())],
                    value: analysis,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "paper analysis replaced by mock analysis");
                Ok(QueryOutcome::Degraded {
                    value: fallback::mock_analysis(title),
                    confidence: MOCK_ANALYSIS_CONFIDENCE,
                    sources: owned(GENERIC_SOURCES),
                    reason: err.fallback_reason(),
                })
            }
        }
    }

    async fn call(&self, operation: &str, req: LlmRequest) -> std::result::Result<LlmResponse, LlmError> {
        let started = Instant::now();
        let result = self.backend.complete(req).await;
        let latency_ms = started.elapsed().as_millis() as u64;
        let entry = match &result {
            Ok(resp) => LlmAuditEntry::success(
                operation,
                self.backend.backend_name(),
                &resp.model,
                resp.prompt_tokens,
                resp.completion_tokens,
                &resp.content,
                latency_ms,
            ),
            Err(err) => LlmAuditEntry::failure(
                operation,
                self.backend.backend_name(),
                self.backend.model_id(),
                &err.fallback_reason().to_string(),
                latency_ms,
            ),
        };
        entry.record();
        result
    }
}

fn parse_analysis(content: &str) -> std::result::Result<AnalysisResult, LlmError> {
    let analysis: AnalysisResult = serde_json::from_str(prompts::strip_code_fence(content))?;
    let analysis = analysis.normalized();
    if analysis.summary.trim().is_empty() && analysis.key_findings.is_empty() {
        return Err(LlmError::Malformed("analysis has neither summary nor findings".to_string()));
    }
    Ok(analysis)
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Scripted, ScriptedBackend};
    use genelinker_common::FallbackReason;
    use pretty_assertions::assert_eq;

    fn assistant(backend: ScriptedBackend) -> (ResearchAssistant, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        (ResearchAssistant::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_ask_success_has_curated_sources() {
        let (assistant, backend) = assistant(ScriptedBackend::replying("p53 halts the cell cycle."));
        let outcome = assistant.ask("  What does p53 do? ").await.unwrap();
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value(), "p53 halts the cell cycle.");
        assert!(ANSWER_BAND.contains(&outcome.confidence()));
        assert_eq!(outcome.sources().len(), 3);
        assert_eq!(backend.requests()[0].messages[1].content, "What does p53 do?");
    }

    #[tokio::test]
    async fn test_ask_confidence_is_deterministic() {
        let backend = ScriptedBackend::new()
            .then(Scripted::Reply("same".into()))
            .then(Scripted::Reply("same".into()));
        let (assistant, _) = assistant(backend);
        let a = assistant.ask("q").await.unwrap().confidence();
        let b = assistant.ask("q").await.unwrap().confidence();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_ask_failure_uses_topic_fallback() {
        let (assistant, _) = assistant(ScriptedBackend::failing(LlmError::ApiError {
            status: 503,
            message: "overloaded".into(),
        }));
        let outcome = assistant.ask("What causes cancer?").await.unwrap();
        assert!(outcome.is_degraded());
        assert_eq!(outcome.reason(), Some(&FallbackReason::HttpStatus(503)));
        assert!(outcome.value().starts_with("Cancer involves"));
        assert_eq!(outcome.confidence(), 0.82);
    }

    #[tokio::test]
    async fn test_blank_question_makes_no_call() {
        let (assistant, backend) = assistant(ScriptedBackend::replying("unused"));
        let err = assistant.ask(" \n ").await.unwrap_err();
        assert!(err.is_user_input());
        assert!(assistant.link_gene("").await.unwrap_err().is_user_input());
        assert!(assistant.analyze_paper("t", "   ").await.unwrap_err().is_user_input());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_link_gene_success() {
        let (assistant, backend) = assistant(ScriptedBackend::replying(
            "KRAS is a GTPase; activating mutations drive tumor growth via MAPK signaling.",
        ));
        let outcome = assistant.link_gene("kras").await.unwrap();
        let report = outcome.value();
        assert_eq!(report.gene_id, "KRAS");
        assert_eq!(report.keywords[0], "cancer research");
        assert_eq!(report.papers.len(), 3);
        assert!(GENE_BAND.contains(&outcome.confidence()));
        assert_eq!(backend.requests()[0].temperature, Some(0.2));
    }

    #[tokio::test]
    async fn test_link_gene_failure_uses_profile() {
        let (assistant, _) = assistant(ScriptedBackend::failing(LlmError::Unavailable("no key".into())));
        let outcome = assistant.link_gene("tp53").await.unwrap();
        assert_eq!(outcome.reason(), Some(&FallbackReason::MissingCredential));
        assert_eq!(outcome.value().gene_id, "TP53");
        assert!(outcome.value().summary.contains("guardian of the genome"));
        assert_eq!(outcome.confidence(), 0.78);
    }

    #[tokio::test]
    async fn test_analyze_paper_parses_fenced_json() {
        let reply = r#"```json
        {"summary": "CRISPR screen of 18,000 genes", "keyFindings": ["A", "B"], "methodology": "Pooled screen",
         "conclusions": "", "research_gaps": ["C"], "future_directions": [], "confidence_score": 1.4}
        ```"#;
        let (assistant, _) = assistant(ScriptedBackend::replying(reply));
        let outcome = assistant.analyze_paper("Genome-wide screen", "full text").await.unwrap();
        assert!(!outcome.is_degraded());
        let analysis = outcome.value();
        assert_eq!(analysis.title, "Genome-wide screen");
        assert_eq!(analysis.key_findings, vec!["A", "B"]);
        assert_eq!(analysis.conclusions, None);
        assert_eq!(outcome.confidence(), 1.0);
        assert_eq!(outcome.sources(), &["scripted analysis".to_string()]);
    }

    #[tokio::test]
    async fn test_analyze_paper_invalid_json_is_malformed() {
        let (assistant, _) = assistant(ScriptedBackend::replying("Here is my analysis: it is good."));
        let outcome = assistant.analyze_paper("Paper", "text").await.unwrap();
        assert_eq!(outcome.reason(), Some(&FallbackReason::MalformedResponse));
        assert_eq!(outcome.value().title, "Paper");
        assert_eq!(outcome.value().key_findings.len(), 4);
    }

    #[tokio::test]
    async fn test_student_persona_reaches_backend() {
        let (assistant, backend) = assistant(ScriptedBackend::replying("ok"));
        let assistant = assistant.with_persona(Persona::Student);
        assistant.ask("What is a codon?").await.unwrap();
        assert!(backend.requests()[0].messages[0].content.contains("student"));
    }
}
