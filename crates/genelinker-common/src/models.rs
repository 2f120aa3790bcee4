//! Normalized records shared by the clients, the layout engine and the exporters.

use serde::{Deserialize, Serialize};

use crate::confidence::clamp_unit;

/// Audience the assistant writes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    Researcher,
    Student,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Researcher => "researcher",
            Persona::Student    => "student",
        }
    }
}

impl std::str::FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "researcher" => Ok(Persona::Researcher),
            "student"    => Ok(Persona::Student),
            other        => Err(format!("unknown persona '{other}' (expected researcher or student)")),
        }
    }
}

/// Structured summary of an AI analysis of a question or paper.
///
/// Accepts both snake_case and camelCase keys so it can be read straight
/// from a model's JSON answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, alias = "keyFindings")]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub methodology: Option<String>,
    #[serde(default)]
    pub conclusions: Option<String>,
    #[serde(default, alias = "researchGaps")]
    pub research_gaps: Vec<String>,
    #[serde(default, alias = "futureDirections")]
    pub future_directions: Vec<String>,
    #[serde(default, alias = "confidenceScore")]
    pub confidence_score: f64,
}

impl AnalysisResult {
    /// Clamp the confidence, drop blank list entries and blank optional fields.
    pub fn normalized(mut self) -> Self {
        self.confidence_score = clamp_unit(self.confidence_score);
        for list in [&mut self.key_findings, &mut self.research_gaps, &mut self.future_directions] {
            list.retain(|item| !item.trim().is_empty());
        }
        self.methodology = self.methodology.filter(|m| !m.trim().is_empty());
        self.conclusions = self.conclusions.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn methodology_items(&self) -> Vec<String> {
        single_item(&self.methodology)
    }

    pub fn conclusion_items(&self) -> Vec<String> {
        single_item(&self.conclusions)
    }
}

fn single_item(field: &Option<String>) -> Vec<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| vec![s.to_string()])
        .unwrap_or_default()
}

/// Normalized bibliographic record returned by literature search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub journal: String,
    pub year: String,
    pub doi: Option<String>,
    pub pdf_url: Option<String>,
    pub citation_count: u64,
    pub relevance_score: Option<f64>,
}

impl PaperRecord {
    /// Plain-text rendition fed to the analysis prompt.
    pub fn as_prompt_text(&self) -> String {
        format!(
            "Title: {}\nAbstract: {}\nAuthors: {}\nJournal: {} ({})",
            self.title,
            self.abstract_text,
            self.authors.join(", "),
            self.journal,
            self.year,
        )
    }
}

/// One page of literature search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub papers: Vec<PaperRecord>,
    pub total_results: u64,
}

/// Literature link produced by gene linking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenePaperLink {
    pub title: String,
    pub url: String,
    pub journal: String,
    pub year: String,
    pub relevance_score: f64,
}

/// Gene-to-literature summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneReport {
    pub gene_id: String,
    pub summary: String,
    pub keywords: Vec<String>,
    pub papers: Vec<GenePaperLink>,
}
