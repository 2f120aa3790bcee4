//! genelinker-common — Shared types, errors, and helpers used across all GeneLinker crates.

pub mod error;
pub mod models;
pub mod outcome;
pub mod confidence;
pub mod sandbox;
pub mod artifact;

// Re-export commonly used types
pub use error::{GeneLinkerError, Result};
pub use models::{AnalysisResult, GenePaperLink, GeneReport, PaperRecord, Persona, SearchPage};
pub use outcome::{FallbackReason, QueryOutcome};
pub use artifact::write_artifact;

/// Replace every non-alphanumeric character with `_` and lower-case the result.
/// Used for every file the application writes on behalf of the user.
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Trim user input and reject it when nothing is left.
pub fn require_input<'a>(field: &'static str, input: &'a str) -> Result<&'a str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(GeneLinkerError::UserInput(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}
