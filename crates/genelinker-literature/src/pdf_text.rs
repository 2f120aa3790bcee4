//! Text extraction from uploaded PDFs with lopdf.

use std::path::Path;

use genelinker_common::{GeneLinkerError, Result};
use serde::Serialize;

use crate::entities::{extract_entities, ExtractedEntity};

/// Parsed PDF document.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedPdf {
    pub title: Option<String>,
    pub full_text: String,
    pub page_count: usize,
    pub entities: Vec<ExtractedEntity>,
}

impl ParsedPdf {
    /// Detected title, else `fallback` (usually the file stem).
    pub fn display_title(&self, fallback: &str) -> String {
        self.title.clone().unwrap_or_else(|| fallback.to_string())
    }
}

pub fn parse_pdf(path: &Path) -> Result<ParsedPdf> {
    let bytes = std::fs::read(path)
        .map_err(|e| GeneLinkerError::FileOperation(format!("cannot read {}: {e}", path.display())))?;
    parse_pdf_bytes(&bytes)
}

/// Extract page text, a title guess and lexicon entities.
///
/// Pages whose text cannot be decoded are skipped; a document with no
/// extractable text at all is an error.
pub fn parse_pdf_bytes(bytes: &[u8]) -> Result<ParsedPdf> {
    let pdf = lopdf::Document::load_mem(bytes).map_err(|e| GeneLinkerError::Pdf(format!("unreadable PDF: {e}")))?;

    let pages = pdf.get_pages();
    let mut full_text = String::new();
    for page_number in pages.keys() {
        match pdf.extract_text(&[*page_number]) {
            Ok(text) => {
                full_text.push_str(&text);
                if !full_text.ends_with('\n') {
                    full_text.push('\n');
                }
            }
            Err(e) => tracing::debug!(page = page_number, error = %e, "page text not extractable"),
        }
    }

    if full_text.trim().is_empty() {
        return Err(GeneLinkerError::Pdf("no extractable text (scanned or image-only PDF?)".to_string()));
    }

    let entities = extract_entities(&full_text);
    tracing::info!(pages = pages.len(), chars = full_text.len(), entities = entities.len(), "PDF parsed");
    Ok(ParsedPdf {
        title: extract_title(&full_text),
        full_text,
        page_count: pages.len(),
        entities,
    })
}

fn extract_title(text: &str) -> Option<String> {
    // First line long enough to be a title rather than a running header.
    text.lines()
        .map(str::trim)
        .find(|l| l.chars().count() > 10)
        .map(String::from)
}
