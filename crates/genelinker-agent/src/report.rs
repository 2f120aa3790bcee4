//! Analysis reports, exported as JSON or as a paginated PDF.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use genelinker_common::confidence::as_percent;
use genelinker_common::{
    sanitize_filename, write_artifact, AnalysisResult, FallbackReason, GeneLinkerError, PaperRecord, QueryOutcome,
    Result,
};
use genelinker_literature::ExtractedEntity;
use genelinker_mindmap::{wrap_words, AverageGlyphMeasure};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde::Serialize;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 56;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub provenance: String,
    pub confidence: f64,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper: Option<PaperRecord>,
    pub analysis: AnalysisResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<ExtractedEntity>,
}

impl AnalysisReport {
    pub fn new(outcome: &QueryOutcome<AnalysisResult>) -> Self {
        let analysis = outcome.value().clone();
        Self {
            title: if analysis.title.trim().is_empty() { "Research Analysis".to_string() } else { analysis.title.clone() },
            generated_at: Utc::now(),
            provenance: outcome.mode_label().to_string(),
            confidence: outcome.confidence(),
            sources: outcome.sources().to_vec(),
            fallback_reason: outcome.reason().cloned(),
            paper: None,
            analysis,
            entities: Vec::new(),
        }
    }

    pub fn with_paper(mut self, paper: PaperRecord) -> Self {
        self.paper = Some(paper);
        self
    }

    pub fn with_entities(mut self, entities: Vec<ExtractedEntity>) -> Self {
        self.entities = entities;
        self
    }

    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }

    pub fn json_filename(&self) -> String {
        format!("analysis_{}.json", sanitize_filename(&self.title))
    }

    pub fn pdf_filename(&self) -> String {
        format!("analysis_{}.pdf", sanitize_filename(&self.title))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn export_json(&self, dir: &Path) -> Result<PathBuf> {
        let path = write_artifact(dir, &self.json_filename(), self.to_json()?.as_bytes())?;
        tracing::info!(path = %path.display(), "analysis exported as JSON");
        Ok(path)
    }

    pub fn export_pdf(&self, dir: &Path) -> Result<PathBuf> {
        let bytes = self.to_pdf()?;
        let path = write_artifact(dir, &self.pdf_filename(), &bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "analysis exported as PDF");
        Ok(path)
    }

    /// Report body as styled paragraphs, before wrapping.
    fn paragraphs(&self) -> Vec<(Style, String)> {
        let mut out = vec![(Style::Title, self.title.clone())];
        let mut meta = format!(
            "Generated {} | {} | confidence {}",
            self.generated_at.format("%Y-%m-%d %H:%M UTC"),
            self.provenance,
            as_percent(self.confidence)
        );
        if let Some(reason) = &self.fallback_reason {
            meta.push_str(&format!(" ({reason})"));
        }
        out.push((Style::Meta, meta));

        if let Some(paper) = &self.paper {
            out.push((Style::Heading, "Paper".to_string()));
            out.push((Style::Body, paper.title.clone()));
            out.push((Style::Body, paper.authors.join(", ")));
            out.push((Style::Body, format!("{} ({})", paper.journal, paper.year)));
            if let Some(doi) = &paper.doi {
                out.push((Style::Body, format!("DOI: {doi}")));
            }
        }

        let a = &self.analysis;
        if !a.summary.trim().is_empty() {
            out.push((Style::Heading, "Summary".to_string()));
            out.push((Style::Body, a.summary.clone()));
        }
        push_list(&mut out, "Key Findings", &a.key_findings);
        push_list(&mut out, "Methodology", &a.methodology_items());
        push_list(&mut out, "Conclusions", &a.conclusion_items());
        push_list(&mut out, "Research Gaps", &a.research_gaps);
        push_list(&mut out, "Future Directions", &a.future_directions);

        if !self.entities.is_empty() {
            let lines: Vec<String> = self
                .entities
                .iter()
                .map(|e| format!("{}: {} ({} mentions)", e.kind.as_str(), e.name, e.mentions))
                .collect();
            push_list(&mut out, "Detected Entities", &lines);
        }
        if !self.sources.is_empty() {
            push_list(&mut out, "Sources", &self.sources);
        }
        out
    }

    /// Render the report as a PDF using the standard Helvetica faces.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        let lines = layout_lines(&self.paragraphs());
        let pages = paginate(&lines);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(font("Helvetica"));
        let bold = doc.add_object(font("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => regular, "F2" => bold },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in &pages {
            let mut operations = Vec::new();
            for line in page {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![Object::Name(line.style.font().to_vec()), Object::Integer(line.style.size())],
                ));
                operations.push(Operation::new("Td", vec![Object::Integer(MARGIN + line.indent), Object::Integer(line.y)]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(pdf_safe(&line.text))]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations }.encode().map_err(|e| GeneLinkerError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(PAGE_WIDTH), Object::Integer(PAGE_HEIGHT)],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| GeneLinkerError::FileOperation(format!("cannot encode PDF: {e}")))?;
        Ok(out)
    }
}

fn push_list(out: &mut Vec<(Style, String)>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push((Style::Heading, heading.to_string()));
    out.extend(items.iter().map(|i| (Style::Bullet, i.clone())));
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Title,
    Meta,
    Heading,
    Body,
    Bullet,
}

impl Style {
    fn size(self) -> i64 {
        match self {
            Style::Title   => 18,
            Style::Heading => 13,
            Style::Meta    => 9,
            Style::Body | Style::Bullet => 11,
        }
    }

    fn leading(self) -> i64 {
        match self {
            Style::Title   => 26,
            Style::Heading => 22,
            Style::Meta    => 14,
            Style::Body | Style::Bullet => 15,
        }
    }

    fn font(self) -> &'static [u8] {
        match self {
            Style::Title | Style::Heading => b"F2",
            _ => b"F1",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    style: Style,
    text: String,
    indent: i64,
    y: i64,
}

/// Wrap paragraphs to the text column. `y` is filled in by [`paginate`].
fn layout_lines(paragraphs: &[(Style, String)]) -> Vec<Line> {
    let measure = AverageGlyphMeasure::MONOSPACE;
    let column = (PAGE_WIDTH - 2 * MARGIN) as f64;
    let mut lines = Vec::new();
    for (style, text) in paragraphs {
        let (indent, first_prefix, rest_prefix) = match style {
            Style::Bullet => (12, "- ", "  "),
            _ => (0, "", ""),
        };
        let width = column - indent as f64;
        let wrapped = wrap_words(text, width, style.size() as f64, &measure);
        for (i, chunk) in wrapped.into_iter().enumerate() {
            let prefix = if i == 0 { first_prefix } else { rest_prefix };
            lines.push(Line { style: *style, text: format!("{prefix}{chunk}"), indent, y: 0 });
        }
    }
    lines
}

fn paginate(lines: &[Line]) -> Vec<Vec<Line>> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages: Vec<Vec<Line>> = vec![Vec::new()];
    let mut y = top;
    for line in lines {
        let mut step = line.style.leading();
        if line.style == Style::Heading && y != top {
            step += 6;
        }
        if y - step < MARGIN {
            pages.push(Vec::new());
            y = top;
            step = line.style.leading();
        }
        y -= step;
        if let Some(page) = pages.last_mut() {
            page.push(Line { y, ..line.clone() });
        }
    }
    pages
}

/// Reduce text to printable ASCII for the WinAnsi base fonts.
fn pdf_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c),
            '…' => out.push_str("..."),
            '‘' | '’' | '′' => out.push('\''),
            '“' | '”' => out.push('"'),
            '–' | '—' | '−' => out.push('-'),
            '•' | '·' => out.push('*'),
            'α' => out.push_str("alpha"),
            'β' => out.push_str("beta"),
            'γ' => out.push_str("gamma"),
            'κ' => out.push_str("kappa"),
            'µ' | 'μ' => out.push('u'),
            c if c.is_whitespace() => out.push(' '),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use genelinker_literature::parse_pdf_bytes;
    use pretty_assertions::assert_eq;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            title: "KRAS G12C inhibition".into(),
            summary: "Covalent inhibitors trap KRAS G12C in its inactive state.".into(),
            key_findings: vec!["Sotorasib shrinks tumours".into(), "Resistance emerges via MAPK reactivation".into()],
            methodology: Some("Phase II trial".into()),
            conclusions: None,
            research_gaps: vec!["Long-term resistance".into()],
            future_directions: vec![],
            confidence_score: 0.91,
        }
    }

    fn report() -> AnalysisReport {
        let outcome = QueryOutcome::Success { value: analysis(), confidence: 0.91, sources: vec!["scripted analysis".into()] };
        AnalysisReport::new(&outcome).generated_at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_filenames() {
        let r = report();
        assert_eq!(r.pdf_filename(), "analysis_kras_g12c_inhibition.pdf");
        assert_eq!(r.json_filename(), "analysis_kras_g12c_inhibition.json");
    }

    #[test]
    fn test_json_carries_provenance() {
        let json: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
        assert_eq!(json["provenance"], "live provider");
        assert_eq!(json["analysis"]["key_findings"][1], "Resistance emerges via MAPK reactivation");
        assert!(json.get("fallback_reason").is_none());
        assert!(json.get("entities").is_none());
    }

    #[test]
    fn test_degraded_report_records_reason() {
        let outcome = QueryOutcome::Degraded {
            value: analysis(),
            confidence: 0.87,
            sources: vec![],
            reason: FallbackReason::MalformedResponse,
        };
        let r = AnalysisReport::new(&outcome);
        assert_eq!(r.fallback_reason, Some(FallbackReason::MalformedResponse));
        assert_eq!(r.provenance, "offline fallback");
    }

    #[test]
    fn test_pdf_text_round_trips() {
        let bytes = report().to_pdf().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let parsed = parse_pdf_bytes(&bytes).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("KRAS G12C inhibition"));
        assert!(parsed.full_text.contains("Key Findings"));
        assert!(parsed.full_text.contains("- Sotorasib shrinks tumours"));
        assert!(parsed.full_text.contains("Phase II trial"));
        assert!(!parsed.full_text.contains("Conclusions"));
    }

    #[test]
    fn test_long_reports_paginate() {
        let mut a = analysis();
        a.key_findings = (0..120).map(|i| format!("Finding number {i} about pathway crosstalk")).collect();
        let outcome = QueryOutcome::Success { value: a, confidence: 0.9, sources: vec![] };
        let bytes = AnalysisReport::new(&outcome).to_pdf().unwrap();
        let parsed = parse_pdf_bytes(&bytes).unwrap();
        assert!(parsed.page_count > 1);
        assert!(parsed.full_text.contains("Finding number 119"));
    }

    #[test]
    fn test_paginate_respects_margins() {
        let lines: Vec<Line> = (0..100)
            .map(|i| Line { style: Style::Body, text: format!("line {i}"), indent: 0, y: 0 })
            .collect();
        let pages = paginate(&lines);
        assert!(pages.len() > 1);
        for page in &pages {
            for line in page {
                assert!(line.y >= MARGIN && line.y < PAGE_HEIGHT - MARGIN);
            }
        }
        assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), 100);
    }

    #[test]
    fn test_pdf_safe() {
        assert_eq!(pdf_safe("TGF-β “signal” … ok"), "TGF-beta \"signal\" ... ok");
        assert_eq!(pdf_safe("漢"), "?");
    }

    #[test]
    fn test_long_bullets_wrap_with_hanging_indent() {
        let text = "word ".repeat(60);
        let lines = layout_lines(&[(Style::Bullet, text)]);
        assert!(lines.len() > 1);
        assert!(lines[0].text.starts_with("- "));
        assert!(lines[1].text.starts_with("  word"));
    }
}
