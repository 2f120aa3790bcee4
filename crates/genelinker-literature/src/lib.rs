//! genelinker-literature — literature search, PDF download and local PDF
//! text extraction.

pub mod sources;
pub mod offline;
pub mod service;
pub mod download;
pub mod pdf_text;
pub mod entities;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use service::LiteratureService;
pub use sources::core_api::CoreClient;
pub use sources::{LiteratureSource, SourceError};
pub use download::PdfDownloader;
pub use pdf_text::{parse_pdf, parse_pdf_bytes, ParsedPdf};
pub use entities::{extract_entities, EntityKind, ExtractedEntity};
