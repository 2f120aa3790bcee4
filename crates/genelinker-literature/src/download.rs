//! Fetching a paper's PDF and saving it under a sanitized filename.

use std::path::{Path, PathBuf};

use genelinker_common::sandbox::SandboxClient;
use genelinker_common::{sanitize_filename, write_artifact, GeneLinkerError, PaperRecord, Result};
use tracing::{info, instrument, warn};

const PDF_MAGIC: &[u8] = b"%PDF";

pub struct PdfDownloader {
    client: SandboxClient,
}

impl PdfDownloader {
    pub fn new(client: SandboxClient) -> Self {
        Self { client }
    }

    pub fn filename_for(title: &str) -> String {
        format!("{}.pdf", sanitize_filename(title))
    }

    /// Download `paper`'s PDF into `dir`. Fails with `MissingPdfUrl` when the
    /// record has no link; transfer and write failures are `FileOperation`.
    #[instrument(skip(self, paper, dir), fields(paper = %paper.id))]
    pub async fn download_pdf(&self, paper: &PaperRecord, dir: &Path) -> Result<PathBuf> {
        let url = paper
            .pdf_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| GeneLinkerError::MissingPdfUrl(paper.title.clone()))?;

        let resp = self
            .client
            .get(url)?
            .send()
            .await
            .map_err(|e| GeneLinkerError::FileOperation(format!("download of {url} failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(GeneLinkerError::FileOperation(format!(
                "download of {url} failed: HTTP {}",
                resp.status().as_u16()
            )));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| GeneLinkerError::FileOperation(format!("download of {url} interrupted: {e}")))?;
        if !bytes.starts_with(PDF_MAGIC) {
            warn!(url, "downloaded file does not look like a PDF");
        }

        let path = write_artifact(dir, &Self::filename_for(&paper.title), &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "PDF saved");
        Ok(path)
    }
}
