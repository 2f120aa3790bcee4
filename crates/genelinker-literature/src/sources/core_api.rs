//! CORE (core.ac.uk) v3 search client.
//!
//! API: POST https://api.core.ac.uk/v3/search/works with a bearer key.

use async_trait::async_trait;
use genelinker_common::sandbox::SandboxClient;
use genelinker_common::{PaperRecord, SearchPage};
use genelinker_config::Credential;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use super::{LiteratureSource, SourceError};

pub const CORE_API_BASE: &str = "https://api.core.ac.uk/v3";
const SOURCE_NAME: &str = "CORE";

pub struct CoreClient {
    base_url: String,
    credential: Credential,
    client: SandboxClient,
}

impl CoreClient {
    pub fn new(base_url: impl Into<String>, credential: Credential, mut client: SandboxClient) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        client.allow_endpoint(&base_url);
        Self { base_url, credential, client }
    }

    pub fn from_config(config: &genelinker_config::Config, client: SandboxClient) -> Self {
        Self::new(config.literature.endpoint.clone(), config.literature.credential.clone(), client)
    }
}

#[async_trait]
impl LiteratureSource for CoreClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<SearchPage> {
        let key = self
            .credential
            .expose()
            .ok_or_else(|| SourceError::MissingCredential(SOURCE_NAME.to_string()))?;
        let url = format!("{}/search/works", self.base_url);
        let body = serde_json::json!({
            "q": query,
            "limit": limit,
            "offset": 0,
            "sort": "relevance",
            "exclude_deleted": true,
            "stats": true,
        });
        let resp = self.client.post(&url)?.bearer_auth(key).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                source_name: SOURCE_NAME.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        let text = resp.text().await?;
        let json: serde_json::Value = serde_json::from_str(&text)?;
        let page = response_to_page(&json)?;
        debug!(n = page.papers.len(), total = page.total_results, "CORE search results");
        Ok(page)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────

fn response_to_page(json: &serde_json::Value) -> Result<SearchPage, SourceError> {
    if !json.is_object() {
        return Err(SourceError::Malformed("search response is not a JSON object".to_string()));
    }
    let papers: Vec<PaperRecord> = json["results"]
        .as_array()
        .map(|works| works.iter().enumerate().map(|(i, w)| work_to_paper(w, i)).collect())
        .unwrap_or_default();
    let total_results = json["totalHits"].as_u64().unwrap_or(papers.len() as u64);
    Ok(SearchPage { papers, total_results })
}

fn non_empty(value: &serde_json::Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

pub(crate) fn work_to_paper(work: &serde_json::Value, position: usize) -> PaperRecord {
    let title = non_empty(&work["title"]).unwrap_or_else(|| "Untitled".to_string());

    let id = match &work["id"] {
        serde_json::Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => generated_id(&title, position),
    };

    let authors: Vec<String> = work["authors"]
        .as_array()
        .map(|list| list.iter().filter_map(|a| non_empty(&a["name"])).collect())
        .unwrap_or_default();
    let authors = if authors.is_empty() { vec!["Unknown Author".to_string()] } else { authors };

    let journal = work["journals"]
        .as_array()
        .and_then(|j| j.first())
        .and_then(|j| non_empty(&j["title"]))
        .or_else(|| non_empty(&work["publisher"]))
        .unwrap_or_else(|| "Unknown Journal".to_string());

    let year = match &work["yearPublished"] {
        serde_json::Value::Number(n) => n.to_string(),
        other => non_empty(other).unwrap_or_else(|| "Unknown Year".to_string()),
    };

    PaperRecord {
        id,
        title,
        abstract_text: non_empty(&work["abstract"]).unwrap_or_else(|| "No abstract available".to_string()),
        authors,
        journal,
        year,
        doi: non_empty(&work["doi"]),
        pdf_url: non_empty(&work["downloadUrl"]),
        citation_count: work["citationCount"].as_u64().unwrap_or(0),
        relevance_score: None,
    }
}

/// Stable id for works the API returns without one.
fn generated_id(title: &str, position: usize) -> String {
    let digest = Sha256::digest(format!("{title}:{position}").as_bytes());
    let hex: String = digest[..6].iter().map(|b| format!("{b:02x}")).collect();
    format!("core_gen_{hex}")
}
