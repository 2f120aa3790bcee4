//! Literature source clients.

pub mod core_api;

use async_trait::async_trait;
use genelinker_common::{FallbackReason, SearchPage};
use thiserror::Error;

/// Common interface for literature search backends.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    /// Search for papers matching `query`, at most `limit` of them.
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<SearchPage>;

    /// Display name used as the result source.
    fn name(&self) -> &str;
}

/// Failures a source reports besides transport errors.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no API credential configured for {0}")]
    MissingCredential(String),
    #[error("{source_name} returned HTTP {status}")]
    HttpStatus { source_name: String, status: u16 },
    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

/// Classify a search failure for the fallback result.
pub fn fallback_reason(err: &anyhow::Error) -> FallbackReason {
    if let Some(source_err) = err.downcast_ref::<SourceError>() {
        return match source_err {
            SourceError::MissingCredential(_) => FallbackReason::MissingCredential,
            SourceError::HttpStatus { status, .. } => FallbackReason::HttpStatus(*status),
            SourceError::Malformed(_) => FallbackReason::MalformedResponse,
        };
    }
    if let Some(http) = err.downcast_ref::<reqwest::Error>() {
        if http.is_timeout() {
            return FallbackReason::Timeout;
        }
        if http.is_decode() {
            return FallbackReason::MalformedResponse;
        }
        return FallbackReason::Network;
    }
    if err.downcast_ref::<serde_json::Error>().is_some() {
        return FallbackReason::MalformedResponse;
    }
    FallbackReason::Network
}
