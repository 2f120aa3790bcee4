//! Literature search with offline fallback.

use std::sync::Arc;

use genelinker_common::{require_input, QueryOutcome, Result, SearchPage};

use crate::offline::{sample_page, OFFLINE_SOURCE};
use crate::sources::{fallback_reason, LiteratureSource};

/// Confidence attached to provider results. Search hits carry no model
/// uncertainty; the value only separates live and offline results.
pub const LIVE_CONFIDENCE: f64 = 1.0;
pub const OFFLINE_CONFIDENCE: f64 = 0.5;

pub const DEFAULT_LIMIT: usize = 10;

pub struct LiteratureService {
    source: Arc<dyn LiteratureSource>,
    default_limit: usize,
}

impl LiteratureService {
    pub fn new(source: Arc<dyn LiteratureSource>) -> Self {
        Self { source, default_limit: DEFAULT_LIMIT }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Search the configured source. Any provider failure yields the offline
    /// samples as a `Degraded` outcome; only blank queries are errors.
    pub async fn search(&self, query: &str, limit: Option<usize>) -> Result<QueryOutcome<SearchPage>> {
        let query = require_input("search query", query)?;
        let limit = limit.unwrap_or(self.default_limit).max(1);
        match self.source.search(query, limit).await {
            Ok(mut page) => {
                page.papers.truncate(limit);
                tracing::info!(source = self.source.name(), n = page.papers.len(), total = page.total_results, "literature search");
                Ok(QueryOutcome::Success {
                    value: page,
                    confidence: LIVE_CONFIDENCE,
                    sources: vec![self.source.name().to_string()],
                })
            }
            Err(err) => {
                let reason = fallback_reason(&err);
                tracing::warn!(source = self.source.name(), error = %err, %reason, "literature search fell back to samples");
                Ok(QueryOutcome::Degraded {
                    value: sample_page(query),
                    confidence: OFFLINE_CONFIDENCE,
                    sources: vec![OFFLINE_SOURCE.to_string()],
                    reason,
                })
            }
        }
    }
}
