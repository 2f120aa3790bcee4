//! Audit records for completion calls. The output itself is never stored,
//! only its SHA-256.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAuditEntry {
    pub id: Uuid,
    pub operation: String,
    pub model: String,
    pub backend: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub output_hash: String,
    pub latency_ms: u64,
    /// Set when the call failed and a fallback was used.
    pub fallback: Option<String>,
    pub called_at: chrono::DateTime<Utc>,
}

impl LlmAuditEntry {
    pub fn success(
        operation: &str,
        backend: &str,
        model: &str,
        prompt_tokens: u32,
        completion_tokens: u32,
        output: &str,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation: operation.to_string(),
            model: model.to_string(),
            backend: backend.to_string(),
            prompt_tokens,
            completion_tokens,
            output_hash: hash_output(output),
            latency_ms,
            fallback: None,
            called_at: Utc::now(),
        }
    }

    pub fn failure(operation: &str, backend: &str, model: &str, reason: &str, latency_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation: operation.to_string(),
            model: model.to_string(),
            backend: backend.to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
            output_hash: String::new(),
            latency_ms,
            fallback: Some(reason.to_string()),
            called_at: Utc::now(),
        }
    }

    /// Emit at debug level on the `genelinker_llm::audit` target.
    pub fn record(&self) {
        tracing::debug!(
            target: "genelinker_llm::audit",
            id = %self.id,
            operation = %self.operation,
            model = %self.model,
            backend = %self.backend,
            prompt_tokens = self.prompt_tokens,
            completion_tokens = self.completion_tokens,
            output_hash = %self.output_hash,
            latency_ms = self.latency_ms,
            fallback = self.fallback.as_deref().unwrap_or("-"),
            "llm call"
        );
    }
}

fn hash_output(output: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(output.as_bytes());
    format!("{:x}", hasher.finalize())
}
