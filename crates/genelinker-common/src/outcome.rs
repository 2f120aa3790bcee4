//! Provenance-tagged query results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a locally generated result was used instead of a provider answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// No credential, or a placeholder one. No request was made.
    MissingCredential,
    Network,
    Timeout,
    HttpStatus(u16),
    MalformedResponse,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::MissingCredential => write!(f, "no API credential configured"),
            FallbackReason::Network => write!(f, "provider unreachable"),
            FallbackReason::Timeout => write!(f, "provider timed out"),
            FallbackReason::HttpStatus(code) => write!(f, "provider returned HTTP {code}"),
            FallbackReason::MalformedResponse => write!(f, "provider response could not be parsed"),
        }
    }
}

/// Result of an AI or literature query.
///
/// Both arms are renderable. `Degraded` marks output produced by a fallback
/// generator so the presentation layer can show where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provenance", rename_all = "snake_case")]
pub enum QueryOutcome<T> {
    Success {
        value: T,
        confidence: f64,
        sources: Vec<String>,
    },
    Degraded {
        value: T,
        confidence: f64,
        sources: Vec<String>,
        reason: FallbackReason,
    },
}

impl<T> QueryOutcome<T> {
    pub fn value(&self) -> &T {
        match self {
            QueryOutcome::Success { value, .. } | QueryOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            QueryOutcome::Success { value, .. } | QueryOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            QueryOutcome::Success { confidence, .. } | QueryOutcome::Degraded { confidence, .. } => {
                *confidence
            }
        }
    }

    pub fn sources(&self) -> &[String] {
        match self {
            QueryOutcome::Success { sources, .. } | QueryOutcome::Degraded { sources, .. } => sources,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, QueryOutcome::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            QueryOutcome::Success { .. } => None,
            QueryOutcome::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryOutcome<U> {
        match self {
            QueryOutcome::Success { value, confidence, sources } => {
                QueryOutcome::Success { value: f(value), confidence, sources }
            }
            QueryOutcome::Degraded { value, confidence, sources, reason } => {
                QueryOutcome::Degraded { value: f(value), confidence, sources, reason }
            }
        }
    }

    /// Short provenance label for notifications.
    pub fn mode_label(&self) -> &'static str {
        if self.is_degraded() { "offline fallback" } else { "live provider" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_on_degraded() {
        let o = QueryOutcome::Degraded {
            value: 3,
            confidence: 0.75,
            sources: vec!["PubMed Central".to_string()],
            reason: FallbackReason::Timeout,
        };
        assert!(o.is_degraded());
        assert_eq!(o.reason(), Some(&FallbackReason::Timeout));
        assert_eq!(o.confidence(), 0.75);
        assert_eq!(o.mode_label(), "offline fallback");
        let mapped = o.map(|v| v * 2);
        assert_eq!(*mapped.value(), 6);
    }

    #[test]
    fn test_success_has_no_reason() {
        let o: QueryOutcome<&str> = QueryOutcome::Success {
            value: "ok",
            confidence: 0.9,
            sources: vec![],
        };
        assert!(!o.is_degraded());
        assert!(o.reason().is_none());
        assert_eq!(o.into_value(), "ok");
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(FallbackReason::HttpStatus(503).to_string(), "provider returned HTTP 503");
    }
}
