//! Short user-facing status messages raised by the session.

use std::fmt;

use genelinker_common::confidence::as_percent;
use genelinker_common::QueryOutcome;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, title: title.into(), message: message.into() }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, title: title.into(), message: message.into() }
    }

    /// Completion notice for a query; degraded results say why.
    pub fn for_outcome<T>(what: &str, outcome: &QueryOutcome<T>) -> Self {
        match outcome.reason() {
            None => Self::info(
                format!("{what} ready"),
                format!("{}, {} confidence", outcome.mode_label(), as_percent(outcome.confidence())),
            ),
            Some(reason) => Self::warning(format!("{what} from {}", outcome.mode_label()), reason.to_string()),
        }
    }

    pub fn log(&self) {
        match self.level {
            NoticeLevel::Info => tracing::info!(title = %self.title, "{}", self.message),
            NoticeLevel::Warning => tracing::warn!(title = %self.title, "{}", self.message),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            NoticeLevel::Info => "✓",
            NoticeLevel::Warning => "!",
        };
        write!(f, "{marker} {}: {}", self.title, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genelinker_common::FallbackReason;

    #[test]
    fn test_success_notice() {
        let o = QueryOutcome::Success { value: (), confidence: 0.874, sources: vec![] };
        let n = Notice::for_outcome("Answer", &o);
        assert_eq!(n.level, NoticeLevel::Info);
        assert_eq!(n.to_string(), "✓ Answer ready: live provider, 87% confidence");
    }

    #[test]
    fn test_degraded_notice_names_reason() {
        let o = QueryOutcome::Degraded {
            value: (),
            confidence: 0.8,
            sources: vec![],
            reason: FallbackReason::Timeout,
        };
        let n = Notice::for_outcome("Search", &o);
        assert_eq!(n.level, NoticeLevel::Warning);
        assert_eq!(n.title, "Search from offline fallback");
        assert_eq!(n.message, "provider timed out");
    }
}
