use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Browser session error: {0}")]
    Session(String),

    #[error("Page evaluation failed: {0}")]
    Evaluation(String),

    #[error("Unexpected page structure: {0}")]
    UnexpectedStructure(String),

    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure classes surfaced to callers inside [`ScrapeOutcome::Failure`].
///
/// [`ScrapeOutcome::Failure`]: crate::domain::ScrapeOutcome::Failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    NavigationError,
    TimeoutError,
    SessionError,
    EvaluationError,
    UnexpectedStructure,
}

impl ScraperError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Navigation(_) | Self::InvalidUrl(_) => FailureKind::NavigationError,
            Self::Timeout(_) => FailureKind::TimeoutError,
            Self::Session(_) | Self::Io(_) => FailureKind::SessionError,
            Self::Evaluation(_) => FailureKind::EvaluationError,
            Self::UnexpectedStructure(_) | Self::Selector { .. } | Self::Json(_) => {
                FailureKind::UnexpectedStructure
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_errors_map_to_navigation_kind() {
        let err = ScraperError::Navigation("net::ERR_NAME_NOT_RESOLVED".into());
        assert_eq!(err.kind(), FailureKind::NavigationError);

        let err = ScraperError::from(url::Url::parse("not a url").unwrap_err());
        assert_eq!(err.kind(), FailureKind::NavigationError);
    }

    #[test]
    fn test_timeout_message_includes_budget() {
        let err = ScraperError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.kind(), FailureKind::TimeoutError);
        assert_eq!(err.to_string(), "Operation timed out after 1500ms");
    }

    #[test]
    fn test_malformed_payload_is_unexpected_structure() {
        let err = ScraperError::from(serde_json::from_str::<u32>("\"x\"").unwrap_err());
        assert_eq!(err.kind(), FailureKind::UnexpectedStructure);
    }
}
