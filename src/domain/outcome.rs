use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::app::{FailureKind, ScraperError};
use crate::domain::VideoRecord;

/// What the page looked like when no feed items matched any selector set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page_title: String,
    pub body_sample: String,
    pub discovered_tags: Vec<String>,
}

/// Result of one scrape call.
///
/// Serializes to one of `{"videos": [...]}`, `{"debug": true, "pageInfo": {...}}`
/// or `{"error": "<kind>", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// Videos in document order after the final scroll.
    VideoList(Vec<VideoRecord>),
    /// No item nodes matched; usually means the page markup drifted.
    EmptyDiagnostic(PageInfo),
    Failure { kind: FailureKind, message: String },
}

impl ScrapeOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn videos(&self) -> &[VideoRecord] {
        match self {
            Self::VideoList(videos) => videos,
            _ => &[],
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<ScraperError> for ScrapeOutcome {
    fn from(err: ScraperError) -> Self {
        Self::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl Serialize for ScrapeOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::VideoList(videos) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("videos", videos)?;
                map.end()
            }
            Self::EmptyDiagnostic(info) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("debug", &true)?;
                map.serialize_entry("pageInfo", info)?;
                map.end()
            }
            Self::Failure { kind, message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", kind)?;
                map.serialize_entry("message", message)?;
                map.end()
            }
        }
    }
}
