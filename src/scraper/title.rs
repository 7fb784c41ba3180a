//! Splitting raw video titles into display title and metadata segments.
//!
//! Channels encode extra metadata in their titles in different ways, so the
//! split is a strategy chosen by configuration rather than fixed logic.

use serde::{Deserialize, Serialize};

/// Segments recovered from one raw title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleParts {
    pub title: String,
    pub creator: String,
    pub batch: String,
    pub subject: String,
}

pub trait TitleConvention: Send + Sync {
    fn decompose(&self, raw: &str, default_creator: &str) -> TitleParts;
}

/// `"Lesson | Batch | Subject | Creator"` titles.
///
/// Positional: segment 0 is the title, the last segment the creator, and
/// segments 1 and 2 (when present) the batch and subject. A two-segment title
/// therefore yields the same text as batch and creator. The raw text is split
/// as given and each segment trimmed afterwards, so a trailing separator
/// yields an empty creator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipeDelimited;

pub const PIPE_SEPARATOR: &str = " | ";

impl TitleConvention for PipeDelimited {
    fn decompose(&self, raw: &str, default_creator: &str) -> TitleParts {
        let segments: Vec<&str> = raw.split(PIPE_SEPARATOR).collect();

        if segments.len() < 2 {
            return Plain.decompose(raw, default_creator);
        }

        let segment = |i: usize| segments.get(i).copied().unwrap_or_default().trim().to_string();

        TitleParts {
            title: segment(0),
            creator: segment(segments.len() - 1),
            batch: segment(1),
            subject: segment(2),
        }
    }
}

/// Titles taken verbatim, always credited to the default creator
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl TitleConvention for Plain {
    fn decompose(&self, raw: &str, default_creator: &str) -> TitleParts {
        TitleParts {
            title: raw.trim().to_string(),
            creator: default_creator.to_string(),
            ..Default::default()
        }
    }
}

/// Configurable selection of a [`TitleConvention`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleConventionKind {
    #[default]
    PipeDelimited,
    Plain,
}

impl TitleConventionKind {
    pub fn build(self) -> Box<dyn TitleConvention> {
        match self {
            Self::PipeDelimited => Box::new(PipeDelimited),
            Self::Plain => Box::new(Plain),
        }
    }
}
