//! Annotated note model.
//!
//! # Responsibility
//! - Define the raw upstream record shape (`NoteRecord`) as it arrives from
//!   acquisition + annotation.
//! - Validate records into immutable `Note` values consumed by the graph and
//!   layout stages.
//!
//! # Invariants
//! - A `Note` always has a non-blank cluster label and a theme list.
//! - Theme keywords are kept exactly as annotated; only exact repeats are
//!   dropped, so keys are unique within one note.
//! - `Note::index` equals the position of the record in the input sequence.
//!
//! # See also
//! - `crate::graph::similarity` for how themes are compared.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wire value for notes pulled from Apple Notes.
pub const SOURCE_APPLE_NOTES: &str = "apple-notes";
/// Wire value for notes exported from assistant chat history.
pub const SOURCE_CLAUDE: &str = "claude";

/// Origin application of one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteSource {
    #[serde(rename = "apple-notes")]
    AppleNotes,
    #[serde(rename = "claude")]
    Claude,
}

impl NoteSource {
    /// Stable wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AppleNotes => SOURCE_APPLE_NOTES,
            Self::Claude => SOURCE_CLAUDE,
        }
    }

    /// Parses one wire string, ignoring surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            SOURCE_APPLE_NOTES => Some(Self::AppleNotes),
            SOURCE_CLAUDE => Some(Self::Claude),
            _ => None,
        }
    }
}

/// Raw note record produced by the upstream annotation step.
///
/// Every field is optional on the wire so that a missing value can be
/// reported with the offending note index instead of a bare serde error.
/// Extra upstream fields (`id`, `created_at`, `urls`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub content: Option<String>,
    pub themes: Option<Vec<String>>,
    pub cluster: Option<String>,
    pub source: Option<String>,
}

impl NoteRecord {
    /// Convenience constructor for a fully annotated record.
    pub fn annotated(
        content: impl Into<String>,
        themes: &[&str],
        cluster: impl Into<String>,
        source: NoteSource,
    ) -> Self {
        Self {
            content: Some(content.into()),
            themes: Some(themes.iter().map(|theme| theme.to_string()).collect()),
            cluster: Some(cluster.into()),
            source: Some(source.as_str().to_string()),
        }
    }
}

/// Validated, immutable annotated note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Position in the input sequence; becomes the Star index.
    pub index: usize,
    pub content: String,
    /// Verbatim keywords in upstream order, exact repeats removed.
    pub themes: Vec<String>,
    pub cluster: String,
    pub source: NoteSource,
}

impl Note {
    /// Builds a note directly, trimming the cluster label.
    pub fn new(
        index: usize,
        content: impl Into<String>,
        themes: &[&str],
        cluster: impl Into<String>,
        source: NoteSource,
    ) -> Result<Self, NoteValidationError> {
        let record = NoteRecord::annotated(content, themes, cluster, source);
        Self::from_record(index, &record)
    }

    /// Validates one upstream record.
    ///
    /// # Errors
    /// - `MissingField` when `content`, `themes`, `cluster` or `source` is absent.
    /// - `BlankCluster` when the cluster label is empty after trimming.
    /// - `UnknownSource` when `source` is not a known wire value.
    pub fn from_record(index: usize, record: &NoteRecord) -> Result<Self, NoteValidationError> {
        let content = record
            .content
            .as_ref()
            .ok_or(NoteValidationError::MissingField {
                index,
                field: "content",
            })?;
        let themes = record
            .themes
            .as_ref()
            .ok_or(NoteValidationError::MissingField {
                index,
                field: "themes",
            })?;
        let cluster = record
            .cluster
            .as_ref()
            .ok_or(NoteValidationError::MissingField {
                index,
                field: "cluster",
            })?;
        let raw_source = record
            .source
            .as_ref()
            .ok_or(NoteValidationError::MissingField {
                index,
                field: "source",
            })?;

        let cluster = cluster.trim();
        if cluster.is_empty() {
            return Err(NoteValidationError::BlankCluster { index });
        }
        let source =
            NoteSource::parse(raw_source).ok_or_else(|| NoteValidationError::UnknownSource {
                index,
                value: raw_source.clone(),
            })?;

        Ok(Self {
            index,
            content: content.clone(),
            themes: unique_themes(themes),
            cluster: cluster.to_string(),
            source,
        })
    }
}

/// Validates a full record batch, failing on the first malformed record.
pub fn validate_records(records: &[NoteRecord]) -> Result<Vec<Note>, NoteValidationError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| Note::from_record(index, record))
        .collect()
}

/// Drops exact repeats, keeping first occurrence order.
///
/// Keywords are compared byte-for-byte; case and spacing are significant.
pub fn unique_themes(raw: &[String]) -> Vec<String> {
    let mut themes: Vec<String> = Vec::with_capacity(raw.len());
    for theme in raw {
        if !themes.contains(theme) {
            themes.push(theme.clone());
        }
    }
    themes
}

/// Malformed-input errors. Every variant names the offending note index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    MissingField { index: usize, field: &'static str },
    BlankCluster { index: usize },
    UnknownSource { index: usize, value: String },
}

impl NoteValidationError {
    /// Index of the note that failed validation.
    pub fn index(&self) -> usize {
        match self {
            Self::MissingField { index, .. }
            | Self::BlankCluster { index }
            | Self::UnknownSource { index, .. } => *index,
        }
    }
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { index, field } => {
                write!(f, "note {index} is missing required field `{field}`")
            }
            Self::BlankCluster { index } => write!(f, "note {index} has a blank cluster label"),
            Self::UnknownSource { index, value } => {
                write!(f, "note {index} has unknown source `{value}`")
            }
        }
    }
}

impl Error for NoteValidationError {}
