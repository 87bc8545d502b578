//! On-disk artifacts: annotated note input and constellation output.
//!
//! # Responsibility
//! - Read upstream note batches in either envelope or bare-array form.
//! - Write the constellation as pretty UTF-8 JSON for the renderer.
//!
//! # Invariants
//! - Output is written only from a fully assembled constellation.
//! - Record order in the file is preserved; it defines star indices.

use crate::model::constellation::Constellation;
use crate::model::note::NoteRecord;
use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ArtifactResult<T> = Result<T, ArtifactError>;

#[derive(Deserialize)]
#[serde(untagged)]
enum NotesDocument {
    /// `{ "notes": [...], "fetched_at": ... }` as written by the fetch step.
    Envelope { notes: Vec<NoteRecord> },
    Bare(Vec<NoteRecord>),
}

/// Reads annotated note records from a JSON file.
pub fn load_note_records(path: &Path) -> ArtifactResult<Vec<NoteRecord>> {
    let raw = read(path)?;
    let document: NotesDocument = serde_json::from_str(&raw).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let records = match document {
        NotesDocument::Envelope { notes } => notes,
        NotesDocument::Bare(notes) => notes,
    };
    info!(
        "event=notes_loaded module=artifact status=ok records={}",
        records.len()
    );
    Ok(records)
}

/// Reads a previously written constellation.
pub fn load_constellation(path: &Path) -> ArtifactResult<Constellation> {
    let raw = read(path)?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `constellation` as pretty JSON, creating parent directories.
pub fn write_constellation(path: &Path, constellation: &Constellation) -> ArtifactResult<()> {
    let json = constellation
        .to_json_pretty()
        .map_err(|source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ArtifactError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, json).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "event=constellation_written module=artifact status=ok stars={} connections={}",
        constellation.metadata.total_notes, constellation.metadata.total_connections
    );
    Ok(())
}

fn read(path: &Path) -> ArtifactResult<String> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// File or JSON failure with the path involved.
#[derive(Debug)]
pub enum ArtifactError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for ArtifactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at `{}`: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid json at `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ArtifactError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}
