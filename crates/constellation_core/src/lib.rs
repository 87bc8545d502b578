//! Core connection-graph and spatial-layout engine for note constellations.
//! This crate is the single source of truth for graph and layout invariants.

pub mod artifact;
pub mod assembler;
pub mod config;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod model;
pub mod service;

pub use artifact::{
    load_constellation, load_note_records, write_constellation, ArtifactError, ArtifactResult,
};
pub use assembler::{assemble, AssembleError, Clock, ColorScheme, FixedClock, SystemClock};
pub use config::{ConfigError, ConstellationConfig};
pub use graph::selector::{dedupe_unordered, select_connections, SelectionConfig};
pub use graph::similarity::{similarity, theme_similarity};
pub use layout::{apply_spring, initial_positions, relax, LayoutConfig, LayoutError, RelaxStats};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::constellation::{
    Connection, Constellation, ConstellationMetadata, Position, Star, StarIndex,
};
pub use model::note::{validate_records, Note, NoteRecord, NoteSource, NoteValidationError};
pub use service::constellation_service::{BuildError, ConstellationService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
