//! Constellation build service.
//!
//! # Responsibility
//! - Run one all-or-nothing batch: validate notes, select connections,
//!   place and relax stars, assemble the artifact.
//! - Inject randomness and time so identical inputs can reproduce
//!   byte-identical output.
//!
//! # Invariants
//! - Any stage error aborts the whole run; no partial constellation exists.
//! - `stars.len() == records.len()` for every successful run.
//! - Positions are never seeded from a previous run.

use crate::assembler::{assemble, AssembleError, Clock, SystemClock};
use crate::config::{ConfigError, ConstellationConfig};
use crate::graph::selector::select_connections;
use crate::layout::{initial_positions, relax, LayoutError};
use crate::model::constellation::Constellation;
use crate::model::note::{validate_records, Note, NoteRecord, NoteValidationError};
use log::{error, info};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for one build run.
#[derive(Debug)]
pub enum BuildError {
    /// Configuration rejected before any work started.
    Config(ConfigError),
    /// Malformed upstream record.
    InvalidNote(NoteValidationError),
    /// Selector emitted an edge the layout cannot honor.
    Layout(LayoutError),
    /// Final artifact would break an output invariant.
    Assemble(AssembleError),
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::InvalidNote(err) => write!(f, "{err}"),
            Self::Layout(err) => write!(f, "layout invariant violated: {err}"),
            Self::Assemble(err) => write!(f, "assembly invariant violated: {err}"),
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::InvalidNote(err) => Some(err),
            Self::Layout(err) => Some(err),
            Self::Assemble(err) => Some(err),
        }
    }
}

impl From<ConfigError> for BuildError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<NoteValidationError> for BuildError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidNote(value)
    }
}

impl From<LayoutError> for BuildError {
    fn from(value: LayoutError) -> Self {
        Self::Layout(value)
    }
}

impl From<AssembleError> for BuildError {
    fn from(value: AssembleError) -> Self {
        Self::Assemble(value)
    }
}

/// Constellation builder over a validated config and an injected clock.
pub struct ConstellationService<C: Clock = SystemClock> {
    config: ConstellationConfig,
    clock: C,
}

impl ConstellationService<SystemClock> {
    /// Creates a service stamping wall-clock time.
    pub fn new(config: ConstellationConfig) -> Result<Self, BuildError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> ConstellationService<C> {
    /// Creates a service with a caller-provided clock.
    pub fn with_clock(config: ConstellationConfig, clock: C) -> Result<Self, BuildError> {
        config.validate()?;
        Ok(Self { config, clock })
    }

    pub fn config(&self) -> &ConstellationConfig {
        &self.config
    }

    /// Builds from raw upstream records.
    pub fn build<R: Rng + ?Sized>(
        &self,
        records: &[NoteRecord],
        rng: &mut R,
    ) -> Result<Constellation, BuildError> {
        let notes = validate_records(records).map_err(|err| {
            error!(
                "event=build_failed module=service stage=validate status=error note_index={} reason={}",
                err.index(),
                err
            );
            err
        })?;
        self.build_notes(&notes, rng)
    }

    /// Builds from raw records using the thread-local random source.
    pub fn build_with_thread_rng(
        &self,
        records: &[NoteRecord],
    ) -> Result<Constellation, BuildError> {
        self.build(records, &mut rand::thread_rng())
    }

    /// Builds from already validated notes. Slice position is the star index.
    pub fn build_notes<R: Rng + ?Sized>(
        &self,
        notes: &[Note],
        rng: &mut R,
    ) -> Result<Constellation, BuildError> {
        let connections = select_connections(notes, &self.config.selection);

        let mut positions = initial_positions(notes.len(), &self.config.layout, rng);
        let stats = relax(&mut positions, &connections, &self.config.layout).map_err(|err| {
            error!("event=build_failed module=service stage=layout status=error reason={err}");
            err
        })?;

        let constellation = assemble(
            notes,
            positions,
            connections,
            self.config.color_scheme,
            &self.clock,
        )
        .map_err(|err| {
            error!("event=build_failed module=service stage=assemble status=error reason={err}");
            err
        })?;

        info!(
            "event=constellation_built module=service status=ok stars={} connections={} skipped_steps={}",
            constellation.metadata.total_notes,
            constellation.metadata.total_connections,
            stats.skipped_degenerate
        );
        Ok(constellation)
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildError, ConstellationService};
    use crate::assembler::FixedClock;
    use crate::config::ConstellationConfig;
    use crate::model::note::{NoteRecord, NoteSource};
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn service() -> ConstellationService<FixedClock> {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        ConstellationService::with_clock(ConstellationConfig::default(), clock).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut config = ConstellationConfig::default();
        config.layout.iterations = 0;
        let err = ConstellationService::new(config)
            .err()
            .expect("zero iterations must fail");
        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    fn missing_themes_aborts_whole_batch() {
        let mut broken = NoteRecord::annotated("b", &[], "A", NoteSource::Claude);
        broken.themes = None;
        let records = vec![
            NoteRecord::annotated("a", &["x"], "A", NoteSource::AppleNotes),
            broken,
        ];
        let err = service()
            .build(&records, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        match err {
            BuildError::InvalidNote(inner) => assert_eq!(inner.index(), 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_input_builds_empty_constellation() {
        let out = service()
            .build(&[], &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert!(out.stars.is_empty());
        assert!(out.connections.is_empty());
        assert_eq!(out.metadata.total_notes, 0);
    }
}
