//! Constellation assembly.
//!
//! # Responsibility
//! - Merge validated notes, relaxed positions and connections into the
//!   exported artifact.
//! - Derive star colors and stamp generation metadata.
//!
//! # Invariants
//! - Star `i` is built from note `i` and position `i`; order is never changed.
//! - Output connection endpoints are valid, distinct star indices.
//! - Output connection strength lies in `(0, 1]`.
//! - The timestamp comes from an injected [`Clock`], never ambient time.
//! - Under [`ColorScheme::ByCluster`], two stars share a color exactly when
//!   they share a cluster, however many clusters there are.

use crate::model::constellation::{
    Connection, Constellation, ConstellationMetadata, Position, Star, StarIndex,
};
use crate::model::note::{Note, NoteSource};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Star color for notes from Apple Notes under [`ColorScheme::BySource`].
pub const APPLE_NOTES_COLOR: &str = "#fbbf24";
/// Star color for every other source under [`ColorScheme::BySource`].
pub const OTHER_SOURCE_COLOR: &str = "#22d3ee";

const CLUSTER_PALETTE: &[&str] = &[
    "#fbbf24", "#22d3ee", "#a78bfa", "#f472b6", "#34d399", "#fb923c", "#60a5fa", "#f87171",
];

/// Source of the generation timestamp.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Used for reproducible output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// How star colors are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// One palette color per cluster, assigned in order of first appearance.
    /// Equal colors therefore mean same cluster for the renderer.
    #[default]
    ByCluster,
    /// Apple Notes amber, everything else cyan.
    BySource,
}

/// Assembly-time invariant violations.
#[derive(Debug, Clone, PartialEq)]
pub enum AssembleError {
    PositionCountMismatch {
        notes: usize,
        positions: usize,
    },
    ConnectionOutOfRange {
        connection: usize,
        index: StarIndex,
        star_count: usize,
    },
    SelfLoop {
        connection: usize,
        index: StarIndex,
    },
    InvalidStrength {
        connection: usize,
        strength: f64,
    },
}

impl Display for AssembleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PositionCountMismatch { notes, positions } => write!(
                f,
                "star count mismatch: {notes} notes but {positions} positions"
            ),
            Self::ConnectionOutOfRange {
                connection,
                index,
                star_count,
            } => write!(
                f,
                "connection {connection} references star {index} outside 0..{star_count}"
            ),
            Self::SelfLoop { connection, index } => {
                write!(f, "connection {connection} loops star {index} onto itself")
            }
            Self::InvalidStrength {
                connection,
                strength,
            } => write!(
                f,
                "connection {connection} has strength {strength} outside (0, 1]"
            ),
        }
    }
}

impl Error for AssembleError {}

/// Builds the final constellation.
///
/// # Errors
/// Returns an error when positions and notes differ in count, or when any
/// connection breaks the index/strength contract. No partial output is
/// produced.
pub fn assemble<C: Clock + ?Sized>(
    notes: &[Note],
    positions: Vec<Position>,
    connections: Vec<Connection>,
    scheme: ColorScheme,
    clock: &C,
) -> Result<Constellation, AssembleError> {
    if notes.len() != positions.len() {
        return Err(AssembleError::PositionCountMismatch {
            notes: notes.len(),
            positions: positions.len(),
        });
    }
    check_connections(&connections, notes.len())?;

    let colors = StarColors::new(notes, scheme);
    let stars = notes
        .iter()
        .zip(positions)
        .enumerate()
        .map(|(id, (note, position))| Star {
            id,
            content: note.content.clone(),
            themes: note.themes.clone(),
            cluster: note.cluster.clone(),
            source: note.source,
            position,
            color: colors.color_for(note).to_string(),
        })
        .collect::<Vec<_>>();

    let metadata = ConstellationMetadata {
        generated_at: clock.now(),
        total_notes: stars.len(),
        total_connections: connections.len(),
    };
    info!(
        "event=constellation_assembled module=assembler status=ok stars={} connections={}",
        metadata.total_notes, metadata.total_connections
    );

    Ok(Constellation {
        stars,
        connections,
        metadata,
    })
}

fn check_connections(connections: &[Connection], star_count: usize) -> Result<(), AssembleError> {
    for (slot, connection) in connections.iter().enumerate() {
        for index in [connection.from, connection.to] {
            if index >= star_count {
                return Err(AssembleError::ConnectionOutOfRange {
                    connection: slot,
                    index,
                    star_count,
                });
            }
        }
        if connection.from == connection.to {
            return Err(AssembleError::SelfLoop {
                connection: slot,
                index: connection.from,
            });
        }
        if !(connection.strength > 0.0 && connection.strength <= 1.0) {
            return Err(AssembleError::InvalidStrength {
                connection: slot,
                strength: connection.strength,
            });
        }
    }
    Ok(())
}

struct StarColors<'a> {
    scheme: ColorScheme,
    cluster_colors: HashMap<&'a str, String>,
}

impl<'a> StarColors<'a> {
    fn new(notes: &'a [Note], scheme: ColorScheme) -> Self {
        let mut cluster_colors = HashMap::new();
        let mut used = HashSet::new();
        let mut candidate = 0;
        for note in notes {
            if cluster_colors.contains_key(note.cluster.as_str()) {
                continue;
            }
            let slot = cluster_colors.len();
            let color = match CLUSTER_PALETTE.get(slot) {
                Some(color) => color.to_string(),
                None => loop {
                    let color = extra_cluster_color(candidate);
                    candidate += 1;
                    if !used.contains(&color) {
                        break color;
                    }
                },
            };
            used.insert(color.clone());
            cluster_colors.insert(note.cluster.as_str(), color);
        }
        Self {
            scheme,
            cluster_colors,
        }
    }

    fn color_for(&self, note: &Note) -> &str {
        match self.scheme {
            ColorScheme::BySource => source_color(note.source),
            ColorScheme::ByCluster => self
                .cluster_colors
                .get(note.cluster.as_str())
                .map(String::as_str)
                .unwrap_or(CLUSTER_PALETTE[0]),
        }
    }
}

/// Color candidate `n` for clusters past the fixed palette.
///
/// Hues advance by the golden angle over three lightness bands. Once those
/// are spent, `n` is mapped through an odd multiplier modulo 2^24, which is
/// a bijection, so every cluster still gets its own value.
fn extra_cluster_color(n: usize) -> String {
    if n < HUE_CANDIDATES {
        let hue = (n as f64 * GOLDEN_ANGLE_DEGREES) % 360.0;
        let lightness = [0.6, 0.45, 0.72][(n / 24) % 3];
        return hsl_to_hex(hue, 0.75, lightness);
    }
    let value = (n as u64).wrapping_mul(0x9E37_79B1) & 0xFF_FFFF;
    format!("#{value:06x}")
}

const GOLDEN_ANGLE_DEGREES: f64 = 137.507_764;
const HUE_CANDIDATES: usize = 720;

fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |value: f64| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

/// Color used for a note source under [`ColorScheme::BySource`].
pub fn source_color(source: NoteSource) -> &'static str {
    match source {
        NoteSource::AppleNotes => APPLE_NOTES_COLOR,
        NoteSource::Claude => OTHER_SOURCE_COLOR,
    }
}
