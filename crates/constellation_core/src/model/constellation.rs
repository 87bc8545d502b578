//! Constellation output model.
//!
//! # Responsibility
//! - Define the exported artifact consumed by the renderer: stars,
//!   connections and summary metadata.
//!
//! # Invariants
//! - `stars[i]` always corresponds to the i-th input note.
//! - Every connection endpoint is a valid star index and `from != to`.
//! - Connection strength lies in `(0, 1]`.
//! - Field names are the renderer contract; do not rename without a format bump.

use crate::model::note::NoteSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Index of a note / star in the input order.
pub type StarIndex = usize;

/// Point in layout space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise `other - self`.
    pub fn delta_to(&self, other: &Position) -> Position {
        Position::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Admitted relationship between two notes.
///
/// Directed in representation, undirected in meaning. The selector may emit
/// both `(a, b)` and `(b, a)` for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: StarIndex,
    pub to: StarIndex,
    pub strength: f64,
    pub reason: String,
}

impl Connection {
    /// Endpoints as `(min, max)`, the identity of the underlying pair.
    pub fn unordered_pair(&self) -> (StarIndex, StarIndex) {
        if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }

    pub fn touches(&self, index: StarIndex) -> bool {
        self.from == index || self.to == index
    }
}

/// Spatial and visual representation of one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub id: StarIndex,
    pub content: String,
    pub themes: Vec<String>,
    pub cluster: String,
    pub source: NoteSource,
    pub position: Position,
    /// CSS hex color, e.g. `#fbbf24`.
    pub color: String,
}

/// Summary stamped by the assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationMetadata {
    pub generated_at: DateTime<Utc>,
    pub total_notes: usize,
    pub total_connections: usize,
}

/// Final write-once artifact of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constellation {
    pub stars: Vec<Star>,
    pub connections: Vec<Connection>,
    pub metadata: ConstellationMetadata,
}

impl Constellation {
    /// Serializes as pretty UTF-8 JSON with full-precision floats.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Indices of stars with no incident connection.
    pub fn isolated_stars(&self) -> Vec<StarIndex> {
        self.stars
            .iter()
            .map(|star| star.id)
            .filter(|id| !self.connections.iter().any(|conn| conn.touches(*id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Connection, Position};

    #[test]
    fn delta_and_norm_follow_euclidean_geometry() {
        let a = Position::new(1.0, 2.0, 2.0);
        let b = Position::new(4.0, 6.0, 2.0);
        let d = a.delta_to(&b);
        assert_eq!(d, Position::new(3.0, 4.0, 0.0));
        assert!((d.norm() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn unordered_pair_is_direction_independent() {
        let forward = Connection {
            from: 2,
            to: 5,
            strength: 0.4,
            reason: String::new(),
        };
        let backward = Connection {
            from: 5,
            to: 2,
            ..forward.clone()
        };
        assert_eq!(forward.unordered_pair(), backward.unordered_pair());
    }
}
