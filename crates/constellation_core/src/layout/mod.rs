//! Spatial layout for constellation stars.
//!
//! # Responsibility
//! - Scatter stars uniformly in a cube around the origin.
//! - Relax positions with linear springs along admitted connections.
//!
//! # Invariants
//! - Connection endpoints are checked before any position is mutated.
//! - Degenerate (zero or non-finite) distances never produce NaN coordinates.
//! - Unconnected stars are left unconstrained; overlap is acceptable.

pub mod spring;

use crate::model::constellation::StarIndex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use spring::{apply_spring, initial_positions, relax, RelaxStats};

/// Default side length of the initial placement cube.
pub const DEFAULT_EXTENT: f64 = 10.0;
/// Default number of sweeps over the connection list.
pub const DEFAULT_ITERATIONS: u32 = 50;
/// Default rest length of each spring.
pub const DEFAULT_TARGET_SEPARATION: f64 = 2.0;
/// Default Hooke constant.
pub const DEFAULT_SPRING_CONSTANT: f64 = 0.1;
/// Default displacement scale applied per step.
pub const DEFAULT_STEP_SCALE: f64 = 0.01;

/// Spring simulation constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Initial coordinates are drawn from `[-extent/2, extent/2)` per axis.
    pub extent: f64,
    pub iterations: u32,
    pub target_separation: f64,
    pub spring_constant: f64,
    pub step_scale: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            extent: DEFAULT_EXTENT,
            iterations: DEFAULT_ITERATIONS,
            target_separation: DEFAULT_TARGET_SEPARATION,
            spring_constant: DEFAULT_SPRING_CONSTANT,
            step_scale: DEFAULT_STEP_SCALE,
        }
    }
}

/// Contract violations detected before relaxation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A connection endpoint is outside `[0, star_count)`.
    ConnectionOutOfRange {
        connection: usize,
        index: StarIndex,
        star_count: usize,
    },
    /// A connection joins a star to itself.
    SelfLoop { connection: usize, index: StarIndex },
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
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
        }
    }
}

impl Error for LayoutError {}
