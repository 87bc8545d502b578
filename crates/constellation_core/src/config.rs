//! Pipeline configuration.
//!
//! # Responsibility
//! - Collect selection, layout and color settings in one serde-friendly shape.
//! - Load optional JSON overrides and reject values that break invariants.
//!
//! # Invariants
//! - Missing fields fall back to the built-in defaults.
//! - A config that passed `validate()` never makes selection or layout emit
//!   out-of-contract values.

use crate::assembler::ColorScheme;
use crate::graph::selector::SelectionConfig;
use crate::layout::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Full configuration for one constellation build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstellationConfig {
    pub selection: SelectionConfig,
    pub layout: LayoutConfig,
    pub color_scheme: ColorScheme,
}

impl ConstellationConfig {
    /// Reads a JSON config file and validates it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks threshold ranges and layout constants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let selection = &self.selection;
        if selection.intra_top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        check_threshold("selection.intra_threshold", selection.intra_threshold)?;
        check_threshold("selection.cross_threshold", selection.cross_threshold)?;

        let layout = &self.layout;
        if layout.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        check_positive("layout.extent", layout.extent)?;
        check_non_negative("layout.target_separation", layout.target_separation)?;
        check_positive("layout.spring_constant", layout.spring_constant)?;
        check_positive("layout.step_scale", layout.step_scale)?;
        Ok(())
    }
}

// Thresholds are exclusive lower bounds on a (0, 1] score, so 1.0 would admit nothing.
fn check_threshold(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        return Ok(());
    }
    Err(ConfigError::InvalidThreshold { field, value })
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    Err(ConfigError::InvalidLayoutConstant {
        field,
        value,
        expected: "a positive finite number",
    })
}

// A zero rest length pulls linked stars onto each other; still well defined.
fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(ConfigError::InvalidLayoutConstant {
        field,
        value,
        expected: "a non-negative finite number",
    })
}

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    ZeroTopK,
    ZeroIterations,
    InvalidThreshold {
        field: &'static str,
        value: f64,
    },
    InvalidLayoutConstant {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "invalid config json `{}`: {source}", path.display())
            }
            Self::ZeroTopK => write!(f, "selection.intra_top_k must be at least 1"),
            Self::ZeroIterations => write!(f, "layout.iterations must be at least 1"),
            Self::InvalidThreshold { field, value } => {
                write!(f, "{field} must be within [0, 1), got {value}")
            }
            Self::InvalidLayoutConstant {
                field,
                value,
                expected,
            } => {
                write!(f, "{field} must be {expected}, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}
