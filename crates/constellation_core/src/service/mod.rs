//! Batch use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, selection, layout and assembly into one run.
//! - Keep CLI and other callers decoupled from stage ordering.

pub mod constellation_service;
