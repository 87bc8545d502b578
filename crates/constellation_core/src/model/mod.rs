//! Domain model for the constellation pipeline.
//!
//! # Responsibility
//! - Define the annotated note input and the exported constellation shape.
//! - Keep validation of upstream records in one place.
//!
//! # Invariants
//! - Notes are immutable once validated.
//! - Star index `i` always refers to the i-th validated note.
//!
//! # See also
//! - `crate::service::constellation_service` for the stage ordering.

pub mod constellation;
pub mod note;
