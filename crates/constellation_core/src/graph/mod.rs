//! Connection graph construction.
//!
//! # Responsibility
//! - Score thematic overlap between annotated notes.
//! - Select which note pairs become weighted connections.
//!
//! # Invariants
//! - Selection is a pure function of the notes and the admission policy.

pub mod selector;
pub mod similarity;
