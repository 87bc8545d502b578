//! Thematic similarity between annotated notes.
//!
//! # Invariants
//! - Result is in `[0, 1]` and symmetric in its arguments.
//! - Empty union yields `0.0`, never an error or NaN.

use crate::model::note::Note;
use std::collections::HashSet;

/// Jaccard index of the two notes' theme sets.
pub fn similarity(a: &Note, b: &Note) -> f64 {
    theme_similarity(&a.themes, &b.themes)
}

/// Jaccard index `|A ∩ B| / |A ∪ B|` over keyword sets.
///
/// Duplicates inside one slice are counted once.
pub fn theme_similarity<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    let left: HashSet<&str> = a.iter().map(|theme| theme.as_ref()).collect();
    let right: HashSet<&str> = b.iter().map(|theme| theme.as_ref()).collect();

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    intersection as f64 / union as f64
}

/// Keywords of `initiator` also present in `other`, in `initiator` order.
pub fn shared_themes<'a>(initiator: &'a Note, other: &Note) -> Vec<&'a str> {
    initiator
        .themes
        .iter()
        .filter(|theme| other.themes.contains(*theme))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{shared_themes, similarity, theme_similarity};
    use crate::model::note::{Note, NoteSource};

    fn note(index: usize, themes: &[&str]) -> Note {
        Note::new(index, "text", themes, "A", NoteSource::AppleNotes).expect("valid note")
    }

    #[test]
    fn one_shared_of_three_is_one_third() {
        let score = similarity(&note(0, &["x", "y"]), &note(1, &["x", "z"]));
        assert!((score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn identical_non_empty_sets_score_one() {
        assert_eq!(theme_similarity(&["a", "b"], &["b", "a"]), 1.0);
    }

    #[test]
    fn empty_sets_score_zero() {
        let empty: [&str; 0] = [];
        assert_eq!(theme_similarity(&empty, &empty), 0.0);
        assert_eq!(theme_similarity(&empty, &["a"]), 0.0);
    }

    #[test]
    fn shared_themes_follow_initiator_order() {
        let a = note(0, &["c", "a", "b"]);
        let b = note(1, &["a", "b", "c"]);
        assert_eq!(shared_themes(&a, &b), vec!["c", "a", "b"]);
    }
}
