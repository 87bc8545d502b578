//! Connection selection over the full note set.
//!
//! # Responsibility
//! - Admit same-cluster pairs through a per-note top-k ranking.
//! - Admit cross-cluster pairs through a single stricter threshold.
//!
//! # Invariants
//! - Intra-cluster edges are discovered from each note's own perspective and
//!   unioned; one pair may appear twice (`i -> j` and `j -> i`). No
//!   deduplication happens here.
//! - Each note initiates at most `intra_top_k` intra-cluster edges.
//! - Cross-cluster pairs are examined once each, as `i < j`.
//! - Emitted strength is strictly above the matching threshold.
//!
//! # Complexity
//! Intra pass is `O(sum |cluster|^2)`, cross pass is `O(N^2)`. The cross pass
//! is the scaling bottleneck for large note sets.

use crate::graph::similarity::{shared_themes, similarity};
use crate::model::constellation::{Connection, StarIndex};
use crate::model::note::Note;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Default number of cluster-mates each note may connect to.
pub const DEFAULT_INTRA_TOP_K: usize = 3;
/// Default exclusive lower bound for same-cluster admission.
pub const DEFAULT_INTRA_THRESHOLD: f64 = 0.3;
/// Default exclusive lower bound for cross-cluster admission.
pub const DEFAULT_CROSS_THRESHOLD: f64 = 0.5;

const MAX_REASON_THEMES: usize = 2;

/// Admission policy for the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub intra_top_k: usize,
    pub intra_threshold: f64,
    pub cross_threshold: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            intra_top_k: DEFAULT_INTRA_TOP_K,
            intra_threshold: DEFAULT_INTRA_THRESHOLD,
            cross_threshold: DEFAULT_CROSS_THRESHOLD,
        }
    }
}

/// Builds the full edge multiset: intra-cluster edges first, then
/// cross-cluster edges.
pub fn select_connections(notes: &[Note], config: &SelectionConfig) -> Vec<Connection> {
    let mut connections = intra_cluster_connections(notes, config);
    let intra_count = connections.len();
    connections.extend(cross_cluster_connections(notes, config));

    debug!(
        "event=connections_selected module=graph notes={} intra={} cross={}",
        notes.len(),
        intra_count,
        connections.len() - intra_count
    );
    connections
}

/// Same-cluster pass. Output is ordered by initiating note index.
pub fn intra_cluster_connections(notes: &[Note], config: &SelectionConfig) -> Vec<Connection> {
    let groups = group_by_cluster(notes);
    let mut connections = Vec::new();

    for (position, note) in notes.iter().enumerate() {
        let Some(mates) = groups.get(note.cluster.as_str()) else {
            continue;
        };

        let mut ranked: Vec<(usize, f64)> = mates
            .iter()
            .copied()
            .filter(|&other| other != position)
            .map(|other| (other, similarity(note, &notes[other])))
            .collect();
        // Ties break on input order so the edge set is reproducible.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        for (other, score) in ranked.into_iter().take(config.intra_top_k) {
            if score > config.intra_threshold {
                connections.push(Connection {
                    from: position,
                    to: other,
                    strength: score,
                    reason: intra_reason(note, &notes[other]),
                });
            }
        }
    }

    connections
}

/// Cross-cluster pass over every `i < j` pair with differing labels.
pub fn cross_cluster_connections(notes: &[Note], config: &SelectionConfig) -> Vec<Connection> {
    let mut connections = Vec::new();

    for (i, left) in notes.iter().enumerate() {
        for (j, right) in notes.iter().enumerate().skip(i + 1) {
            if left.cluster == right.cluster {
                continue;
            }
            let score = similarity(left, right);
            if score > config.cross_threshold {
                connections.push(Connection {
                    from: i,
                    to: j,
                    strength: score,
                    reason: format!("bridges {} and {}", left.cluster, right.cluster),
                });
            }
        }
    }

    connections
}

/// Collapses duplicate unordered pairs, keeping the first record of each.
///
/// The selector never calls this; it exists for consumers that need simple
/// graph semantics.
pub fn dedupe_unordered(connections: &[Connection]) -> Vec<Connection> {
    let mut seen: HashSet<(StarIndex, StarIndex)> = HashSet::with_capacity(connections.len());
    connections
        .iter()
        .filter(|conn| seen.insert(conn.unordered_pair()))
        .cloned()
        .collect()
}

fn group_by_cluster(notes: &[Note]) -> BTreeMap<&str, Vec<usize>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (position, note) in notes.iter().enumerate() {
        groups
            .entry(note.cluster.as_str())
            .or_default()
            .push(position);
    }
    groups
}

fn intra_reason(initiator: &Note, other: &Note) -> String {
    let shared = shared_themes(initiator, other);
    let leading = shared
        .into_iter()
        .take(MAX_REASON_THEMES)
        .collect::<Vec<_>>();
    format!("shared themes: {}", leading.join(", "))
}

#[cfg(test)]
mod tests {
    use super::{dedupe_unordered, intra_cluster_connections, intra_reason, SelectionConfig};
    use crate::model::note::{Note, NoteSource};

    fn note(index: usize, themes: &[&str], cluster: &str) -> Note {
        Note::new(index, "text", themes, cluster, NoteSource::AppleNotes).expect("valid note")
    }

    #[test]
    fn reason_uses_two_leading_shared_themes_of_initiator() {
        let a = note(0, &["q", "x", "y", "z"], "A");
        let b = note(1, &["z", "y", "x"], "A");
        assert_eq!(intra_reason(&a, &b), "shared themes: x, y");
    }

    #[test]
    fn mutual_top_ranking_yields_two_directed_records() {
        let notes = vec![note(0, &["x", "y"], "A"), note(1, &["x", "y"], "A")];
        let connections = intra_cluster_connections(&notes, &SelectionConfig::default());
        assert_eq!(connections.len(), 2);
        assert_eq!((connections[0].from, connections[0].to), (0, 1));
        assert_eq!((connections[1].from, connections[1].to), (1, 0));

        let deduped = dedupe_unordered(&connections);
        assert_eq!(deduped.len(), 1);
        assert_eq!((deduped[0].from, deduped[0].to), (0, 1));
    }

    #[test]
    fn singleton_cluster_has_no_intra_edges() {
        let notes = vec![note(0, &["x"], "A"), note(1, &["x"], "B")];
        assert!(intra_cluster_connections(&notes, &SelectionConfig::default()).is_empty());
    }
}
