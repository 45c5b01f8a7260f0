use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::notes::{MapMetadata, Note};

use super::super::{GraphEdge, GraphNode, MindGraph};

const DEFAULT_SIGNIFICANCE: u8 = 5;
const SIGNIFICANCE_RANGE: (u8, u8) = (1, 10);
const STRENGTH_RANGE: (u8, u8) = (1, 5);

/// Rounds an externally supplied score into `range`; NaN and infinities take
/// `fallback`. The flag is set when the input had to be adjusted beyond
/// rounding.
fn clamp_score(value: f64, range: (u8, u8), fallback: u8) -> (u8, bool) {
    if !value.is_finite() {
        return (fallback, true);
    }
    let rounded = value.round();
    let clamped = rounded.clamp(f64::from(range.0), f64::from(range.1));
    (clamped as u8, clamped != rounded)
}

fn clamp_significance(id: &str, value: f64) -> u8 {
    let (score, adjusted) = clamp_score(value, SIGNIFICANCE_RANGE, DEFAULT_SIGNIFICANCE);
    if adjusted {
        debug!(id, value, score, "clamped significance");
    }
    score
}

fn clamp_strength(source: &str, target: &str, value: f64) -> u8 {
    let (score, adjusted) = clamp_score(value, STRENGTH_RANGE, STRENGTH_RANGE.0);
    if adjusted {
        debug!(source, target, value, score, "clamped link strength");
    }
    score
}

fn node_size(significance: u8) -> Vec2 {
    let significance = f32::from(significance.clamp(SIGNIFICANCE_RANGE.0, SIGNIFICANCE_RANGE.1));
    vec2(100.0 + significance * 8.0, 50.0 + significance * 4.0)
}

fn make_graph_node(note: &Note, significance: u8) -> GraphNode {
    GraphNode {
        id: note.id.clone(),
        text: note.text.clone(),
        summary: note.summary.clone(),
        category: note.category,
        significance,
        size: node_size(significance),
    }
}

fn collect_edges(
    metadata: Option<&MapMetadata>,
    index_by_id: &HashMap<&str, usize>,
) -> Vec<GraphEdge> {
    let Some(metadata) = metadata else {
        return Vec::new();
    };

    let mut edges = Vec::with_capacity(metadata.links.len());
    for link in &metadata.links {
        let (Some(&source), Some(&target)) = (
            index_by_id.get(link.source.as_str()),
            index_by_id.get(link.target.as_str()),
        ) else {
            debug!(
                source = %link.source,
                target = %link.target,
                "dropping link with unknown endpoint"
            );
            continue;
        };

        edges.push(GraphEdge {
            source,
            target,
            strength: clamp_strength(&link.source, &link.target, link.strength),
            bidirectional: link.bidirectional,
            label: link.label.clone(),
        });
    }
    edges
}

/// Builds the node and edge sets for one layout pass. Never fails: bad
/// metadata is clamped or dropped.
pub(in crate::app) fn build_graph(notes: &[Note], metadata: Option<&MapMetadata>) -> MindGraph {
    let mut significance_by_id = HashMap::new();
    if let Some(metadata) = metadata {
        for entry in &metadata.nodes {
            significance_by_id
                .entry(entry.id.as_str())
                .or_insert_with(|| clamp_significance(&entry.id, entry.significance));
        }
    }

    let mut index_by_id = HashMap::with_capacity(notes.len());
    let mut nodes = Vec::with_capacity(notes.len());
    for note in notes {
        if index_by_id.contains_key(note.id.as_str()) {
            debug!(id = %note.id, "skipping duplicate note id");
            continue;
        }

        let significance = significance_by_id
            .get(note.id.as_str())
            .copied()
            .unwrap_or(DEFAULT_SIGNIFICANCE);
        index_by_id.insert(note.id.as_str(), nodes.len());
        nodes.push(make_graph_node(note, significance));
    }

    let edges = collect_edges(metadata, &index_by_id);
    MindGraph { nodes, edges }
}
