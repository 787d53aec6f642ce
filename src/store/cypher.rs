//! Cypher text for every pattern the engine issues.
//!
//! Labels are interpolated (Cypher cannot parameterize them) and therefore
//! sanitized; ids are always bound as parameters.

use crate::model::Direction;
use super::{CountQuery, HopRange, PathMode};

/// Keep only `[A-Za-z0-9_]`.
pub fn sanitize_label(label: &str) -> String {
    label.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect()
}

/// `MATCH (n:Label) RETURN n`
pub fn nodes_by_label(label: &str) -> String {
    format!("MATCH (n:{}) RETURN n", sanitize_label(label))
}

/// Lookup by business id, parameter `$id`.
pub fn node_by_id() -> &'static str {
    "MATCH (n { id: $id }) RETURN n LIMIT 1"
}

/// One-hop segments around a node, parameter `$id`; `n` is the traversal start.
pub fn relations_of() -> &'static str {
    "MATCH (n { id: $id })-[r]-(m) RETURN n, r, m"
}

/// Shortest path(s), parameters `$start` and `$end`.
pub fn shortest_paths(mode: PathMode) -> String {
    let function = match mode {
        PathMode::Single => "shortestPath",
        PathMode::All => "allShortestPaths",
    };
    format!(
        "MATCH p = {function}((a {{ id: $start }})-[*]-(b {{ id: $end }})) \
         RETURN nodes(p) AS ns, relationships(p) AS rs"
    )
}

/// Relationship pattern with the quantifier, oriented from the anchor.
fn relationship_pattern(direction: Direction, hops: HopRange) -> String {
    match direction {
        Direction::Outgoing => format!("-[{hops}]->"),
        Direction::Incoming => format!("<-[{hops}]-"),
        Direction::Both => format!("-[{hops}]-"),
    }
}

/// Distinct count, parameter `$id`, result column `count`.
pub fn count_related(query: &CountQuery<'_>) -> String {
    format!(
        "MATCH (:{} {{ id: $id }}){}(m:{}) RETURN count(DISTINCT m) AS count",
        sanitize_label(query.anchor_label),
        relationship_pattern(query.direction, query.hops),
        sanitize_label(query.target_label),
    )
}
