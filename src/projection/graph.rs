//! The local graph: the renderer's working copy.
//!
//! Nodes are keyed by business id, edges by the ordered `(source, target)`
//! pair. Both upserts are first-writer-wins, so merging is idempotent and
//! parallel relationships between the same ordered pair collapse into one
//! edge.

use hashbrown::HashMap;
use serde::Serialize;

use crate::classify::{classify, classify_flat};
use crate::model::{Node, PathSegment, PropertyMap};
use crate::normalize::normalize;
use super::{EdgeAttributes, RelationKind, TypedEdge, TypedNode};

/// A sub-query whose failure left the graph partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedQuery {
    /// Kind label or node id the query was issued for.
    pub target: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LocalGraph {
    nodes: Vec<TypedNode>,
    edges: Vec<TypedEdge>,
    #[serde(skip)]
    node_index: HashMap<String, usize>,
    #[serde(skip)]
    edge_index: HashMap<(String, String), usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed_queries: Vec<FailedQuery>,
}

impl LocalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Upserts
    // ========================================================================

    /// Classify and insert a store node unless its business key is present.
    pub fn upsert_node(&mut self, raw: &Node) -> &TypedNode {
        if let Some(&index) = self.node_index.get(&raw.business_key()) {
            return &self.nodes[index];
        }
        if raw.business_id().is_none() {
            tracing::warn!(identity = %raw.id, labels = ?raw.labels, "node has no business id, keying by store identity");
        }
        self.insert_node(classify(raw))
    }

    /// Insert a node built from a flat attribute map.
    pub fn upsert_flat(&mut self, id: &str, kind: &str, properties: &PropertyMap) -> &TypedNode {
        if let Some(&index) = self.node_index.get(id) {
            return &self.nodes[index];
        }
        self.insert_node(classify_flat(id, kind, properties))
    }

    /// Insert an already typed node; an existing node with the same id wins.
    pub fn insert_node(&mut self, node: TypedNode) -> &TypedNode {
        let index = match self.node_index.get(&node.id).copied() {
            Some(index) => index,
            None => {
                let index = self.nodes.len();
                self.node_index.insert(node.id.clone(), index);
                self.nodes.push(node);
                index
            }
        };
        &self.nodes[index]
    }

    /// Insert an edge unless the ordered pair already has one.
    ///
    /// Endpoints are not checked; callers insert both nodes first.
    pub fn upsert_edge(
        &mut self,
        source: String,
        target: String,
        kind: RelationKind,
        attributes: EdgeAttributes,
    ) -> &TypedEdge {
        let key = (source, target);
        let index = match self.edge_index.get(&key).copied() {
            Some(index) => {
                let existing = &self.edges[index];
                if existing.kind != kind {
                    tracing::debug!(
                        source = %key.0,
                        target = %key.1,
                        kept = %existing.kind,
                        dropped = %kind,
                        "coalescing parallel relationship"
                    );
                }
                index
            }
            None => {
                let index = self.edges.len();
                self.edges.push(TypedEdge {
                    source: key.0.clone(),
                    target: key.1.clone(),
                    kind,
                    attributes,
                });
                self.edge_index.insert(key, index);
                index
            }
        };
        &self.edges[index]
    }

    /// Upsert both endpoints of a traversal segment and its normalized edge.
    pub fn upsert_segment(&mut self, segment: &PathSegment) -> &TypedEdge {
        self.upsert_node(&segment.start);
        self.upsert_node(&segment.end);
        self.insert_normalized(segment)
    }

    /// Upsert a segment's edge only if both endpoints are already present.
    pub fn upsert_segment_within(&mut self, segment: &PathSegment) -> Option<&TypedEdge> {
        let start = segment.start.business_key();
        let end = segment.end.business_key();
        if !self.contains_node(&start) || !self.contains_node(&end) {
            return None;
        }
        Some(self.insert_normalized(segment))
    }

    fn insert_normalized(&mut self, segment: &PathSegment) -> &TypedEdge {
        let edge = normalize(segment);
        let attributes = EdgeAttributes {
            properties: segment.relationship.properties.clone(),
            direction_unconfirmed: edge.direction_unconfirmed(),
        };
        self.upsert_edge(edge.source, edge.target, edge.kind, attributes)
    }

    /// Union `other` into this graph. Existing entries win; failures accumulate.
    pub fn merge(&mut self, other: &LocalGraph) {
        for node in &other.nodes {
            self.insert_node(node.clone());
        }
        for edge in &other.edges {
            self.upsert_edge(
                edge.source.clone(),
                edge.target.clone(),
                edge.kind.clone(),
                edge.attributes.clone(),
            );
        }
        self.failed_queries.extend(other.failed_queries.iter().cloned());
    }

    // ========================================================================
    // Partial results
    // ========================================================================

    pub fn record_failure(&mut self, target: impl Into<String>, error: impl ToString) {
        self.failed_queries.push(FailedQuery { target: target.into(), error: error.to_string() });
    }

    pub fn failed_queries(&self) -> &[FailedQuery] {
        &self.failed_queries
    }

    /// Whether at least one sub-query failed while building this graph.
    pub fn is_partial(&self) -> bool {
        !self.failed_queries.is_empty()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn nodes(&self) -> &[TypedNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[TypedEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&TypedNode> {
        self.node_index.get(id).map(|&index| &self.nodes[index])
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&TypedEdge> {
        self.edge_index
            .get(&(source.to_string(), target.to_string()))
            .map(|&index| &self.edges[index])
    }

    /// Edges with `id` at either end, in insertion order.
    pub fn edges_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a TypedEdge> + 'a {
        self.edges.iter().filter(move |edge| edge.touches(id))
    }

    /// Distinct adjacent nodes, in edge insertion order.
    pub fn neighbors(&self, id: &str) -> Vec<&TypedNode> {
        let mut seen: Vec<&str> = Vec::new();
        let mut out = Vec::new();
        for edge in self.edges_of(id) {
            let Some(other) = edge.other_end(id) else { continue };
            if seen.contains(&other) {
                continue;
            }
            seen.push(other);
            if let Some(node) = self.node(other) {
                out.push(node);
            }
        }
        out
    }

    /// Nodes whose display label contains `needle`, case-insensitively.
    /// An empty needle matches nothing.
    pub fn search(&self, needle: &str) -> Vec<&TypedNode> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.nodes.iter().filter(|node| node.label.to_lowercase().contains(&needle)).collect()
    }
}

impl PartialEq for LocalGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
            && self.edges == other.edges
            && self.failed_queries == other.failed_queries
    }
}
