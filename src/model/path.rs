//! Path: a sequence of alternating nodes and relationships.

use serde::{Deserialize, Serialize};
use super::{Node, Relationship};

/// One hop of a traversal.
///
/// `start`/`end` are in traversal order; `relationship.src`/`dst` keep the
/// recorded direction, and the two may disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub start: Node,
    pub end: Node,
    pub relationship: Relationship,
}

impl PathSegment {
    pub fn new(start: Node, relationship: Relationship, end: Node) -> Self {
        Self { start, end, relationship }
    }
}

/// A path in the graph: node -[rel]- node -[rel]- node ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Nodes along the path. Always has one more element than `relationships`.
    pub nodes: Vec<Node>,
    /// Relationships connecting consecutive nodes.
    pub relationships: Vec<Relationship>,
}

impl Path {
    pub fn single(node: Node) -> Self {
        Self { nodes: vec![node], relationships: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn start(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn end(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// Extend path with a relationship and the node it leads to.
    pub fn append(&mut self, rel: Relationship, node: Node) {
        self.relationships.push(rel);
        self.nodes.push(node);
    }

    /// Segments in traversal order.
    pub fn segments(&self) -> Vec<PathSegment> {
        self.relationships
            .iter()
            .enumerate()
            .filter_map(|(i, rel)| {
                let start = self.nodes.get(i)?;
                let end = self.nodes.get(i + 1)?;
                Some(PathSegment::new(start.clone(), rel.clone(), end.clone()))
            })
            .collect()
    }
}
