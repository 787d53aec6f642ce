//! Edge direction normalization.
//!
//! Traversals hand back segments in visiting order, which for undirected
//! patterns may run against the stored relationship. The local graph always
//! records the stored direction.

use crate::model::PathSegment;
use crate::projection::RelationKind;

/// How the traversal order related to the stored direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Traversal start is the stored start.
    Forward,
    /// Traversal ran against the stored direction; endpoints were swapped.
    Reversed,
    /// Neither endpoint matched the stored start; traversal order kept.
    Unconfirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEdge {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    pub orientation: Orientation,
}

impl NormalizedEdge {
    pub fn direction_unconfirmed(&self) -> bool {
        self.orientation == Orientation::Unconfirmed
    }
}

/// Orient a segment by the relationship's recorded start node.
pub fn normalize(segment: &PathSegment) -> NormalizedEdge {
    let rel = &segment.relationship;
    let start = segment.start.business_key();
    let end = segment.end.business_key();

    let orientation = if segment.start.id == rel.src {
        Orientation::Forward
    } else if segment.end.id == rel.src {
        Orientation::Reversed
    } else {
        tracing::warn!(
            rel = %rel.id,
            rel_type = %rel.rel_type,
            start = %start,
            end = %end,
            "relationship start matches neither endpoint, keeping traversal order"
        );
        Orientation::Unconfirmed
    };

    let (source, target) = match orientation {
        Orientation::Reversed => (end, start),
        Orientation::Forward | Orientation::Unconfirmed => (start, end),
    };
    NormalizedEdge {
        source,
        target,
        kind: RelationKind::from_type(&rel.rel_type),
        orientation,
    }
}
