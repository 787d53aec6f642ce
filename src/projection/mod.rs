//! # Local Graph Projection
//!
//! Typed, display-ready records and the local graph the renderer draws.
//!
//! ```text
//! store Node ──classify──► TypedNode ─┐
//!                                     ├─► LocalGraph (keyed by business id / ordered pair)
//! PathSegment ──normalize──► TypedEdge┘
//! ```

pub mod kind;
pub mod typed;
pub mod graph;
pub mod attachments;

pub use kind::{NodeKind, RelationKind};
pub use typed::{EdgeAttributes, NodeAttributes, TypedEdge, TypedNode};
pub use graph::{FailedQuery, LocalGraph};
pub use attachments::Attachments;
