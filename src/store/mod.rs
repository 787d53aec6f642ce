//! # Graph Store Trait
//!
//! The contract between the projection engine and the remote property-graph
//! database. It covers exactly the traversal and aggregation patterns the
//! engine issues; mutation belongs to other collaborators.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory graph for testing/embedding |
//! | `BoltStore` | `bolt` | External Neo4j via Bolt (feature `bolt`) |

pub mod cypher;
pub mod memory;
#[cfg(feature = "bolt")]
pub mod bolt;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::*;
use crate::session::{SessionMode, StoreSession};
use crate::Result;

pub use memory::{MemorySession, MemoryStore};
#[cfg(feature = "bolt")]
pub use bolt::{BoltSession, BoltStore};

// ============================================================================
// Store configuration
// ============================================================================

/// Which store the engine talks to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory (no persistence)
    #[default]
    Memory,

    /// Neo4j over Bolt
    #[cfg(feature = "bolt")]
    Bolt {
        uri: String,
        user: String,
        password: String,
        #[serde(default)]
        database: Option<String>,
    },
}

// ============================================================================
// Hop bounds
// ============================================================================

/// Hop bound of a variable-length pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopRange {
    /// Exactly `n` hops
    Exact(usize),
    /// `min..max` hops (inclusive)
    Range { min: usize, max: usize },
}

impl HopRange {
    pub fn min(self) -> usize {
        match self {
            HopRange::Exact(n) => n,
            HopRange::Range { min, .. } => min,
        }
    }

    pub fn max(self) -> usize {
        match self {
            HopRange::Exact(n) => n,
            HopRange::Range { max, .. } => max,
        }
    }

    pub fn contains(self, hops: usize) -> bool {
        hops >= self.min() && hops <= self.max()
    }
}

/// Cypher quantifier form: `*2`, `*1..3`.
impl fmt::Display for HopRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HopRange::Exact(n) => write!(f, "*{n}"),
            HopRange::Range { min, max } => write!(f, "*{min}..{max}"),
        }
    }
}

// ============================================================================
// Shortest path mode
// ============================================================================

/// `shortestPath` returns one path per endpoint pair, `allShortestPaths` every
/// path of minimal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMode {
    #[default]
    Single,
    All,
}

// ============================================================================
// Count query
// ============================================================================

/// Distinct count of `target_label` nodes reachable from the anchor node.
///
/// Cypher: `MATCH (:Anchor { id: $id })-[*min..max]-(m:Target) RETURN count(DISTINCT m)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountQuery<'a> {
    pub anchor_label: &'a str,
    pub anchor_id: &'a str,
    pub direction: Direction,
    pub hops: HopRange,
    pub target_label: &'a str,
}

// ============================================================================
// GraphStore Trait
// ============================================================================

/// The read contract the engine needs from a property-graph store.
///
/// Read methods take the session by shared reference so one operation can fan
/// out several queries inside the same session.
#[async_trait]
pub trait GraphStore: Send + Sync + 'static {
    /// The session type for this store.
    type Session: StoreSession;

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Open a session. A failure here means the store is unreachable.
    async fn open_session(&self, mode: SessionMode) -> Result<Self::Session>;

    /// Commit and release a session.
    async fn close_session(&self, session: Self::Session) -> Result<()>;

    // ========================================================================
    // Lookups
    // ========================================================================

    /// All nodes carrying `label`. Neo4j: `MATCH (n:Label) RETURN n`
    async fn nodes_by_label(&self, session: &Self::Session, label: &str) -> Result<Vec<Node>>;

    /// The node with the given business id.
    async fn node_by_id(&self, session: &Self::Session, id: &str) -> Result<Option<Node>>;

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Every relationship touching the node with this business id, as one-hop
    /// segments starting at that node. Neo4j: `MATCH ({ id: $id })-[r]-(m)`
    async fn relations_of(&self, session: &Self::Session, id: &str) -> Result<Vec<PathSegment>>;

    /// Shortest paths between two business ids over any relationship, in any
    /// direction, without a hop limit. No path is an empty vector.
    async fn shortest_paths(
        &self,
        session: &Self::Session,
        start: &str,
        end: &str,
        mode: PathMode,
    ) -> Result<Vec<Path>>;

    // ========================================================================
    // Aggregation
    // ========================================================================

    /// Distinct count for a bounded-hop pattern.
    async fn count_related(&self, session: &Self::Session, query: &CountQuery<'_>) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hop_range_bounds() {
        assert!(HopRange::Exact(2).contains(2));
        assert!(!HopRange::Exact(2).contains(1));
        let range = HopRange::Range { min: 1, max: 3 };
        assert!(range.contains(1) && range.contains(3));
        assert!(!range.contains(0) && !range.contains(4));
    }

    #[test]
    fn hop_range_renders_as_cypher_quantifier() {
        assert_eq!(HopRange::Exact(1).to_string(), "*1");
        assert_eq!(HopRange::Range { min: 2, max: 3 }.to_string(), "*2..3");
    }

    #[test]
    fn store_config_defaults_to_memory() {
        let config: StoreConfig = serde_json::from_str(r#"{ "type": "memory" }"#).unwrap();
        assert_eq!(config, StoreConfig::Memory);
        assert_eq!(StoreConfig::default(), StoreConfig::Memory);
    }
}
