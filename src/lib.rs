//! # netmap-graph: Graph Projection & Query Engine
//!
//! Turns a network topology stored in a labeled property graph (routers,
//! wireless networks, clients, buildings, floors, hotspots, probe sightings)
//! into typed, display-ready local graphs.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the contract between the engine and the database
//! 2. **Clean DTOs**: `Node`, `Relationship`, `PathSegment` cross the store boundary untouched
//! 3. **Pure projection**: classification and direction recovery are plain functions
//! 4. **Replace, never patch**: every operation builds a fresh `LocalGraph` and swaps it in
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netmap_graph::{EngineConfig, ProjectionEngine};
//!
//! # async fn example() -> netmap_graph::Result<()> {
//! let engine = ProjectionEngine::open_memory(EngineConfig::default());
//! let mut updates = engine.subscribe();
//!
//! let graph = engine.materialize().await?;
//! println!("{} nodes, {} edges", graph.node_count(), graph.edge_count());
//!
//! let path = engine.resolve_path("router-1", "client-7").await?;
//! if path.is_empty() {
//!     println!("no path");
//! }
//! updates.changed().await.ok();
//! # Ok(())
//! # }
//! ```
//!
//! ## Stores
//!
//! | Store | Feature | Description |
//! |-------|---------|-------------|
//! | Memory | (default) | In-memory graph for testing/embedding |
//! | Bolt | `bolt` | External Neo4j via Bolt protocol |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod session;
pub mod store;
pub mod projection;
pub mod classify;
pub mod normalize;
pub mod engine;
pub mod config;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Node, Relationship, Path, PathSegment, Value, PropertyMap,
    NodeId, RelId, Direction,
};

// ============================================================================
// Re-exports: Store
// ============================================================================

pub use store::{GraphStore, StoreConfig, CountQuery, HopRange, PathMode, MemoryStore};
#[cfg(feature = "bolt")]
pub use store::BoltStore;
pub use session::{SessionMode, SessionId, StoreSession};

// ============================================================================
// Re-exports: Projection
// ============================================================================

pub use projection::{
    LocalGraph, TypedNode, TypedEdge, NodeKind, RelationKind,
    NodeAttributes, EdgeAttributes, Attachments,
};
pub use classify::{classify, classify_flat};
pub use normalize::{normalize, NormalizedEdge, Orientation};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use engine::{ProjectionEngine, GraphUpdate, View, NodeStats, NodeStat, StatValue, PanelRow};
pub use config::EngineConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Session or connection failure. Aborts the operation.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A single query failed. Absorbed as a partial result inside
    /// `materialize()` and `aggregate()`.
    #[error("Query failed: {message} ({query})")]
    Query { query: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
