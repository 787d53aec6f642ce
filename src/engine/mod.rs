//! # Projection Engine
//!
//! Runs the three read operations against a [`GraphStore`] and publishes
//! finished local graphs to subscribers.
//!
//! ```text
//! materialize()  ──► per-kind queries (join_all) ──► relationship queries (buffered)
//! resolve_path() ──► one shortest-path traversal
//! aggregate()    ──► per-kind count templates (join_all)
//!        │
//!        └─ each builds into a fresh LocalGraph, then swaps it in via `watch`
//! ```
//!
//! Every operation owns exactly one read session, released on every exit
//! path. Each graph-building operation draws a generation ticket when it
//! starts. A finished graph is shown unless a newer operation has already
//! published, and an operation that publishes nothing never hides an older
//! result.

mod publish;
pub mod stats;

use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tokio::sync::watch;

use crate::classify::classify_flat;
use crate::config::EngineConfig;
use crate::projection::{LocalGraph, NodeKind, TypedNode};
use crate::session::SessionMode;
use crate::store::{GraphStore, MemoryStore};
use crate::{Error, Result};

use publish::Publisher;
pub use stats::{count_templates, CountTemplate, NodeStat, NodeStats, PanelRow, StatValue};

// ============================================================================
// Published updates
// ============================================================================

/// What a published graph shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Nothing published yet.
    Empty,
    Materialized,
    Path { start: String, end: String },
}

/// A replace event for the renderer.
#[derive(Debug, Clone)]
pub struct GraphUpdate {
    pub generation: u64,
    pub view: View,
    pub graph: Arc<LocalGraph>,
}

// ============================================================================
// Engine
// ============================================================================

pub struct ProjectionEngine<S: GraphStore> {
    store: S,
    config: EngineConfig,
    publisher: Publisher,
}

impl<S: GraphStore> ProjectionEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config, publisher: Publisher::new() }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace events, starting from the currently published graph.
    pub fn subscribe(&self) -> watch::Receiver<GraphUpdate> {
        self.publisher.subscribe()
    }

    /// The most recently published graph.
    pub fn current(&self) -> Arc<LocalGraph> {
        self.publisher.current().graph
    }

    /// Generation of the most recently published graph.
    pub fn published_generation(&self) -> u64 {
        self.publisher.current().generation
    }

    // ========================================================================
    // Materialize
    // ========================================================================

    /// Rebuild the whole local graph from the store.
    ///
    /// Failing sub-queries are recorded on the returned graph and skipped;
    /// only an unreachable store aborts, leaving the published graph as is.
    pub async fn materialize(&self) -> Result<Arc<LocalGraph>> {
        let ticket = self.publisher.ticket();
        let session = self.store.open_session(SessionMode::ReadOnly).await?;
        let built = self.build_materialized(&session).await;
        let graph = Arc::new(release(built, self.store.close_session(session).await)?);

        tracing::info!(
            generation = ticket.generation(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            failed = graph.failed_queries().len(),
            "materialized local graph"
        );
        ticket.publish(View::Materialized, graph.clone());
        Ok(graph)
    }

    async fn build_materialized(&self, session: &S::Session) -> Result<LocalGraph> {
        let mut graph = LocalGraph::new();

        let batches = join_all(self.config.materialize_kinds.iter().map(|kind| async move {
            tracing::debug!(kind = %kind, "querying nodes by kind");
            (kind, self.store.nodes_by_label(session, kind.store_label()).await)
        }))
        .await;
        for (kind, batch) in batches {
            match batch {
                Ok(nodes) => {
                    for node in &nodes {
                        graph.upsert_node(node);
                    }
                }
                Err(err) => absorb(&mut graph, kind.as_str(), err)?,
            }
        }

        let ids: Vec<String> = graph.nodes().iter().map(|node| node.id.clone()).collect();
        let mut relations = stream::iter(ids.iter().map(|id| async move {
            tracing::debug!(node = %id, "querying relationships");
            (id, self.store.relations_of(session, id).await)
        }))
        .buffered(self.config.max_concurrent_queries.max(1));

        while let Some((id, result)) = relations.next().await {
            match result {
                Ok(segments) => {
                    for segment in &segments {
                        if graph.upsert_segment_within(segment).is_none() {
                            tracing::debug!(
                                node = %id,
                                rel_type = %segment.relationship.rel_type,
                                "far endpoint not materialized, skipping relationship"
                            );
                        }
                    }
                }
                Err(err) => absorb(&mut graph, id.as_str(), err)?,
            }
        }
        Ok(graph)
    }

    // ========================================================================
    // Path resolver
    // ========================================================================

    /// Project the shortest path(s) between two business ids into a fresh graph.
    ///
    /// No path is an empty graph, not an error; an empty result is not
    /// published and withdraws its ticket, so the current view (or an older
    /// operation still running) stays in charge of the screen.
    pub async fn resolve_path(&self, start: &str, end: &str) -> Result<Arc<LocalGraph>> {
        let ticket = self.publisher.ticket();
        let session = self.store.open_session(SessionMode::ReadOnly).await?;
        let built = self.build_path(&session, start, end).await;
        let graph = Arc::new(release(built, self.store.close_session(session).await)?);

        if graph.is_empty() {
            tracing::info!(start, end, withdrawn = ticket.generation(), "no path between nodes");
            return Ok(graph);
        }
        tracing::info!(
            generation = ticket.generation(),
            start,
            end,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "resolved path"
        );
        let view = View::Path { start: start.to_string(), end: end.to_string() };
        ticket.publish(view, graph.clone());
        Ok(graph)
    }

    async fn build_path(&self, session: &S::Session, start: &str, end: &str) -> Result<LocalGraph> {
        let mut graph = LocalGraph::new();
        if start == end {
            if let Some(node) = self.store.node_by_id(session, start).await? {
                graph.upsert_node(&node);
            }
            return Ok(graph);
        }

        let paths = self.store.shortest_paths(session, start, end, self.config.path_mode).await?;
        tracing::debug!(start, end, paths = paths.len(), "shortest path query returned");
        for path in &paths {
            for node in &path.nodes {
                graph.upsert_node(node);
            }
            for segment in path.segments() {
                graph.upsert_segment(&segment);
            }
        }
        Ok(graph)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Statistics for the node with business id `node_id`, classified as `kind`.
    pub async fn aggregate(&self, node_id: &str, kind: &NodeKind) -> Result<NodeStats> {
        let session = self.store.open_session(SessionMode::ReadOnly).await?;
        let built = async {
            let raw = self
                .store
                .node_by_id(&session, node_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("node {node_id}")))?;
            let typed = classify_flat(node_id, kind.as_str(), &raw.properties);
            self.collect_stats(&session, &typed).await
        }
        .await;
        release(built, self.store.close_session(session).await)
    }

    /// Statistics for a node already in the local graph.
    pub async fn aggregate_node(&self, node: &TypedNode) -> Result<NodeStats> {
        let session = self.store.open_session(SessionMode::ReadOnly).await?;
        let built = self.collect_stats(&session, node).await;
        release(built, self.store.close_session(session).await)
    }

    async fn collect_stats(&self, session: &S::Session, node: &TypedNode) -> Result<NodeStats> {
        let mut stats = NodeStats::attributes_of(node);
        let counts = join_all(count_templates(&node.kind).iter().map(|template| async move {
            let query = template.query(node);
            tracing::debug!(node = %node.id, stat = template.label, hops = %template.hops, "counting");
            (template, self.store.count_related(session, &query).await)
        }))
        .await;

        for (template, result) in counts {
            match result {
                Ok(n) => stats.push_count(template.label, Some(n)),
                Err(err @ Error::Query { .. }) => {
                    tracing::warn!(node = %node.id, stat = template.label, error = %err, "count query failed");
                    stats.push_count(template.label, None);
                }
                Err(err) => return Err(err),
            }
        }
        tracing::info!(node = %node.id, kind = %node.kind, rows = stats.rows().len(), "aggregated node statistics");
        Ok(stats)
    }
}

impl ProjectionEngine<MemoryStore> {
    /// Engine over a fresh in-memory store.
    pub fn open_memory(config: EngineConfig) -> Self {
        Self::new(MemoryStore::new(), config)
    }
}

#[cfg(feature = "bolt")]
impl ProjectionEngine<crate::store::BoltStore> {
    /// Engine over the Neo4j instance named in `config.store`.
    pub async fn open_bolt(config: EngineConfig) -> Result<Self> {
        let store = crate::store::BoltStore::connect(&config.store).await?;
        Ok(Self::new(store, config))
    }
}

/// Record a failed sub-query on the graph, or abort if the store is gone.
fn absorb(graph: &mut LocalGraph, target: &str, err: Error) -> Result<()> {
    match err {
        Error::Query { .. } => {
            tracing::warn!(target_query = target, error = %err, "sub-query failed, continuing with partial results");
            graph.record_failure(target, &err);
            Ok(())
        }
        other => Err(other),
    }
}

/// Combine an operation's outcome with its session release.
fn release<T>(built: Result<T>, closed: Result<()>) -> Result<T> {
    match (built, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), closed) => {
            if let Err(close_err) = closed {
                tracing::warn!(error = %close_err, "closing session after failed operation");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_prefers_operation_error() {
        let both: Result<()> = release(Err(Error::NotFound("n".into())), Err(Error::StoreUnavailable("gone".into())));
        assert!(matches!(both, Err(Error::NotFound(_))));
        let close_only: Result<u8> = release(Ok(1), Err(Error::StoreUnavailable("gone".into())));
        assert!(matches!(close_only, Err(Error::StoreUnavailable(_))));
        assert!(matches!(release(Ok(1), Ok(())), Ok(1)));
    }

    #[test]
    fn query_errors_are_absorbed() {
        let mut graph = LocalGraph::new();
        let err = Error::Query { query: "MATCH (n:Wifi) RETURN n".into(), message: "timeout".into() };
        assert!(absorb(&mut graph, "WIFI", err).is_ok());
        assert!(graph.is_partial());
        assert!(absorb(&mut graph, "ROUTER", Error::StoreUnavailable("down".into())).is_err());
        assert_eq!(graph.failed_queries().len(), 1);
    }

    #[test]
    fn fresh_engine_publishes_empty_graph() {
        let engine = ProjectionEngine::open_memory(EngineConfig::default());
        let rx = engine.subscribe();
        assert_eq!(rx.borrow().view, View::Empty);
        assert!(engine.current().is_empty());
        assert_eq!(engine.published_generation(), 0);
    }
}
