//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`. It keeps the graph
//! in hash maps behind `RwLock`s and answers the traversal patterns with plain
//! BFS/DFS over an adjacency list.
//!
//! ## Limitations
//!
//! - **No real transactions**: sessions are markers. Reads inside one session
//!   see writes made concurrently through the builder methods.
//! - **Builder writes are not atomic**: `create_node` / `create_relationship`
//!   take per-collection locks one after another. Build fixtures first, then
//!   query.
//!
//! Use this store for:
//! - Testing the projection engine without a database
//! - Embedding the engine for small, static topologies

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;

use crate::model::*;
use crate::session::{SessionId, SessionMode, StoreSession};
use crate::{Error, Result};
use super::{CountQuery, GraphStore, PathMode};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory property graph. Cloning shares the underlying graph.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    nodes: RwLock<HashMap<NodeId, Node>>,
    relationships: RwLock<HashMap<RelId, Relationship>>,
    /// node_id → relationship ids, in creation order
    adjacency: RwLock<HashMap<NodeId, Vec<RelId>>>,
    /// label → node ids, in creation order
    label_index: RwLock<HashMap<String, Vec<NodeId>>>,
    /// business id → node ids
    id_index: RwLock<HashMap<String, Vec<NodeId>>>,
    next_node_id: AtomicI64,
    next_rel_id: AtomicI64,
    next_session_id: AtomicU64,
    open_sessions: AtomicUsize,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                nodes: RwLock::new(HashMap::new()),
                relationships: RwLock::new(HashMap::new()),
                adjacency: RwLock::new(HashMap::new()),
                label_index: RwLock::new(HashMap::new()),
                id_index: RwLock::new(HashMap::new()),
                next_node_id: AtomicI64::new(0),
                next_rel_id: AtomicI64::new(0),
                next_session_id: AtomicU64::new(1),
                open_sessions: AtomicUsize::new(0),
                available: AtomicBool::new(true),
            }),
        }
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Create a node with the given labels and properties.
    pub fn create_node(&self, labels: &[&str], props: PropertyMap) -> NodeId {
        let id = NodeId(self.inner.next_node_id.fetch_add(1, Ordering::Relaxed));
        let node = Node {
            id,
            element_id: None,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: props,
        };

        {
            let mut idx = self.inner.label_index.write();
            for label in &node.labels {
                idx.entry(label.clone()).or_default().push(id);
            }
        }
        if let Some(business_id) = node.business_id() {
            self.inner.id_index.write().entry(business_id).or_default().push(id);
        }

        self.inner.nodes.write().insert(id, node);
        self.inner.adjacency.write().insert(id, Vec::new());

        id
    }

    /// Create a relationship recorded as `src -[rel_type]-> dst`.
    pub fn create_relationship(
        &self,
        src: NodeId,
        dst: NodeId,
        rel_type: &str,
        props: PropertyMap,
    ) -> Result<RelId> {
        {
            let nodes = self.inner.nodes.read();
            if !nodes.contains_key(&src) {
                return Err(Error::NotFound(format!("Source node {src}")));
            }
            if !nodes.contains_key(&dst) {
                return Err(Error::NotFound(format!("Target node {dst}")));
            }
        }

        let id = RelId(self.inner.next_rel_id.fetch_add(1, Ordering::Relaxed));
        let rel = Relationship {
            id,
            element_id: None,
            src,
            dst,
            rel_type: rel_type.to_string(),
            properties: props,
        };

        self.inner.relationships.write().insert(id, rel);

        let mut adj = self.inner.adjacency.write();
        adj.entry(src).or_default().push(id);
        if src != dst {
            adj.entry(dst).or_default().push(id);
        }

        Ok(id)
    }

    /// Delete a relationship. Returns true if it existed.
    pub fn delete_relationship(&self, id: RelId) -> bool {
        let removed = self.inner.relationships.write().remove(&id);
        if let Some(rel) = &removed {
            let mut adj = self.inner.adjacency.write();
            if let Some(rels) = adj.get_mut(&rel.src) {
                rels.retain(|rid| *rid != id);
            }
            if rel.src != rel.dst {
                if let Some(rels) = adj.get_mut(&rel.dst) {
                    rels.retain(|rid| *rid != id);
                }
            }
        }
        removed.is_some()
    }

    pub fn node_count(&self) -> usize {
        self.inner.nodes.read().len()
    }

    pub fn relationship_count(&self) -> usize {
        self.inner.relationships.read().len()
    }

    // ========================================================================
    // Outage simulation and session accounting
    // ========================================================================

    /// While unavailable, opening sessions and running queries fail with
    /// `Error::StoreUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    /// Sessions opened and not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.inner.open_sessions.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<()> {
        if self.inner.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::StoreUnavailable("in-memory store marked unavailable".into()))
        }
    }

    // ========================================================================
    // Synchronous query helpers (never hold a lock across an await)
    // ========================================================================

    fn ids_for(&self, business_id: &str) -> Vec<NodeId> {
        self.inner.id_index.read().get(business_id).cloned().unwrap_or_default()
    }

    fn node(&self, id: NodeId) -> Option<Node> {
        self.inner.nodes.read().get(&id).cloned()
    }

    fn segments_around(&self, node_id: NodeId) -> Vec<PathSegment> {
        let nodes = self.inner.nodes.read();
        let rels = self.inner.relationships.read();
        let adj = self.inner.adjacency.read();

        let Some(start) = nodes.get(&node_id) else {
            return Vec::new();
        };
        adj.get(&node_id)
            .into_iter()
            .flatten()
            .filter_map(|rid| rels.get(rid))
            .filter_map(|rel| {
                let other = rel.other_node(node_id)?;
                let end = nodes.get(&other)?;
                Some(PathSegment::new(start.clone(), rel.clone(), end.clone()))
            })
            .collect()
    }

    /// Layered BFS ignoring direction. Each reached node records every
    /// (predecessor, relationship) pair that reaches it at minimal depth.
    fn shortest_between(&self, start: NodeId, end: NodeId, mode: PathMode) -> Vec<Path> {
        let nodes = self.inner.nodes.read();
        let rels = self.inner.relationships.read();
        let adj = self.inner.adjacency.read();

        if !nodes.contains_key(&start) || !nodes.contains_key(&end) {
            return Vec::new();
        }
        if start == end {
            return nodes.get(&start).cloned().map(Path::single).into_iter().collect();
        }

        let mut depth: HashMap<NodeId, usize> = HashMap::new();
        let mut parents: HashMap<NodeId, Vec<(NodeId, RelId)>> = HashMap::new();
        depth.insert(start, 0);
        let mut frontier = vec![start];
        let mut level = 0;

        while !frontier.is_empty() && !depth.contains_key(&end) {
            let mut next = Vec::new();
            for &current in &frontier {
                for rid in adj.get(&current).into_iter().flatten() {
                    let Some(rel) = rels.get(rid) else { continue };
                    let Some(other) = rel.other_node(current) else { continue };
                    match depth.get(&other) {
                        None => {
                            depth.insert(other, level + 1);
                            parents.insert(other, vec![(current, *rid)]);
                            next.push(other);
                        }
                        Some(&d) if d == level + 1 => {
                            parents.entry(other).or_default().push((current, *rid));
                        }
                        Some(_) => {}
                    }
                }
            }
            frontier = next;
            level += 1;
        }

        if !depth.contains_key(&end) {
            return Vec::new();
        }

        // Walk predecessor chains back from `end`, collecting hops in reverse.
        let mut chains: Vec<Vec<(NodeId, RelId)>> = Vec::new();
        let mut stack: Vec<(NodeId, Vec<(NodeId, RelId)>)> = vec![(end, Vec::new())];
        while let Some((at, chain)) = stack.pop() {
            if at == start {
                chains.push(chain);
                if mode == PathMode::Single {
                    break;
                }
                continue;
            }
            let preds = parents.get(&at).map(Vec::as_slice).unwrap_or(&[]);
            let preds = match mode {
                PathMode::Single => &preds[..preds.len().min(1)],
                PathMode::All => preds,
            };
            for &(pred, rid) in preds.iter().rev() {
                let mut extended = chain.clone();
                extended.push((at, rid));
                stack.push((pred, extended));
            }
        }

        chains
            .into_iter()
            .filter_map(|chain| {
                let mut path = Path::single(nodes.get(&start)?.clone());
                for (to, rid) in chain.into_iter().rev() {
                    path.append(rels.get(&rid)?.clone(), nodes.get(&to)?.clone());
                }
                Some(path)
            })
            .collect()
    }

    /// Distinct target nodes over relationship-unique trails from `anchor`.
    fn reachable(&self, anchor: NodeId, query: &CountQuery<'_>, found: &mut HashSet<NodeId>) {
        let nodes = self.inner.nodes.read();
        let rels = self.inner.relationships.read();
        let adj = self.inner.adjacency.read();

        let trail = Trail { nodes: &*nodes, rels: &*rels, adj: &*adj, query };
        trail.walk(anchor, 0, &mut Vec::new(), found);
    }
}

/// Cypher variable-length semantics: a relationship appears at most once per
/// path, nodes may repeat.
struct Trail<'a> {
    nodes: &'a HashMap<NodeId, Node>,
    rels: &'a HashMap<RelId, Relationship>,
    adj: &'a HashMap<NodeId, Vec<RelId>>,
    query: &'a CountQuery<'a>,
}

impl Trail<'_> {
    fn walk(&self, current: NodeId, depth: usize, used: &mut Vec<RelId>, found: &mut HashSet<NodeId>) {
        if self.query.hops.contains(depth)
            && self.nodes.get(&current).is_some_and(|n| n.has_label(self.query.target_label))
        {
            found.insert(current);
        }
        if depth >= self.query.hops.max() {
            return;
        }
        for rid in self.adj.get(&current).into_iter().flatten() {
            if used.contains(rid) {
                continue;
            }
            let Some(rel) = self.rels.get(rid) else { continue };
            if !self.query.direction.permits(rel, current) {
                continue;
            }
            let Some(next) = rel.other_node(current) else { continue };
            used.push(*rid);
            self.walk(next, depth + 1, used, found);
            used.pop();
        }
    }
}

// ============================================================================
// MemorySession
// ============================================================================

/// In-memory session (a marker, no MVCC).
#[derive(Debug)]
pub struct MemorySession {
    id: SessionId,
    mode: SessionMode,
}

impl StoreSession for MemorySession {
    fn mode(&self) -> SessionMode { self.mode }
    fn id(&self) -> SessionId { self.id }
}

// ============================================================================
// GraphStore impl
// ============================================================================

#[async_trait]
impl GraphStore for MemoryStore {
    type Session = MemorySession;

    async fn open_session(&self, mode: SessionMode) -> Result<MemorySession> {
        self.ensure_available()?;
        let id = SessionId(self.inner.next_session_id.fetch_add(1, Ordering::Relaxed));
        self.inner.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(MemorySession { id, mode })
    }

    async fn close_session(&self, _session: MemorySession) -> Result<()> {
        self.inner.open_sessions.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    async fn nodes_by_label(&self, _session: &MemorySession, label: &str) -> Result<Vec<Node>> {
        self.ensure_available()?;
        let idx = self.inner.label_index.read();
        let nodes = self.inner.nodes.read();

        let ids = idx.get(label).cloned().unwrap_or_default();
        Ok(ids.iter().filter_map(|id| nodes.get(id).cloned()).collect())
    }

    async fn node_by_id(&self, _session: &MemorySession, id: &str) -> Result<Option<Node>> {
        self.ensure_available()?;
        Ok(self.ids_for(id).into_iter().find_map(|nid| self.node(nid)))
    }

    async fn relations_of(&self, _session: &MemorySession, id: &str) -> Result<Vec<PathSegment>> {
        self.ensure_available()?;
        Ok(self.ids_for(id).into_iter().flat_map(|nid| self.segments_around(nid)).collect())
    }

    async fn shortest_paths(
        &self,
        _session: &MemorySession,
        start: &str,
        end: &str,
        mode: PathMode,
    ) -> Result<Vec<Path>> {
        self.ensure_available()?;
        let starts = self.ids_for(start);
        let ends = self.ids_for(end);

        let mut paths = Vec::new();
        for &s in &starts {
            for &e in &ends {
                paths.extend(self.shortest_between(s, e, mode));
            }
        }
        Ok(paths)
    }

    async fn count_related(&self, _session: &MemorySession, query: &CountQuery<'_>) -> Result<u64> {
        self.ensure_available()?;
        let anchors: Vec<NodeId> = {
            let nodes = self.inner.nodes.read();
            self.ids_for(query.anchor_id)
                .into_iter()
                .filter(|id| nodes.get(id).is_some_and(|n| n.has_label(query.anchor_label)))
                .collect()
        };

        let mut found = HashSet::new();
        for anchor in anchors {
            self.reachable(anchor, query, &mut found);
        }
        Ok(found.len() as u64)
    }
}

// ============================================================================
// Tests
// ============================================================================
