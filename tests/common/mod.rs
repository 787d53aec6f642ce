//! Shared fixtures for the end-to-end tests.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use netmap_graph::model::from_pairs;
use netmap_graph::store::MemorySession;
use netmap_graph::{
    CountQuery, EngineConfig, Error, GraphStore, MemoryStore, Node, NodeId, Path, PathMode,
    PathSegment, ProjectionEngine, RelId, Result, SessionMode,
};

/// Route library logs to the test output; `RUST_LOG=netmap_graph=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Fixture builders
// ============================================================================

pub fn node(store: &MemoryStore, label: &str, id: &str, props: &[(&str, &str)]) -> NodeId {
    let mut properties = from_pairs(props.iter().copied());
    properties.insert("id".into(), id.into());
    store.create_node(&[label], properties)
}

pub fn link(store: &MemoryStore, src: NodeId, dst: NodeId, rel_type: &str) -> RelId {
    store
        .create_relationship(src, dst, rel_type, Default::default())
        .unwrap()
}

/// `r1 -BROADCASTS-> w1 <-CONNECTS_TO- c1`
pub fn router_wifi_client() -> MemoryStore {
    let store = MemoryStore::new();
    let r1 = node(&store, "Router", "r1", &[("ip", "10.0.0.1"), ("mac", "aa:aa")]);
    let w1 = node(&store, "Wifi", "w1", &[("essid", "Lobby"), ("bssid", "bb:bb")]);
    let c1 = node(&store, "Client", "c1", &[("mac", "cc:cc")]);
    link(&store, r1, w1, "BROADCASTS");
    link(&store, c1, w1, "CONNECTS_TO");
    store
}

/// A building with one floor, a router and a wifi on it, two clients, a
/// probe sighting, and a separate house.
///
/// ```text
/// b1 -HAS_FLOOR-> f1 <-ATTACHED_TO- r1 -BROADCASTS-> w1 -ATTACHED_TO-> f1
///                                   ^                ^
///                         c1 -CONNECTS_TO      c2 -CONNECTS_TO
/// c1 -KNOWS-> p1
/// r2 -ATTACHED_TO-> h1
/// ```
pub fn campus() -> MemoryStore {
    let store = MemoryStore::new();
    let b1 = node(&store, "Building", "b1", &[("name", "HQ"), ("type", "office")]);
    let f1 = node(&store, "Floor", "f1", &[("number", "1"), ("name", "Ground")]);
    let r1 = node(&store, "Router", "r1", &[("ip", "10.0.0.1"), ("mac", "aa:aa")]);
    let w1 = node(
        &store,
        "Wifi",
        "w1",
        &[("essid", "Lobby"), ("bssid", "bb:bb"), ("password", "hunter2")],
    );
    let c1 = node(&store, "Client", "c1", &[("ip", "10.0.0.7"), ("mac", "cc:cc")]);
    let c2 = node(&store, "Client", "c2", &[("mac", "dd:dd")]);
    let p1 = node(&store, "WifiProbe", "p1", &[("essid", "Home")]);
    let h1 = node(&store, "House", "h1", &[("name", "Cabin")]);
    let r2 = node(&store, "Router", "r2", &[("ip", "192.168.1.1"), ("mac", "ee:ee")]);

    link(&store, b1, f1, "HAS_FLOOR");
    link(&store, r1, f1, "ATTACHED_TO");
    link(&store, w1, f1, "ATTACHED_TO");
    link(&store, r1, w1, "BROADCASTS");
    link(&store, c1, r1, "CONNECTS_TO");
    link(&store, c2, w1, "CONNECTS_TO");
    link(&store, c1, p1, "KNOWS");
    link(&store, r2, h1, "ATTACHED_TO");
    store
}

pub fn engine(store: MemoryStore) -> ProjectionEngine<MemoryStore> {
    init_tracing();
    ProjectionEngine::new(store, EngineConfig::default())
}

// ============================================================================
// Fault injection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Query,
    Unavailable,
}

impl Fault {
    fn error(self, what: &str) -> Error {
        match self {
            Fault::Query => Error::Query { query: what.to_string(), message: "injected failure".into() },
            Fault::Unavailable => Error::StoreUnavailable(format!("injected outage during {what}")),
        }
    }
}

#[derive(Default)]
struct Faults {
    labels: Vec<(String, Fault)>,
    relations: Vec<(String, Fault)>,
    counts: Vec<(String, Fault)>,
    hold: Option<(String, Arc<Notify>)>,
}

/// `MemoryStore` wrapper that fails or stalls chosen queries.
#[derive(Clone)]
pub struct FlakyStore {
    inner: MemoryStore,
    faults: Arc<Mutex<Faults>>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self { inner, faults: Arc::default() }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Fail `nodes_by_label` for this store label.
    pub fn fail_label(&self, label: &str, fault: Fault) {
        self.faults.lock().labels.push((label.to_string(), fault));
    }

    /// Fail `relations_of` for this business id.
    pub fn fail_relations(&self, id: &str, fault: Fault) {
        self.faults.lock().relations.push((id.to_string(), fault));
    }

    /// Fail `count_related` queries targeting this store label.
    pub fn fail_count(&self, target_label: &str, fault: Fault) {
        self.faults.lock().counts.push((target_label.to_string(), fault));
    }

    /// Stall `nodes_by_label(label)` until the returned handle is notified.
    pub fn hold_label(&self, label: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.faults.lock().hold = Some((label.to_string(), gate.clone()));
        gate
    }

    fn check(list: &[(String, Fault)], key: &str, what: &str) -> Result<()> {
        match list.iter().find(|(k, _)| k == key) {
            Some((_, fault)) => Err(fault.error(what)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GraphStore for FlakyStore {
    type Session = MemorySession;

    async fn open_session(&self, mode: SessionMode) -> Result<MemorySession> {
        self.inner.open_session(mode).await
    }

    async fn close_session(&self, session: MemorySession) -> Result<()> {
        self.inner.close_session(session).await
    }

    async fn nodes_by_label(&self, session: &MemorySession, label: &str) -> Result<Vec<Node>> {
        let gate = match &self.faults.lock().hold {
            Some((held, gate)) if held == label => Some(gate.clone()),
            _ => None,
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Self::check(&self.faults.lock().labels, label, &format!("nodes_by_label({label})"))?;
        self.inner.nodes_by_label(session, label).await
    }

    async fn node_by_id(&self, session: &MemorySession, id: &str) -> Result<Option<Node>> {
        self.inner.node_by_id(session, id).await
    }

    async fn relations_of(&self, session: &MemorySession, id: &str) -> Result<Vec<PathSegment>> {
        Self::check(&self.faults.lock().relations, id, &format!("relations_of({id})"))?;
        self.inner.relations_of(session, id).await
    }

    async fn shortest_paths(
        &self,
        session: &MemorySession,
        start: &str,
        end: &str,
        mode: PathMode,
    ) -> Result<Vec<Path>> {
        self.inner.shortest_paths(session, start, end, mode).await
    }

    async fn count_related(&self, session: &MemorySession, query: &CountQuery<'_>) -> Result<u64> {
        Self::check(
            &self.faults.lock().counts,
            query.target_label,
            &format!("count_related({})", query.target_label),
        )?;
        self.inner.count_related(session, query).await
    }
}

pub fn flaky_engine(store: MemoryStore) -> (ProjectionEngine<FlakyStore>, FlakyStore) {
    init_tracing();
    let flaky = FlakyStore::new(store);
    (ProjectionEngine::new(flaky.clone(), EngineConfig::default()), flaky)
}
