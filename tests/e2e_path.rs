//! End-to-end tests for the shortest-path resolver.

mod common;

use common::*;
use netmap_graph::{EngineConfig, NodeKind, PathMode, ProjectionEngine, RelationKind, View};
use pretty_assertions::assert_eq;

fn sorted_ids(graph: &netmap_graph::LocalGraph) -> Vec<String> {
    let mut ids: Vec<_> = graph.nodes().iter().map(|n| n.id.clone()).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_path_is_projected_with_stored_direction() {
    let engine = engine(router_wifi_client());
    let graph = engine.resolve_path("c1", "r1").await.unwrap();

    assert_eq!(sorted_ids(&graph), ["c1", "r1", "w1"]);
    assert_eq!(graph.edge_count(), 2);
    // traversed w1 -> r1, stored r1 -> w1
    let broadcast = graph.edge("r1", "w1").unwrap();
    assert_eq!(broadcast.kind, RelationKind::Broadcasts);
    assert!(graph.edge("w1", "r1").is_none());
    assert!(graph.edge("c1", "w1").is_some());
}

#[tokio::test]
async fn test_disconnected_nodes_give_empty_graph() {
    let store = router_wifi_client();
    node(&store, "Building", "b9", &[("name", "Annex")]);
    let engine = engine(store);

    let graph = engine.resolve_path("r1", "b9").await.unwrap();
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.edge_count(), 0);
}

#[tokio::test]
async fn test_empty_path_keeps_current_view() {
    let store = router_wifi_client();
    node(&store, "Building", "b9", &[]);
    let engine = engine(store);
    let materialized = engine.materialize().await.unwrap();

    let path = engine.resolve_path("c1", "b9").await.unwrap();
    assert!(path.is_empty());
    assert_eq!(*engine.current(), *materialized);
    assert_eq!(engine.subscribe().borrow().view, View::Materialized);
}

#[tokio::test]
async fn test_path_replaces_materialized_graph() {
    let engine = engine(campus());
    let full = engine.materialize().await.unwrap();
    assert_eq!(full.node_count(), 9);

    let path = engine.resolve_path("c2", "b1").await.unwrap();
    assert_eq!(sorted_ids(&path), ["b1", "c2", "f1", "w1"]);
    assert_eq!(*engine.current(), *path);
    assert_eq!(
        engine.subscribe().borrow().view,
        View::Path { start: "c2".into(), end: "b1".into() }
    );
    assert_eq!(path.node("f1").map(|n| &n.kind), Some(&NodeKind::Floor));
}

#[tokio::test]
async fn test_same_start_and_end_yields_single_node() {
    let engine = engine(router_wifi_client());
    let graph = engine.resolve_path("w1", "w1").await.unwrap();
    assert_eq!(sorted_ids(&graph), ["w1"]);
    assert_eq!(graph.edge_count(), 0);
}

#[tokio::test]
async fn test_unknown_ids_give_empty_graph() {
    let engine = engine(router_wifi_client());
    assert!(engine.resolve_path("nope", "r1").await.unwrap().is_empty());
    assert!(engine.resolve_path("nope", "nope").await.unwrap().is_empty());
}

/// r1 broadcasts w1 and w2; c1 connects to both.
fn diamond() -> netmap_graph::MemoryStore {
    let store = netmap_graph::MemoryStore::new();
    let r1 = node(&store, "Router", "r1", &[]);
    let w1 = node(&store, "Wifi", "w1", &[]);
    let w2 = node(&store, "Wifi", "w2", &[]);
    let c1 = node(&store, "Client", "c1", &[("mac", "cc:cc")]);
    link(&store, r1, w1, "BROADCASTS");
    link(&store, r1, w2, "BROADCASTS");
    link(&store, c1, w1, "CONNECTS_TO");
    link(&store, c1, w2, "CONNECTS_TO");
    store
}

#[tokio::test]
async fn test_single_mode_projects_one_path() {
    let engine = engine(diamond());
    let graph = engine.resolve_path("r1", "c1").await.unwrap();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
}

#[tokio::test]
async fn test_all_mode_projects_every_shortest_path() {
    init_tracing();
    let config = EngineConfig::default().with_path_mode(PathMode::All);
    let engine = ProjectionEngine::new(diamond(), config);

    let graph = engine.resolve_path("r1", "c1").await.unwrap();
    assert_eq!(sorted_ids(&graph), ["c1", "r1", "w1", "w2"]);
    assert_eq!(graph.edge_count(), 4);
    assert!(graph.edges().iter().all(|e| e.source == "r1" || e.source == "c1"));
}

#[tokio::test]
async fn test_path_sessions_are_released() {
    let store = router_wifi_client();
    let engine = engine(store.clone());
    engine.resolve_path("c1", "r1").await.unwrap();
    engine.resolve_path("c1", "c1").await.unwrap();

    store.set_available(false);
    assert!(engine.resolve_path("c1", "r1").await.is_err());
    assert_eq!(store.open_sessions(), 0);
}
