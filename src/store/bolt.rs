//! Neo4j store over Bolt, via `neo4rs`.
//!
//! One explicit transaction per session. Concurrent queries of one operation
//! share the session's transaction and are serialized on its mutex.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query, Row, Txn};
use tokio::sync::Mutex;

use crate::model::*;
use crate::session::{SessionId, SessionMode, StoreSession};
use crate::{Error, Result};
use super::{cypher, CountQuery, GraphStore, PathMode, StoreConfig};

pub struct BoltStore {
    graph: Graph,
    next_session_id: AtomicU64,
}

pub struct BoltSession {
    id: SessionId,
    mode: SessionMode,
    txn: Mutex<Txn>,
}

impl StoreSession for BoltSession {
    fn mode(&self) -> SessionMode {
        self.mode
    }

    fn id(&self) -> SessionId {
        self.id
    }
}

impl BoltStore {
    /// Connect using a `StoreConfig::Bolt` and verify the server answers.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let StoreConfig::Bolt { uri, user, password, database } = config else {
            return Err(Error::Config("bolt store needs a `bolt` store config".into()));
        };
        let mut builder = ConfigBuilder::default().uri(uri.as_str()).user(user.as_str()).password(password.as_str());
        if let Some(database) = database {
            builder = builder.db(database.as_str());
        }
        let neo4j_config = builder.build().map_err(|e| Error::Config(e.to_string()))?;
        let graph = Graph::connect(neo4j_config)
            .await
            .map_err(|e| Error::StoreUnavailable(e.to_string()))?;

        // The pool is lazy; force a handshake so an unreachable server fails here.
        graph
            .run(query("RETURN 1"))
            .await
            .map_err(|e| Error::StoreUnavailable(e.to_string()))?;

        tracing::info!(uri = %uri, "connected to Neo4j");
        Ok(Self { graph, next_session_id: AtomicU64::new(1) })
    }

    /// Run `cypher` inside the session's transaction and collect every row.
    async fn rows(&self, session: &BoltSession, text: &str, q: Query) -> Result<Vec<Row>> {
        let query_failed = |e: neo4rs::Error| Error::Query { query: text.to_string(), message: e.to_string() };
        let mut txn = session.txn.lock().await;
        let mut stream = txn.execute(q).await.map_err(query_failed)?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next(txn.handle()).await.map_err(query_failed)? {
            rows.push(row);
        }
        tracing::debug!(session = %session.id, rows = rows.len(), query = text, "bolt query");
        Ok(rows)
    }
}

// ============================================================================
// Row decoding
// ============================================================================

fn decode_error(text: &str, column: &str, e: impl std::fmt::Display) -> Error {
    Error::Query { query: text.to_string(), message: format!("column `{column}`: {e}") }
}

fn column<T: serde::de::DeserializeOwned>(row: &Row, text: &str, name: &str) -> Result<T> {
    row.get::<T>(name).map_err(|e| decode_error(text, name, e))
}

fn properties<'a>(keys: Vec<&'a str>, get: impl Fn(&'a str) -> Option<serde_json::Value>) -> PropertyMap {
    keys.into_iter()
        .filter_map(|key| get(key).map(|value| (key.to_string(), Value::from(value))))
        .collect()
}

fn to_node(node: &neo4rs::Node) -> Node {
    Node {
        id: NodeId(node.id()),
        element_id: None,
        labels: node.labels().into_iter().map(str::to_string).collect(),
        properties: properties(node.keys(), |key| node.get::<serde_json::Value>(key).ok()),
    }
}

fn to_relationship(rel: &neo4rs::Relation) -> Relationship {
    Relationship {
        id: RelId(rel.id()),
        element_id: None,
        src: NodeId(rel.start_node_id()),
        dst: NodeId(rel.end_node_id()),
        rel_type: rel.typ().to_string(),
        properties: properties(rel.keys(), |key| rel.get::<serde_json::Value>(key).ok()),
    }
}

fn to_path(text: &str, row: &Row) -> Result<Path> {
    let nodes: Vec<neo4rs::Node> = column(row, text, "ns")?;
    let rels: Vec<neo4rs::Relation> = column(row, text, "rs")?;
    if nodes.len() != rels.len() + 1 {
        return Err(decode_error(text, "ns", format!("{} nodes for {} relationships", nodes.len(), rels.len())));
    }
    Ok(Path {
        nodes: nodes.iter().map(to_node).collect(),
        relationships: rels.iter().map(to_relationship).collect(),
    })
}

// ============================================================================
// GraphStore
// ============================================================================

#[async_trait]
impl GraphStore for BoltStore {
    type Session = BoltSession;

    /// neo4rs 0.8 has no access mode on `start_txn` over a direct
    /// connection, so a read session is an explicit transaction that is
    /// rolled back on close instead of committed.
    async fn open_session(&self, mode: SessionMode) -> Result<BoltSession> {
        let txn = self
            .graph
            .start_txn()
            .await
            .map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        let id = SessionId(self.next_session_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(session = %id, ?mode, "opened bolt session");
        Ok(BoltSession { id, mode, txn: Mutex::new(txn) })
    }

    async fn close_session(&self, session: BoltSession) -> Result<()> {
        let BoltSession { id, mode, txn } = session;
        let txn = txn.into_inner();
        let closed = if mode.commits_on_close() { txn.commit().await } else { txn.rollback().await };
        closed.map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        tracing::debug!(session = %id, ?mode, "closed bolt session");
        Ok(())
    }

    async fn nodes_by_label(&self, session: &BoltSession, label: &str) -> Result<Vec<Node>> {
        let text = cypher::nodes_by_label(label);
        let rows = self.rows(session, &text, query(&text)).await?;
        rows.iter()
            .map(|row| column::<neo4rs::Node>(row, &text, "n").map(|n| to_node(&n)))
            .collect()
    }

    async fn node_by_id(&self, session: &BoltSession, id: &str) -> Result<Option<Node>> {
        let text = cypher::node_by_id();
        let rows = self.rows(session, text, query(text).param("id", id)).await?;
        match rows.first() {
            Some(row) => Ok(Some(to_node(&column::<neo4rs::Node>(row, text, "n")?))),
            None => Ok(None),
        }
    }

    async fn relations_of(&self, session: &BoltSession, id: &str) -> Result<Vec<PathSegment>> {
        let text = cypher::relations_of();
        let rows = self.rows(session, text, query(text).param("id", id)).await?;
        rows.iter()
            .map(|row| {
                let start = column::<neo4rs::Node>(row, text, "n")?;
                let rel = column::<neo4rs::Relation>(row, text, "r")?;
                let end = column::<neo4rs::Node>(row, text, "m")?;
                Ok(PathSegment::new(to_node(&start), to_relationship(&rel), to_node(&end)))
            })
            .collect()
    }

    async fn shortest_paths(
        &self,
        session: &BoltSession,
        start: &str,
        end: &str,
        mode: PathMode,
    ) -> Result<Vec<Path>> {
        let text = cypher::shortest_paths(mode);
        let q = query(&text).param("start", start).param("end", end);
        let rows = self.rows(session, &text, q).await?;
        rows.iter().map(|row| to_path(&text, row)).collect()
    }

    async fn count_related(&self, session: &BoltSession, count: &CountQuery<'_>) -> Result<u64> {
        let text = cypher::count_related(count);
        let rows = self.rows(session, &text, query(&text).param("id", count.anchor_id)).await?;
        match rows.first() {
            Some(row) => {
                let n: i64 = column(row, &text, "count")?;
                Ok(u64::try_from(n).unwrap_or(0))
            }
            None => Ok(0),
        }
    }
}
