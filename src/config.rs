//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::projection::NodeKind;
use crate::store::{PathMode, StoreConfig};
use crate::{Error, Result};

/// Default bound on concurrently running sub-queries of one operation.
pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub store: StoreConfig,
    /// Fan-out bound for relationship and count queries. At least 1.
    pub max_concurrent_queries: usize,
    pub path_mode: PathMode,
    /// Kinds `materialize()` queries, in merge order.
    pub materialize_kinds: Vec<NodeKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            max_concurrent_queries: DEFAULT_MAX_CONCURRENT_QUERIES,
            path_mode: PathMode::default(),
            materialize_kinds: NodeKind::MATERIALIZE_ORDER.to_vec(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading engine config");
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_queries == 0 {
            return Err(Error::Config("max_concurrent_queries must be at least 1".into()));
        }
        if let Some(kind) = self.materialize_kinds.iter().find(|kind| !kind.is_known()) {
            return Err(Error::Config(format!("unknown node kind in materialize_kinds: {kind}")));
        }
        Ok(())
    }

    pub fn with_path_mode(mut self, mode: PathMode) -> Self {
        self.path_mode = mode;
        self
    }

    pub fn with_max_concurrent_queries(mut self, limit: usize) -> Self {
        self.max_concurrent_queries = limit;
        self
    }

    pub fn with_materialize_kinds(mut self, kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        self.materialize_kinds = kinds.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.materialize_kinds.len(), 8);
        assert_eq!(config.materialize_kinds[0], NodeKind::Wifi);
    }

    #[test]
    fn kinds_accept_store_labels() {
        let config = EngineConfig::from_json(
            r#"{ "materialize_kinds": ["Router", "WIFI_PROBE"], "path_mode": "all" }"#,
        )
        .unwrap();
        assert_eq!(config.materialize_kinds, [NodeKind::Router, NodeKind::WifiProbe]);
        assert_eq!(config.path_mode, PathMode::All);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "max_concurrent_queries": 0 }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "materialize_kinds": ["Toaster"] }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(EngineConfig::from_json("not json"), Err(Error::Config(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            EngineConfig::from_path("/nonexistent/netmap-graph.json"),
            Err(Error::Io(_))
        ));
    }
}
