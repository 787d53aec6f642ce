//! Node in the property graph.

use serde::{Deserialize, Serialize};
use super::{PropertyMap, Value};

/// Property holding the application-assigned business id.
pub const BUSINESS_ID_KEY: &str = "id";

/// Opaque store identity. Not stable across sessions; never used as a key
/// outside a single query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub i64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Neo4j 5.x element identifier (e.g. `"4:abc:123"`), when the store has one.
    pub element_id: Option<String>,
    /// Type tags in store order. Only the first one drives classification.
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            element_id: None,
            labels: Vec::new(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_labels(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn first_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Text of a property, `None` when absent or null.
    pub fn text(&self, key: &str) -> Option<String> {
        self.properties.get(key).filter(|v| !v.is_null()).map(Value::as_text)
    }

    /// The business id, if the node carries one.
    pub fn business_id(&self) -> Option<String> {
        self.text(BUSINESS_ID_KEY)
    }

    /// Business id, degrading to `#<identity>` for nodes written without one.
    ///
    /// Every local-graph key goes through here. Silent; the local graph warns
    /// once when such a node first enters it.
    pub fn business_key(&self) -> String {
        self.business_id().unwrap_or_else(|| format!("#{}", self.id))
    }
}
