//! Typed, display-ready node and edge records.

use serde::Serialize;

use crate::model::PropertyMap;
use super::{NodeKind, RelationKind};

/// Kind-specific attributes of a typed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum NodeAttributes {
    /// WIFI and HOTSPOT
    Wireless {
        essid: String,
        bssid: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pin: Option<String>,
    },
    /// WIFI_PROBE
    Probe { essid: String },
    Router { ip: String, mac: String },
    Client {
        #[serde(skip_serializing_if = "Option::is_none")]
        ip: Option<String>,
        mac: String,
    },
    /// BUILDING and HOUSE
    Premises {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        building_type: Option<String>,
    },
    Floor {
        number: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Unknown kinds carry nothing.
    Empty,
}

impl NodeAttributes {
    pub fn is_empty(&self) -> bool {
        matches!(self, NodeAttributes::Empty)
    }
}

/// A node of the local graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedNode {
    /// Business id; the local graph key.
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub attributes: NodeAttributes,
    pub render_key: &'static str,
}

impl TypedNode {
    pub fn essid(&self) -> Option<&str> {
        match &self.attributes {
            NodeAttributes::Wireless { essid, .. } | NodeAttributes::Probe { essid } => Some(essid),
            _ => None,
        }
    }
}

/// Edge attributes: the relationship's properties plus provenance flags.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EdgeAttributes {
    pub properties: PropertyMap,
    /// Neither traversal endpoint matched the recorded start; `source`/`target`
    /// follow traversal order.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub direction_unconfirmed: bool,
}

/// A directed edge of the local graph, keyed by `(source, target)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedEdge {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    pub attributes: EdgeAttributes,
}

impl TypedEdge {
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    /// The endpoint opposite `id`, when `id` is one of them.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}
