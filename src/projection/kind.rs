//! Node and relationship kinds.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The closed node-type enumeration, plus a soft fallback for labels the
/// engine does not know.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Wifi,
    WifiProbe,
    Hotspot,
    Router,
    Client,
    Building,
    House,
    Floor,
    /// Unrecognized store label, kept verbatim.
    Other(String),
}

impl NodeKind {
    /// Order in which `materialize()` queries kinds by default.
    pub const MATERIALIZE_ORDER: [NodeKind; 8] = [
        NodeKind::Wifi,
        NodeKind::Router,
        NodeKind::Client,
        NodeKind::Building,
        NodeKind::Floor,
        NodeKind::Hotspot,
        NodeKind::House,
        NodeKind::WifiProbe,
    ];

    /// Classify a raw store label. Case, `_` and `-` are ignored for known
    /// kinds, so `WifiProbe`, `WIFIPROBE` and `wifi_probe` all match.
    pub fn from_label(label: &str) -> Self {
        let folded: String = label
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_uppercase)
            .collect();
        match folded.as_str() {
            "WIFI" => NodeKind::Wifi,
            "WIFIPROBE" => NodeKind::WifiProbe,
            "HOTSPOT" => NodeKind::Hotspot,
            "ROUTER" => NodeKind::Router,
            "CLIENT" => NodeKind::Client,
            "BUILDING" => NodeKind::Building,
            "HOUSE" => NodeKind::House,
            "FLOOR" => NodeKind::Floor,
            _ => NodeKind::Other(label.to_string()),
        }
    }

    /// Canonical kind name (`WIFI_PROBE`), or the raw label for `Other`.
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Wifi => "WIFI",
            NodeKind::WifiProbe => "WIFI_PROBE",
            NodeKind::Hotspot => "HOTSPOT",
            NodeKind::Router => "ROUTER",
            NodeKind::Client => "CLIENT",
            NodeKind::Building => "BUILDING",
            NodeKind::House => "HOUSE",
            NodeKind::Floor => "FLOOR",
            NodeKind::Other(label) => label,
        }
    }

    /// Label the store writes for this kind.
    pub fn store_label(&self) -> &str {
        match self {
            NodeKind::Wifi => "Wifi",
            NodeKind::WifiProbe => "WifiProbe",
            NodeKind::Hotspot => "Hotspot",
            NodeKind::Router => "Router",
            NodeKind::Client => "Client",
            NodeKind::Building => "Building",
            NodeKind::House => "House",
            NodeKind::Floor => "Floor",
            NodeKind::Other(label) => label,
        }
    }

    /// Icon key for the renderer; one per known kind.
    pub fn render_key(&self) -> &'static str {
        match self {
            NodeKind::Wifi => "wifi",
            NodeKind::WifiProbe => "wifi-probe",
            NodeKind::Hotspot => "hotspot",
            NodeKind::Router => "router",
            NodeKind::Client => "client",
            NodeKind::Building => "building",
            NodeKind::House => "house",
            NodeKind::Floor => "floor",
            NodeKind::Other(_) => "node",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NodeKind::Other(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(NodeKind::from_label(s))
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(NodeKind::from_label(&label))
    }
}

/// Relationship types of the topology.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// ROUTER → WIFI / HOTSPOT
    Broadcasts,
    /// WIFI / ROUTER → FLOOR / HOUSE
    AttachedTo,
    /// CLIENT → WIFI_PROBE
    Knows,
    /// CLIENT → WIFI / ROUTER
    ConnectsTo,
    /// BUILDING → FLOOR
    HasFloor,
    Other(String),
}

impl RelationKind {
    pub fn from_type(rel_type: &str) -> Self {
        match rel_type.to_uppercase().as_str() {
            "BROADCASTS" => RelationKind::Broadcasts,
            "ATTACHED_TO" => RelationKind::AttachedTo,
            "KNOWS" => RelationKind::Knows,
            "CONNECTS_TO" => RelationKind::ConnectsTo,
            "HAS_FLOOR" => RelationKind::HasFloor,
            _ => RelationKind::Other(rel_type.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RelationKind::Broadcasts => "BROADCASTS",
            RelationKind::AttachedTo => "ATTACHED_TO",
            RelationKind::Knows => "KNOWS",
            RelationKind::ConnectsTo => "CONNECTS_TO",
            RelationKind::HasFloor => "HAS_FLOOR",
            RelationKind::Other(rel_type) => rel_type,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RelationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
