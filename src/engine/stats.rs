//! Per-kind node statistics.
//!
//! The fixed topology lives in one table: kind → ordered count templates.
//! Attribute rows always come first, count rows follow in table order.

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

use crate::model::Direction;
use crate::projection::{NodeAttributes, NodeKind, TypedNode};
use crate::store::{CountQuery, HopRange};

// ============================================================================
// Count templates
// ============================================================================

/// One derived count: how many `target` nodes lie within `hops` of the focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTemplate {
    pub label: &'static str,
    pub target: NodeKind,
    pub direction: Direction,
    pub hops: HopRange,
}

const fn count(label: &'static str, target: NodeKind, direction: Direction, hops: HopRange) -> CountTemplate {
    CountTemplate { label, target, direction, hops }
}

const fn span(min: usize, max: usize) -> HopRange {
    HopRange::Range { min, max }
}

static WIRELESS: [CountTemplate; 1] = [
    count("Clients", NodeKind::Client, Direction::Incoming, HopRange::Exact(1)),
];

static ROUTER: [CountTemplate; 2] = [
    count("Wifis", NodeKind::Wifi, Direction::Both, HopRange::Exact(1)),
    count("Clients", NodeKind::Client, Direction::Both, span(1, 2)),
];

static PROBE: [CountTemplate; 1] = [
    count("Clients", NodeKind::Client, Direction::Both, HopRange::Exact(1)),
];

static FLOOR: [CountTemplate; 3] = [
    count("Wifis", NodeKind::Wifi, Direction::Both, span(1, 2)),
    count("Routers", NodeKind::Router, Direction::Both, HopRange::Exact(1)),
    count("Clients", NodeKind::Client, Direction::Both, HopRange::Exact(2)),
];

static BUILDING: [CountTemplate; 4] = [
    count("Floors", NodeKind::Floor, Direction::Both, HopRange::Exact(1)),
    count("Wifis", NodeKind::Wifi, Direction::Both, span(1, 3)),
    count("Routers", NodeKind::Router, Direction::Both, span(1, 2)),
    count("Clients", NodeKind::Client, Direction::Both, span(2, 3)),
];

static HOUSE: [CountTemplate; 3] = [
    count("Wifis", NodeKind::Wifi, Direction::Both, span(1, 3)),
    count("Routers", NodeKind::Router, Direction::Both, span(1, 2)),
    count("Clients", NodeKind::Client, Direction::Both, span(2, 3)),
];

/// Count templates for a kind, in display order.
pub fn count_templates(kind: &NodeKind) -> &'static [CountTemplate] {
    match kind {
        NodeKind::Wifi | NodeKind::Hotspot => &WIRELESS,
        NodeKind::Router => &ROUTER,
        NodeKind::WifiProbe => &PROBE,
        NodeKind::Floor => &FLOOR,
        NodeKind::Building => &BUILDING,
        NodeKind::House => &HOUSE,
        NodeKind::Client | NodeKind::Other(_) => &[],
    }
}

impl CountTemplate {
    /// The store query for this template anchored at `node`.
    pub fn query<'a>(&'a self, node: &'a TypedNode) -> CountQuery<'a> {
        CountQuery {
            anchor_label: node.kind.store_label(),
            anchor_id: &node.id,
            direction: self.direction,
            hops: self.hops,
            target_label: self.target.store_label(),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StatValue {
    Text(String),
    Count(u64),
    /// The count query failed; the slot is kept so the layout stays fixed.
    Unavailable,
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Text(text) => f.write_str(text),
            StatValue::Count(n) => write!(f, "{n}"),
            StatValue::Unavailable => f.write_str("unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeStat {
    pub label: &'static str,
    pub value: StatValue,
    /// Secret value the panel should hide until revealed.
    pub masked: bool,
}

/// Stringified row for the info panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelRow {
    pub label: String,
    pub value: String,
    pub masked: bool,
}

/// Ordered label/value list for one focused node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    pub node_id: String,
    pub kind: NodeKind,
    rows: SmallVec<[NodeStat; 6]>,
}

impl NodeStats {
    /// Attribute rows of `node`, no counts yet.
    pub fn attributes_of(node: &TypedNode) -> Self {
        let mut stats = Self { node_id: node.id.clone(), kind: node.kind.clone(), rows: SmallVec::new() };
        match &node.attributes {
            NodeAttributes::Wireless { essid, bssid, password, pin } => {
                stats.push_text("ESSID", essid);
                stats.push_text("BSSID", bssid);
                if let Some(password) = password {
                    stats.push_secret("Password", password);
                }
                if let Some(pin) = pin {
                    stats.push_secret("Pin", pin);
                }
            }
            NodeAttributes::Probe { essid } => stats.push_text("ESSID", essid),
            NodeAttributes::Router { ip, mac } => {
                stats.push_text("IP", ip);
                stats.push_text("MAC", mac);
            }
            NodeAttributes::Client { ip, mac } => {
                if let Some(ip) = ip {
                    stats.push_text("IP", ip);
                }
                stats.push_text("MAC", mac);
            }
            NodeAttributes::Premises { name, .. } => stats.push_text("Name", name),
            NodeAttributes::Floor { name, .. } => {
                if let Some(name) = name {
                    stats.push_text("Name", name);
                }
            }
            NodeAttributes::Empty => {}
        }
        stats
    }

    fn push_text(&mut self, label: &'static str, text: &str) {
        self.rows.push(NodeStat { label, value: StatValue::Text(text.to_string()), masked: false });
    }

    fn push_secret(&mut self, label: &'static str, text: &str) {
        self.rows.push(NodeStat { label, value: StatValue::Text(text.to_string()), masked: true });
    }

    pub fn push_count(&mut self, label: &'static str, value: Option<u64>) {
        let value = value.map_or(StatValue::Unavailable, StatValue::Count);
        self.rows.push(NodeStat { label, value, masked: false });
    }

    pub fn rows(&self) -> &[NodeStat] {
        &self.rows
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.rows.iter().map(|row| row.label).collect()
    }

    pub fn get(&self, label: &str) -> Option<&StatValue> {
        self.rows.iter().find(|row| row.label == label).map(|row| &row.value)
    }

    pub fn count(&self, label: &str) -> Option<u64> {
        match self.get(label)? {
            StatValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn to_panel_rows(&self) -> Vec<PanelRow> {
        self.rows
            .iter()
            .map(|row| PanelRow { label: row.label.to_string(), value: row.value.to_string(), masked: row.masked })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_flat;
    use crate::model::from_pairs;
    use pretty_assertions::assert_eq;

    fn labels(kind: NodeKind) -> Vec<&'static str> {
        count_templates(&kind).iter().map(|t| t.label).collect()
    }

    #[test]
    fn table_matches_topology() {
        assert_eq!(labels(NodeKind::Floor), ["Wifis", "Routers", "Clients"]);
        assert_eq!(labels(NodeKind::Building), ["Floors", "Wifis", "Routers", "Clients"]);
        assert_eq!(labels(NodeKind::House), ["Wifis", "Routers", "Clients"]);
        assert_eq!(labels(NodeKind::Router), ["Wifis", "Clients"]);
        assert_eq!(labels(NodeKind::Wifi), labels(NodeKind::Hotspot));
        assert!(labels(NodeKind::Client).is_empty());
        assert!(labels(NodeKind::Other("X".into())).is_empty());
    }

    #[test]
    fn floor_hop_bounds() {
        let floor = count_templates(&NodeKind::Floor);
        assert_eq!(floor[0].hops, HopRange::Range { min: 1, max: 2 });
        assert_eq!(floor[1].hops, HopRange::Exact(1));
        assert_eq!(floor[2].hops, HopRange::Exact(2));
    }

    #[test]
    fn wifi_clients_point_inwards() {
        let node = classify_flat("w1", "WIFI", &from_pairs([("essid", "Lobby"), ("bssid", "aa")]));
        let query = count_templates(&NodeKind::Wifi)[0].query(&node);
        assert_eq!(query.anchor_label, "Wifi");
        assert_eq!(query.anchor_id, "w1");
        assert_eq!(query.target_label, "Client");
        assert_eq!(query.direction, Direction::Incoming);
    }

    #[test]
    fn secrets_are_masked_in_panel_rows() {
        let node = classify_flat(
            "w1",
            "WIFI",
            &from_pairs([("essid", "Lobby"), ("bssid", "aa"), ("password", "hunter2")]),
        );
        let mut stats = NodeStats::attributes_of(&node);
        stats.push_count("Clients", Some(3));
        stats.push_count("Other", None);

        let rows = stats.to_panel_rows();
        assert_eq!(stats.labels(), ["ESSID", "BSSID", "Password", "Clients", "Other"]);
        assert!(rows[2].masked);
        assert_eq!(rows[2].value, "hunter2");
        assert_eq!(rows[3].value, "3");
        assert_eq!(rows[4].value, "unavailable");
        assert_eq!(stats.count("Clients"), Some(3));
        assert_eq!(stats.get("Other"), Some(&StatValue::Unavailable));
    }

    #[test]
    fn floor_name_row_is_optional() {
        let unnamed = classify_flat("f1", "FLOOR", &from_pairs([("number", "1")]));
        assert!(NodeStats::attributes_of(&unnamed).rows().is_empty());
        let named = classify_flat("f2", "FLOOR", &from_pairs([("number", "2"), ("name", "Lab")]));
        assert_eq!(NodeStats::attributes_of(&named).labels(), ["Name"]);
    }
}
