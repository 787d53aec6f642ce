//! Node classification: store node → typed node.
//!
//! Only the first label drives the kind. Missing attributes degrade to empty
//! strings; classification never fails.

use crate::model::{Node, PropertyMap, Value};
use crate::projection::{NodeAttributes, NodeKind, TypedNode};

/// Classify a store node.
pub fn classify(raw: &Node) -> TypedNode {
    let kind = match raw.first_label() {
        Some(label) => NodeKind::from_label(label),
        None => NodeKind::Other(String::new()),
    };
    build(raw.business_key(), kind, &raw.properties)
}

/// Classify a node handed over as a flat attribute map with an explicit kind.
pub fn classify_flat(id: &str, kind: &str, properties: &PropertyMap) -> TypedNode {
    build(id.to_string(), NodeKind::from_label(kind), properties)
}

fn build(id: String, kind: NodeKind, properties: &PropertyMap) -> TypedNode {
    let props = Props(properties);
    let (label, attributes) = match &kind {
        NodeKind::Wifi | NodeKind::Hotspot => {
            let essid = props.text("essid");
            let bssid = props.text("bssid");
            (
                format!("{essid} - {bssid}"),
                NodeAttributes::Wireless {
                    essid,
                    bssid,
                    password: props.optional("password"),
                    pin: props.optional("pin"),
                },
            )
        }
        NodeKind::WifiProbe => {
            let essid = props.text("essid");
            (essid.clone(), NodeAttributes::Probe { essid })
        }
        NodeKind::Router => {
            let ip = props.text("ip");
            let mac = props.text("mac");
            (format!("{ip} - {mac}"), NodeAttributes::Router { ip, mac })
        }
        NodeKind::Client => {
            let ip = props.optional("ip");
            let mac = props.text("mac");
            let label = match &ip {
                Some(ip) => format!("{ip} - {mac}"),
                None => mac.clone(),
            };
            (label, NodeAttributes::Client { ip, mac })
        }
        NodeKind::Building | NodeKind::House => {
            let name = props.text("name");
            (
                name.clone(),
                NodeAttributes::Premises { name, building_type: props.optional("type") },
            )
        }
        NodeKind::Floor => {
            let number = props.text("number");
            (
                format!("Floor {number}"),
                NodeAttributes::Floor { number, name: props.optional("name") },
            )
        }
        NodeKind::Other(label) => {
            tracing::debug!(id = %id, label = %label, "unrecognized node kind, keeping as generic node");
            (id.clone(), NodeAttributes::Empty)
        }
    };
    TypedNode {
        render_key: kind.render_key(),
        id,
        kind,
        label,
        attributes,
    }
}

struct Props<'a>(&'a PropertyMap);

impl Props<'_> {
    /// Property text, empty when absent or null.
    fn text(&self, key: &str) -> String {
        self.0.get(key).map(Value::as_text).unwrap_or_default()
    }

    /// Property text, `None` when absent, null or empty.
    fn optional(&self, key: &str) -> Option<String> {
        Some(self.text(key)).filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{from_pairs, NodeId};
    use pretty_assertions::assert_eq;

    fn node(label: &str, props: &[(&str, &str)]) -> Node {
        let mut node = Node::new(NodeId(1)).with_labels([label]).with_property("id", "n1");
        for (k, v) in props {
            node = node.with_property(*k, *v);
        }
        node
    }

    #[test]
    fn wifi_label_joins_essid_and_bssid() {
        let typed = classify(&node("Wifi", &[("essid", "Lobby"), ("bssid", "aa:bb"), ("password", "hunter2")]));
        assert_eq!(typed.kind, NodeKind::Wifi);
        assert_eq!(typed.label, "Lobby - aa:bb");
        assert_eq!(typed.render_key, "wifi");
        assert_eq!(
            typed.attributes,
            NodeAttributes::Wireless {
                essid: "Lobby".into(),
                bssid: "aa:bb".into(),
                password: Some("hunter2".into()),
                pin: None,
            }
        );
    }

    #[test]
    fn client_without_ip_is_labelled_by_mac() {
        let typed = classify(&node("Client", &[("mac", "cc:dd")]));
        assert_eq!(typed.label, "cc:dd");
        let typed = classify(&node("Client", &[("mac", "cc:dd"), ("ip", "10.0.0.7")]));
        assert_eq!(typed.label, "10.0.0.7 - cc:dd");
    }

    #[test]
    fn floor_and_premises() {
        let floor = classify(&Node::new(NodeId(3)).with_labels(["Floor"]).with_property("id", "f1").with_property("number", 2i64));
        assert_eq!(floor.label, "Floor 2");
        assert_eq!(floor.attributes, NodeAttributes::Floor { number: "2".into(), name: None });

        let house = classify(&node("House", &[("name", "Cabin"), ("type", "wood")]));
        assert_eq!(house.label, "Cabin");
        assert_eq!(
            house.attributes,
            NodeAttributes::Premises { name: "Cabin".into(), building_type: Some("wood".into()) }
        );
    }

    #[test]
    fn missing_attributes_degrade_to_empty() {
        let typed = classify(&node("Router", &[]));
        assert_eq!(typed.label, " - ");
        assert_eq!(typed.attributes, NodeAttributes::Router { ip: String::new(), mac: String::new() });
    }

    #[test]
    fn unknown_label_becomes_generic_node() {
        let typed = classify(&node("Handshake", &[("essid", "x")]));
        assert_eq!(typed.kind, NodeKind::Other("Handshake".into()));
        assert_eq!(typed.label, "n1");
        assert!(typed.attributes.is_empty());
        assert_eq!(typed.render_key, "node");
    }

    #[test]
    fn only_the_first_label_counts() {
        let raw = Node::new(NodeId(1)).with_labels(["Hotspot", "Wifi"]).with_property("id", "h1");
        assert_eq!(classify(&raw).kind, NodeKind::Hotspot);
    }

    #[test]
    fn flat_maps_classify_like_store_nodes() {
        let props = from_pairs([("essid", "Guest")]);
        let typed = classify_flat("p1", "WIFI_PROBE", &props);
        assert_eq!(typed.id, "p1");
        assert_eq!(typed.kind, NodeKind::WifiProbe);
        assert_eq!(typed.label, "Guest");
        assert_eq!(typed.essid(), Some("Guest"));
    }
}
