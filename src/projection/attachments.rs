//! Context-menu attachment facts derived from a node's local edges.

use serde::Serialize;

use super::{LocalGraph, NodeKind, RelationKind};

/// What a node is hooked up to, as far as the local graph knows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attachments {
    /// A ROUTER broadcasts this network.
    pub broadcast_by_router: bool,
    /// ATTACHED_TO a HOUSE or FLOOR.
    pub attached_to_premises: bool,
    /// Label of the ROUTER this node CONNECTS_TO.
    pub connected_router: Option<String>,
    /// KNOWS a WIFI_PROBE, or CONNECTS_TO a WIFI.
    pub has_probe_sightings: bool,
}

impl LocalGraph {
    /// Attachment facts for a node; `None` when the node is not in the graph.
    pub fn attachments(&self, id: &str) -> Option<Attachments> {
        self.node(id)?;
        let mut out = Attachments::default();
        for edge in self.edges_of(id) {
            let Some(other) = edge.other_end(id).and_then(|other| self.node(other)) else {
                continue;
            };
            match (&edge.kind, &other.kind) {
                (RelationKind::Broadcasts, NodeKind::Router) => out.broadcast_by_router = true,
                (RelationKind::AttachedTo, NodeKind::House | NodeKind::Floor) => {
                    out.attached_to_premises = true
                }
                (RelationKind::ConnectsTo, NodeKind::Router) => {
                    if out.connected_router.is_none() {
                        out.connected_router = Some(other.label.clone());
                    }
                }
                (RelationKind::ConnectsTo, NodeKind::Wifi) | (RelationKind::Knows, NodeKind::WifiProbe) => {
                    out.has_probe_sightings = true
                }
                _ => {}
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::from_pairs;
    use crate::projection::EdgeAttributes;

    fn link(graph: &mut LocalGraph, source: &str, target: &str, kind: RelationKind) {
        graph.upsert_edge(source.into(), target.into(), kind, EdgeAttributes::default());
    }

    #[test]
    fn client_attachments() {
        let mut graph = LocalGraph::new();
        graph.upsert_flat("c1", "CLIENT", &from_pairs([("mac", "cc:cc")]));
        graph.upsert_flat("r1", "ROUTER", &from_pairs([("ip", "10.0.0.1"), ("mac", "aa:aa")]));
        graph.upsert_flat("p1", "WIFI_PROBE", &from_pairs([("essid", "Home")]));
        link(&mut graph, "c1", "r1", RelationKind::ConnectsTo);
        link(&mut graph, "c1", "p1", RelationKind::Knows);

        let facts = graph.attachments("c1").unwrap();
        assert_eq!(facts.connected_router.as_deref(), Some("10.0.0.1 - aa:aa"));
        assert!(facts.has_probe_sightings);
        assert!(!facts.broadcast_by_router);
    }

    #[test]
    fn wifi_attachments() {
        let mut graph = LocalGraph::new();
        graph.upsert_flat("w1", "WIFI", &from_pairs([("essid", "Lobby"), ("bssid", "bb:bb")]));
        graph.upsert_flat("r1", "ROUTER", &from_pairs([("ip", "10.0.0.1"), ("mac", "aa:aa")]));
        graph.upsert_flat("f1", "FLOOR", &from_pairs([("number", "2")]));
        link(&mut graph, "r1", "w1", RelationKind::Broadcasts);
        link(&mut graph, "w1", "f1", RelationKind::AttachedTo);

        let facts = graph.attachments("w1").unwrap();
        assert!(facts.broadcast_by_router);
        assert!(facts.attached_to_premises);
        assert_eq!(facts.connected_router, None);
        assert!(graph.attachments("missing").is_none());
    }
}
