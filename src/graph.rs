use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use std::collections::{BTreeMap, HashMap};

/// Top-left corner of a node card, in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// Node id to position, ordered by id for stable serialization.
pub type PositionMap = BTreeMap<String, Point>;

/// Ids arrive as JSON numbers from some backends and strings from others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    pub fn as_string(&self) -> String {
        match self {
            RawId::Number(value) => value.to_string(),
            RawId::Text(value) => value.clone(),
        }
    }
}

/// A resource row as the inventory backend emits it. Unknown fields are
/// ignored; everything but the id is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResource {
    pub id: RawId,
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub position: Option<Point>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRelationship {
    pub id: RawId,
    pub source_id: RawId,
    pub target_id: RawId,
    #[serde(rename = "type", default)]
    pub relationship_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Resource {
    pub id: String,
    pub resource_type: String,
    pub name: Option<String>,
    pub account_id: Option<String>,
    pub network_id: Option<String>,
    pub position: Option<Point>,
}

impl Resource {
    /// Display label: the name when present, otherwise the tail of the id.
    /// Generated ids front-load their prefix, so the last characters are the
    /// distinctive part.
    pub fn label(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                let start = self
                    .id
                    .char_indices()
                    .rev()
                    .nth(7)
                    .map(|(index, _)| index)
                    .unwrap_or(0);
                &self.id[start..]
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Relationship {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: String,
}

/// Normalized diagram graph. Node and edge order is the input order with
/// duplicates and dangling edges removed.
#[derive(Debug, Clone, Default)]
pub struct DiagramGraph {
    pub nodes: Vec<Resource>,
    pub edges: Vec<Relationship>,
    node_order: HashMap<String, usize>,
}

impl DiagramGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.node_order.contains_key(node_id)
    }

    /// Position of the node in the original input, used as a rank hint.
    pub fn node_order(&self, node_id: &str) -> Option<usize> {
        self.node_order.get(node_id).copied()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.as_str())
    }
}

/// Builds a [`DiagramGraph`] from raw backend rows. Duplicate resource ids
/// keep their first occurrence; relationships that reference a missing
/// endpoint are dropped with a warning rather than failing the layout.
pub fn normalize(resources: &[RawResource], relationships: &[RawRelationship]) -> DiagramGraph {
    let mut nodes = Vec::with_capacity(resources.len());
    let mut node_order = HashMap::with_capacity(resources.len());

    for raw in resources {
        let id = raw.id.as_string();
        if node_order.contains_key(&id) {
            debug!("ignoring duplicate resource id {id}");
            continue;
        }
        node_order.insert(id.clone(), nodes.len());
        nodes.push(Resource {
            id,
            resource_type: raw.resource_type.clone().unwrap_or_default(),
            name: raw.name.clone(),
            account_id: raw.account_id.clone(),
            network_id: raw.network_id.clone(),
            position: raw.position,
        });
    }

    let mut edges = Vec::with_capacity(relationships.len());
    for raw in relationships {
        let source_id = raw.source_id.as_string();
        let target_id = raw.target_id.as_string();
        if !node_order.contains_key(&source_id) || !node_order.contains_key(&target_id) {
            warn!(
                "dropping relationship {} with unknown endpoint ({source_id} -> {target_id})",
                raw.id.as_string()
            );
            continue;
        }
        edges.push(Relationship {
            id: raw.id.as_string(),
            source_id,
            target_id,
            relationship_type: raw.relationship_type.clone().unwrap_or_default(),
        });
    }

    DiagramGraph {
        nodes,
        edges,
        node_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(id: &str) -> RawResource {
        RawResource {
            id: RawId::Text(id.to_string()),
            resource_type: Some("ec2".to_string()),
            name: None,
            account_id: None,
            network_id: None,
            position: None,
        }
    }

    fn relationship(id: i64, source: &str, target: &str) -> RawRelationship {
        RawRelationship {
            id: RawId::Number(id),
            source_id: RawId::Text(source.to_string()),
            target_id: RawId::Text(target.to_string()),
            relationship_type: None,
        }
    }

    #[test]
    fn numeric_and_string_ids_share_a_namespace() {
        let resources = vec![RawResource {
            id: RawId::Number(7),
            ..resource("unused")
        }];
        let relationships = vec![RawRelationship {
            id: RawId::Text("r1".to_string()),
            source_id: RawId::Text("7".to_string()),
            target_id: RawId::Number(7),
            relationship_type: None,
        }];
        let graph = normalize(&resources, &relationships);
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].id, "7");
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn dangling_relationships_are_dropped() {
        let resources = vec![resource("a"), resource("b")];
        let relationships = vec![relationship(1, "a", "b"), relationship(2, "a", "99")];
        let graph = normalize(&resources, &relationships);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].id, "1");
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let mut first = resource("a");
        first.name = Some("first".to_string());
        let mut second = resource("a");
        second.name = Some("second".to_string());
        let graph = normalize(&[first, second, resource("b")], &[]);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].name.as_deref(), Some("first"));
        assert_eq!(graph.node_order("b"), Some(1));
    }

    #[test]
    fn input_order_is_preserved() {
        let resources: Vec<RawResource> = ["z", "m", "a", "q"].iter().map(|id| resource(id)).collect();
        let graph = normalize(&resources, &[]);
        let ids: Vec<&str> = graph.node_ids().collect();
        assert_eq!(ids, vec!["z", "m", "a", "q"]);
    }

    #[test]
    fn raw_rows_parse_from_backend_json() {
        let raw = r#"{
            "id": 42,
            "type": "rds",
            "name": "orders-db",
            "accountId": "123456789012",
            "networkId": "vpc-1",
            "position": { "x": 10.0, "y": 20.0 },
            "region": "us-east-1"
        }"#;
        let parsed: RawResource = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.id.as_string(), "42");
        assert_eq!(parsed.resource_type.as_deref(), Some("rds"));
        assert_eq!(parsed.network_id.as_deref(), Some("vpc-1"));
        let position = parsed.position.unwrap();
        assert_eq!(position.x, 10.0);
    }

    #[test]
    fn empty_input_yields_empty_graph() {
        let graph = normalize(&[], &[]);
        assert!(graph.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn label_prefers_name_then_id_tail() {
        let mut raw = resource("i-0abc123def456789a");
        raw.name = Some("web-server".to_string());
        let graph = normalize(&[raw, resource("i-0abc123def456789b"), resource("db")], &[]);

        assert_eq!(graph.nodes[0].label(), "web-server");
        assert_eq!(graph.nodes[1].label(), "f456789b");
        assert_eq!(graph.nodes[2].label(), "db");
    }
}
