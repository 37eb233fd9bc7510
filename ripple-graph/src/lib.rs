//! In-memory typed directed multigraph plus the snapshot manager used to
//! restore a workspace to its state immediately after load.

pub mod error;

use indexmap::IndexMap;

use ripple_types::{PropertyMap, PropertyValue};

pub use error::{Error, Result};

/// Which side of an edge to walk from a given node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Default)]
pub struct Node {
    pub node_type: String,
    pub properties: PropertyMap,
}

impl Node {
    /// Attribute lookup used by the condition evaluator and insight
    /// formatter, where `type` is addressable alongside ordinary properties
    /// even though it is stored separately here.
    pub fn get_attr(&self, key: &str) -> PropertyValue {
        if key == "type" {
            PropertyValue::String(self.node_type.clone())
        } else {
            self.properties.get(key).cloned().unwrap_or_default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub edge_type: String,
    pub properties: PropertyMap,
}

impl Edge {
    pub fn get_attr(&self, key: &str) -> PropertyValue {
        if key == "type" {
            PropertyValue::String(self.edge_type.clone())
        } else {
            self.properties.get(key).cloned().unwrap_or_default()
        }
    }
}

/// An in-memory directed multigraph. Nodes and edges are held in
/// insertion order so traversal and rendering are deterministic.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
    out_index: IndexMap<String, Vec<usize>>,
    in_index: IndexMap<String, Vec<usize>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.out_index.clear();
        self.in_index.clear();
    }

    pub fn add_node(&mut self, id: impl Into<String>, node_type: impl Into<String>, properties: PropertyMap) {
        self.nodes.insert(
            id.into(),
            Node {
                node_type: node_type.into(),
                properties,
            },
        );
    }

    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        edge_type: impl Into<String>,
        properties: PropertyMap,
    ) -> Result<()> {
        let source = source.into();
        let target = target.into();
        if !self.nodes.contains_key(&source) {
            return Err(Error::EdgeEndpointNotFound(source));
        }
        if !self.nodes.contains_key(&target) {
            return Err(Error::EdgeEndpointNotFound(target));
        }
        let idx = self.edges.len();
        self.out_index.entry(source.clone()).or_default().push(idx);
        self.in_index.entry(target.clone()).or_default().push(idx);
        self.edges.push(Edge {
            source,
            target,
            edge_type: edge_type.into(),
            properties,
        });
        Ok(())
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn set_node_prop(&mut self, id: &str, key: &str, value: PropertyValue) -> Result<PropertyValue> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        Ok(std::mem::replace(
            node.properties.entry(key.to_string()).or_default(),
            value,
        ))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(id, n)| (id.as_str(), n))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn out_edges(&self, id: &str) -> impl Iterator<Item = &Edge> {
        self.out_index
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.edges[idx])
    }

    pub fn in_edges(&self, id: &str) -> impl Iterator<Item = &Edge> {
        self.in_index
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.edges[idx])
    }

    pub fn edges_in_direction(&self, id: &str, direction: Direction) -> Box<dyn Iterator<Item = &Edge> + '_> {
        match direction {
            Direction::Incoming => Box::new(self.in_edges(id)),
            Direction::Outgoing => Box::new(self.out_edges(id)),
        }
    }
}

/// Deep copy of every node's property map, taken once right after a
/// workspace is loaded. `reset` replays it back onto the live graph.
#[derive(Debug, Default, Clone)]
pub struct SnapshotManager {
    snapshot: IndexMap<String, PropertyMap>,
}

impl SnapshotManager {
    pub fn capture(graph: &Graph) -> Self {
        let snapshot = graph
            .nodes()
            .map(|(id, node)| (id.to_string(), node.properties.clone()))
            .collect();
        Self { snapshot }
    }

    /// Restores every snapshotted node's properties in place. Nodes added to
    /// the graph after load are not in the snapshot and are left untouched.
    pub fn restore(&self, graph: &mut Graph) {
        for (id, props) in &self.snapshot {
            if graph.has_node(id) {
                let node = graph.nodes.get_mut(id).expect("checked has_node above");
                node.properties = props.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn add_edge_rejects_unknown_endpoints() {
        let mut g = Graph::new();
        g.add_node("a", "Company", PropertyMap::new());
        let err = g.add_edge("a", "missing", "LINKS_TO", PropertyMap::new());
        assert!(matches!(err, Err(Error::EdgeEndpointNotFound(_))));
    }

    #[test]
    fn out_and_in_edges_are_direction_scoped() {
        let mut g = Graph::new();
        g.add_node("a", "Company", PropertyMap::new());
        g.add_node("b", "Company", PropertyMap::new());
        g.add_edge("a", "b", "SUPPLIES_TO", PropertyMap::new()).unwrap();

        assert_eq!(g.out_edges("a").count(), 1);
        assert_eq!(g.in_edges("a").count(), 0);
        assert_eq!(g.out_edges("b").count(), 0);
        assert_eq!(g.in_edges("b").count(), 1);
    }

    #[test]
    fn snapshot_restores_mutated_properties_and_ignores_new_nodes() {
        let mut g = Graph::new();
        g.add_node("a", "Company", props(&[("valuation", PropertyValue::Number(100.0))]));
        let snap = SnapshotManager::capture(&g);

        g.set_node_prop("a", "valuation", PropertyValue::Number(40.0)).unwrap();
        g.add_node("b", "Company", PropertyMap::new());

        snap.restore(&mut g);

        assert_eq!(
            g.node("a").unwrap().properties.get("valuation"),
            Some(&PropertyValue::Number(100.0))
        );
        assert!(g.has_node("b"), "nodes added after load survive reset untouched");
    }

    #[test]
    fn type_is_addressable_as_a_virtual_attribute() {
        let mut g = Graph::new();
        g.add_node("a", "Company", PropertyMap::new());
        assert_eq!(
            g.node("a").unwrap().get_attr("type"),
            PropertyValue::String("Company".into())
        );
    }
}
