// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A playbook graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Playbook name
    pub name: String,
    /// Nodes on the canvas, in insertion order
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes, in insertion order
    connections: IndexMap<ConnectionId, Connection>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether a node exists
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Overwrite the position of exactly one node.
    ///
    /// Called on every pointer-move event during a drag, so this stays O(1).
    /// Returns false if the node does not exist.
    pub fn set_node_position(&mut self, node_id: NodeId, position: [f32; 2]) -> bool {
        match self.nodes.get_mut(&node_id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Add a connection between two nodes
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<ConnectionId, ConnectError> {
        if !self.nodes.contains_key(&from) {
            return Err(ConnectError::NodeNotFound(from));
        }
        if !self.nodes.contains_key(&to) {
            return Err(ConnectError::NodeNotFound(to));
        }

        // Self-loops are rejected by construction
        if from == to {
            return Err(ConnectError::SelfLoop);
        }

        let connection = Connection::new(from, to);
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeKind, NodeTemplate};

    fn template(id: &str) -> NodeTemplate {
        NodeTemplate {
            id: id.to_string(),
            title: id.to_string(),
            kind: NodeKind::Action,
            description: String::new(),
        }
    }

    #[test]
    fn test_set_node_position_touches_one_node() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Node::new(&template("a")).with_position(100.0, 100.0));
        let b = graph.add_node(Node::new(&template("b")).with_position(400.0, 100.0));
        graph.connect(a, b).unwrap();

        assert!(graph.set_node_position(a, [150.0, 100.0]));

        assert_eq!(graph.node(a).unwrap().position, [150.0, 100.0]);
        assert_eq!(graph.node(b).unwrap().position, [400.0, 100.0]);
        assert_eq!(graph.connection_count(), 1);
    }

    #[test]
    fn test_set_node_position_unknown_node() {
        let mut graph = Graph::new("test");
        assert!(!graph.set_node_position(NodeId::new(), [0.0, 0.0]));
    }

    #[test]
    fn test_connect_preserves_insertion_order() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Node::new(&template("a")));
        let b = graph.add_node(Node::new(&template("b")));
        let c = graph.add_node(Node::new(&template("c")));

        graph.connect(a, b).unwrap();
        graph.connect(b, c).unwrap();

        let endpoints: Vec<_> = graph.connections().map(|c| (c.from, c.to)).collect();
        assert_eq!(endpoints, vec![(a, b), (b, c)]);
    }

    #[test]
    fn test_connect_rejects_self_loop() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Node::new(&template("a")));

        assert!(matches!(graph.connect(a, a), Err(ConnectError::SelfLoop)));
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_connect_rejects_missing_endpoint() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Node::new(&template("a")));
        let ghost = NodeId::new();

        assert!(matches!(
            graph.connect(a, ghost),
            Err(ConnectError::NodeNotFound(id)) if id == ghost
        ));
        assert!(matches!(
            graph.connect(ghost, a),
            Err(ConnectError::NodeNotFound(id)) if id == ghost
        ));
    }

    #[test]
    fn test_ron_round_trip() {
        let mut graph = Graph::new("Round Trip");
        let a = graph.add_node(Node::new(&template("a")).with_position(10.0, 20.0));
        let b = graph.add_node(Node::new(&template("b")).with_position(30.0, 40.0));
        graph.connect(a, b).unwrap();

        let ron_str =
            ron::ser::to_string_pretty(&graph, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: Graph = ron::from_str(&ron_str).unwrap();

        assert_eq!(loaded.name, "Round Trip");
        assert_eq!(loaded.node_count(), 2);
        assert_eq!(loaded.connection_count(), 1);
        assert_eq!(loaded.node(a).unwrap().position, [10.0, 20.0]);
    }
}
