// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer interaction state machine for the playbook canvas.
//!
//! Translates semantic pointer events (press on a node body, press on a
//! connect affordance, move, release) into drag-move and connect operations
//! against a [`Graph`]. The mode is a single tagged union, so a drag and a
//! connect gesture can never be active at the same time.

use crate::connection::ConnectionId;
use crate::graph::Graph;
use crate::node::NodeId;

/// Current canvas interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionMode {
    /// Nothing in progress
    #[default]
    Idle,
    /// A node is being repositioned
    Dragging {
        /// Node under the pointer
        node: NodeId,
        /// Pointer-to-node-origin offset captured at drag start, so the
        /// node tracks the pointer without jumping to it
        grab_offset: [f32; 2],
    },
    /// A connect gesture is in progress
    Connecting {
        /// Node the gesture started on
        from: NodeId,
    },
}

/// Ephemeral per-canvas interaction state.
///
/// Owned by one canvas view; none of this survives closing the playbook.
#[derive(Debug, Clone, Default)]
pub struct CanvasState {
    mode: InteractionMode,
    /// Last pointer position in canvas space, used to draw the in-progress
    /// connection preview
    cursor: [f32; 2],
}

impl CanvasState {
    /// Create a new idle canvas state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current interaction mode
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Last pointer position in canvas space
    pub fn cursor(&self) -> [f32; 2] {
        self.cursor
    }

    /// Node currently being dragged, if any
    pub fn dragged_node(&self) -> Option<NodeId> {
        match self.mode {
            InteractionMode::Dragging { node, .. } => Some(node),
            _ => None,
        }
    }

    /// Source node of an in-progress connect gesture, if any
    pub fn connection_source(&self) -> Option<NodeId> {
        match self.mode {
            InteractionMode::Connecting { from } => Some(from),
            _ => None,
        }
    }

    /// Pointer pressed on a node body.
    ///
    /// Starts a drag when idle. When a connect gesture is in progress this
    /// press is its completion: an edge is created unless the target is the
    /// gesture's own source node, and the gesture ends either way.
    /// Returns the created connection, if any.
    pub fn press_node(
        &mut self,
        graph: &mut Graph,
        node_id: NodeId,
        pos: [f32; 2],
    ) -> Option<ConnectionId> {
        self.cursor = pos;
        match self.mode {
            InteractionMode::Idle => {
                let Some(node) = graph.node(node_id) else {
                    return None;
                };
                self.mode = InteractionMode::Dragging {
                    node: node_id,
                    grab_offset: [pos[0] - node.position[0], pos[1] - node.position[1]],
                };
                None
            }
            InteractionMode::Connecting { from } => {
                self.mode = InteractionMode::Idle;
                if node_id == from {
                    // Same-node completion cancels the gesture
                    return None;
                }
                graph.connect(from, node_id).ok()
            }
            // A button is already down; a second press cannot happen
            InteractionMode::Dragging { .. } => None,
        }
    }

    /// Pointer pressed on a node's connect affordance.
    ///
    /// Begins a connect gesture from that node. Pressing another node's
    /// affordance mid-gesture restarts the gesture from the new node.
    pub fn press_connector(&mut self, graph: &Graph, node_id: NodeId, pos: [f32; 2]) {
        self.cursor = pos;
        if graph.contains_node(node_id) {
            self.mode = InteractionMode::Connecting { from: node_id };
        }
    }

    /// Pointer pressed on empty canvas. Cancels an in-progress connect
    /// gesture.
    pub fn press_background(&mut self, pos: [f32; 2]) {
        self.cursor = pos;
        if matches!(self.mode, InteractionMode::Connecting { .. }) {
            self.mode = InteractionMode::Idle;
        }
    }

    /// Pointer moved over the canvas.
    ///
    /// Fires on every move event with no throttling; the position write is
    /// O(1). Returns true if a node was repositioned.
    pub fn pointer_moved(&mut self, graph: &mut Graph, pos: [f32; 2]) -> bool {
        self.cursor = pos;
        if let InteractionMode::Dragging { node, grab_offset } = self.mode {
            graph.set_node_position(node, [pos[0] - grab_offset[0], pos[1] - grab_offset[1]])
        } else {
            false
        }
    }

    /// Pointer released anywhere. Ends a drag; the node stays at its last
    /// position. A connect gesture is click-click and survives the release.
    pub fn pointer_released(&mut self) {
        if matches!(self.mode, InteractionMode::Dragging { .. }) {
            self.mode = InteractionMode::Idle;
        }
    }

    /// Pointer left the canvas. Ends a drag just like a release.
    pub fn pointer_left(&mut self) {
        self.pointer_released();
    }

    /// Cancel whatever gesture is in progress (Escape).
    pub fn cancel(&mut self) {
        self.mode = InteractionMode::Idle;
    }

    /// Endpoints of the in-progress connection preview, from the source
    /// anchor to the live cursor. `anchor` maps a node to its outgoing
    /// anchor point.
    pub fn preview_line(
        &self,
        graph: &Graph,
        anchor: impl Fn(&crate::node::Node) -> [f32; 2],
    ) -> Option<([f32; 2], [f32; 2])> {
        let InteractionMode::Connecting { from } = self.mode else {
            return None;
        };
        graph.node(from).map(|node| (anchor(node), self.cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind, NodeTemplate};

    fn template(id: &str) -> NodeTemplate {
        NodeTemplate {
            id: id.to_string(),
            title: id.to_string(),
            kind: NodeKind::Action,
            description: String::new(),
        }
    }

    fn two_node_graph() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new("test");
        let t1 = graph.add_node(Node::new(&template("t1")).with_position(100.0, 100.0));
        let n1 = graph.add_node(Node::new(&template("n1")).with_position(400.0, 100.0));
        (graph, t1, n1)
    }

    #[test]
    fn test_drag_applies_pointer_delta() {
        let (mut graph, t1, n1) = two_node_graph();
        let mut canvas = CanvasState::new();

        // Grab t1 off-center; the node must move by the pointer delta,
        // not snap its origin to the pointer
        let _ = canvas.press_node(&mut graph, t1, [130.0, 160.0]);
        assert_eq!(canvas.dragged_node(), Some(t1));

        canvas.pointer_moved(&mut graph, [180.0, 145.0]);
        assert_eq!(graph.node(t1).unwrap().position, [150.0, 85.0]);
        assert_eq!(graph.node(n1).unwrap().position, [400.0, 100.0]);

        canvas.pointer_released();
        assert_eq!(canvas.mode(), InteractionMode::Idle);
        assert_eq!(graph.node(t1).unwrap().position, [150.0, 85.0]);
    }

    #[test]
    fn test_release_always_ends_drag() {
        let (mut graph, t1, _) = two_node_graph();
        let mut canvas = CanvasState::new();

        let _ = canvas.press_node(&mut graph, t1, [110.0, 110.0]);
        // Pointer leaves the canvas mid-drag
        canvas.pointer_left();
        assert_eq!(canvas.mode(), InteractionMode::Idle);

        let _ = canvas.press_node(&mut graph, t1, [110.0, 110.0]);
        canvas.pointer_released();
        assert_eq!(canvas.mode(), InteractionMode::Idle);
    }

    #[test]
    fn test_connect_gesture_creates_edge() {
        let (mut graph, t1, n1) = two_node_graph();
        let mut canvas = CanvasState::new();

        canvas.press_connector(&graph, t1, [250.0, 150.0]);
        assert_eq!(canvas.connection_source(), Some(t1));

        canvas.pointer_moved(&mut graph, [380.0, 120.0]);
        let created = canvas.press_node(&mut graph, n1, [410.0, 120.0]);
        assert!(created.is_some());
        assert_eq!(canvas.mode(), InteractionMode::Idle);

        let endpoints: Vec<_> = graph.connections().map(|c| (c.from, c.to)).collect();
        assert_eq!(endpoints, vec![(t1, n1)]);
    }

    #[test]
    fn test_connect_same_node_rejected() {
        let (mut graph, t1, _) = two_node_graph();
        let mut canvas = CanvasState::new();

        canvas.press_connector(&graph, t1, [250.0, 150.0]);
        let created = canvas.press_node(&mut graph, t1, [120.0, 120.0]);

        assert!(created.is_none());
        assert_eq!(graph.connection_count(), 0);
        assert_eq!(canvas.mode(), InteractionMode::Idle);
    }

    #[test]
    fn test_background_click_cancels_connect() {
        let (mut graph, t1, _) = two_node_graph();
        let mut canvas = CanvasState::new();

        canvas.press_connector(&graph, t1, [250.0, 150.0]);
        canvas.press_background([700.0, 400.0]);
        assert_eq!(canvas.mode(), InteractionMode::Idle);
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_escape_cancels_any_gesture() {
        let (mut graph, t1, _) = two_node_graph();
        let mut canvas = CanvasState::new();

        let _ = canvas.press_node(&mut graph, t1, [110.0, 110.0]);
        canvas.cancel();
        assert_eq!(canvas.mode(), InteractionMode::Idle);

        canvas.press_connector(&graph, t1, [250.0, 150.0]);
        canvas.cancel();
        assert_eq!(canvas.mode(), InteractionMode::Idle);
    }

    #[test]
    fn test_connector_press_restarts_gesture() {
        let (mut graph, t1, n1) = two_node_graph();
        let mut canvas = CanvasState::new();

        canvas.press_connector(&graph, t1, [250.0, 150.0]);
        canvas.press_connector(&graph, n1, [550.0, 150.0]);
        assert_eq!(canvas.connection_source(), Some(n1));

        let created = canvas.press_node(&mut graph, t1, [120.0, 120.0]);
        assert!(created.is_some());
        let endpoints: Vec<_> = graph.connections().map(|c| (c.from, c.to)).collect();
        assert_eq!(endpoints, vec![(n1, t1)]);
    }

    #[test]
    fn test_preview_line_tracks_cursor() {
        let (mut graph, t1, _) = two_node_graph();
        let mut canvas = CanvasState::new();

        assert!(canvas.preview_line(&graph, |n| n.position).is_none());

        canvas.press_connector(&graph, t1, [250.0, 150.0]);
        canvas.pointer_moved(&mut graph, [320.0, 180.0]);

        let (start, end) = canvas
            .preview_line(&graph, |n| [n.position[0] + 300.0, n.position[1] + 50.0])
            .unwrap();
        assert_eq!(start, [400.0, 150.0]);
        assert_eq!(end, [320.0, 180.0]);
    }

    // Drag t1 by (50, 0), connect t1 -> n1, then a stray click on n1
    // must not create a second edge.
    #[test]
    fn test_drag_then_connect_then_stray_click() {
        let (mut graph, t1, n1) = two_node_graph();
        let mut canvas = CanvasState::new();

        let _ = canvas.press_node(&mut graph, t1, [100.0, 100.0]);
        canvas.pointer_moved(&mut graph, [150.0, 100.0]);
        canvas.pointer_released();
        assert_eq!(graph.node(t1).unwrap().position, [150.0, 100.0]);

        canvas.press_connector(&graph, t1, [300.0, 150.0]);
        let _ = canvas.press_node(&mut graph, n1, [410.0, 120.0]);
        let endpoints: Vec<_> = graph.connections().map(|c| (c.from, c.to)).collect();
        assert_eq!(endpoints, vec![(t1, n1)]);

        // System is idle; this click starts (and a release would end) a
        // drag, never a connection
        let _ = canvas.press_node(&mut graph, n1, [410.0, 120.0]);
        canvas.pointer_released();
        assert_eq!(graph.connection_count(), 1);
    }

    #[test]
    fn test_press_unknown_node_ignored() {
        let (mut graph, _, _) = two_node_graph();
        let mut canvas = CanvasState::new();
        let ghost = NodeId::new();

        let _ = canvas.press_node(&mut graph, ghost, [10.0, 10.0]);
        assert_eq!(canvas.mode(), InteractionMode::Idle);

        canvas.press_connector(&graph, ghost, [10.0, 10.0]);
        assert_eq!(canvas.mode(), InteractionMode::Idle);
    }
}
