// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas rendering and input translation.
//!
//! Draws the playbook as positioned node cards joined by straight connection
//! lines, and feeds egui pointer/keyboard input into the [`CanvasState`]
//! interaction machine. Hit-testing lives here; the interaction machine only
//! sees semantic events.

use crate::graph::Graph;
use crate::interaction::CanvasState;
use crate::node::{Node, NodeId};
use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};

/// Node card dimensions
const NODE_WIDTH: f32 = 300.0;
const NODE_HEIGHT: f32 = 100.0;
const NODE_ROUNDING: f32 = 8.0;
const NODE_SHADOW_OFFSET: f32 = 3.0;
const ACCENT_WIDTH: f32 = 4.0;

/// Connect affordance on the right edge of a card
const CONNECTOR_RADIUS: f32 = 7.0;
const CONNECTOR_HIT_RADIUS: f32 = 11.0;

/// Connection visual parameters
const CONNECTION_THICKNESS: f32 = 2.0;
const CONNECTION_COLOR: Color32 = Color32::from_rgb(99, 102, 241);

/// Grid parameters
const GRID_SPACING: f32 = 24.0;

/// Canvas view settings and rendering
pub struct CanvasView {
    /// Show the background grid
    pub show_grid: bool,
}

impl CanvasView {
    /// Create a new canvas view
    pub fn new() -> Self {
        Self { show_grid: true }
    }

    /// Render the canvas and process input. Returns true if the graph
    /// changed this frame.
    pub fn ui(&mut self, ui: &mut egui::Ui, graph: &mut Graph, canvas: &mut CanvasState) -> bool {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.show_grid {
            draw_grid(&painter, rect);
        }

        let changed = self.handle_input(ui, &response, rect, graph, canvas);

        // Connections below nodes
        self.draw_connections(&painter, rect, graph);
        self.draw_connection_preview(&painter, rect, graph, canvas);
        self.draw_nodes(&painter, rect, graph, canvas);
        self.draw_status_bar(&painter, rect, graph);

        changed
    }

    fn handle_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        rect: Rect,
        graph: &mut Graph,
        canvas: &mut CanvasState,
    ) -> bool {
        let mut changed = false;

        // Live cursor tracking; leaving the canvas ends a drag
        match ui.input(|i| i.pointer.hover_pos()) {
            Some(pos) if rect.contains(pos) => {
                if canvas.pointer_moved(graph, to_canvas(pos, rect)) {
                    changed = true;
                }
            }
            _ => canvas.pointer_left(),
        }

        // A click reports on release, a drag on press; exactly one fires
        let pressed =
            response.drag_started_by(egui::PointerButton::Primary) || response.clicked();
        if pressed {
            if let Some(pos) = response.interact_pointer_pos() {
                let canvas_pos = to_canvas(pos, rect);
                if let Some(node_id) = find_connector_at(canvas_pos, graph) {
                    canvas.press_connector(graph, node_id, canvas_pos);
                } else if let Some(node_id) = find_node_at(canvas_pos, graph) {
                    if canvas.press_node(graph, node_id, canvas_pos).is_some() {
                        changed = true;
                    }
                } else {
                    canvas.press_background(canvas_pos);
                }
            }
        }

        if ui.input(|i| i.pointer.any_released()) {
            canvas.pointer_released();
        }

        if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
            canvas.cancel();
        }

        changed
    }

    fn draw_connections(&self, painter: &egui::Painter, rect: Rect, graph: &Graph) {
        for connection in graph.connections() {
            let from = graph.node(connection.from);
            let to = graph.node(connection.to);

            if let (Some(from), Some(to)) = (from, to) {
                painter.line_segment(
                    [
                        to_screen(out_anchor(from), rect),
                        to_screen(in_anchor(to), rect),
                    ],
                    Stroke::new(CONNECTION_THICKNESS, CONNECTION_COLOR),
                );
            }
        }
    }

    fn draw_connection_preview(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        graph: &Graph,
        canvas: &CanvasState,
    ) {
        if let Some((start, end)) = canvas.preview_line(graph, out_anchor) {
            painter.extend(egui::Shape::dashed_line(
                &[to_screen(start, rect), to_screen(end, rect)],
                Stroke::new(CONNECTION_THICKNESS, CONNECTION_COLOR),
                6.0,
                4.0,
            ));
        }
    }

    fn draw_nodes(&self, painter: &egui::Painter, rect: Rect, graph: &Graph, canvas: &CanvasState) {
        let connecting_from = canvas.connection_source();

        for node in graph.nodes() {
            let card = Rect::from_min_size(
                to_screen(node.position, rect),
                Vec2::new(NODE_WIDTH, NODE_HEIGHT),
            );

            if !card.intersects(rect) {
                continue;
            }

            // Shadow
            painter.rect_filled(
                card.translate(Vec2::splat(NODE_SHADOW_OFFSET)),
                NODE_ROUNDING,
                Color32::from_rgba_unmultiplied(0, 0, 0, 50),
            );

            painter.rect_filled(card, NODE_ROUNDING, Color32::from_rgb(38, 38, 42));

            let [r, g, b] = node.kind.color();
            let accent = Color32::from_rgb(r, g, b);
            painter.rect_filled(
                Rect::from_min_size(card.min, Vec2::new(ACCENT_WIDTH, card.height())),
                NODE_ROUNDING / 2.0,
                accent,
            );

            // Dragged node gets the highlight border, like the reference UI
            let outlined = canvas.dragged_node() == Some(node.id) || connecting_from == Some(node.id);
            let stroke = if outlined {
                Stroke::new(2.0, CONNECTION_COLOR)
            } else {
                Stroke::new(1.0, Color32::from_gray(70))
            };
            painter.rect_stroke(card, NODE_ROUNDING, stroke);

            painter.text(
                card.min + Vec2::new(16.0, 18.0),
                Align2::LEFT_TOP,
                &node.title,
                FontId::proportional(13.0),
                Color32::from_gray(235),
            );
            painter.text(
                card.min + Vec2::new(16.0, 40.0),
                Align2::LEFT_TOP,
                &node.description,
                FontId::proportional(11.0),
                Color32::from_gray(160),
            );

            self.draw_connector(painter, node, rect, canvas);
        }
    }

    fn draw_connector(
        &self,
        painter: &egui::Painter,
        node: &Node,
        rect: Rect,
        canvas: &CanvasState,
    ) {
        let pos = to_screen(out_anchor(node), rect);
        let hovered = pos.distance(to_screen(canvas.cursor(), rect)) < CONNECTOR_HIT_RADIUS;
        let active = canvas.connection_source() == Some(node.id);

        let radius = if hovered || active {
            CONNECTOR_RADIUS * 1.3
        } else {
            CONNECTOR_RADIUS
        };
        let color = if active {
            CONNECTION_COLOR
        } else {
            Color32::from_gray(120)
        };

        painter.circle_filled(pos, radius, color);
        painter.circle_stroke(pos, radius, Stroke::new(1.0, Color32::from_gray(30)));
    }

    fn draw_status_bar(&self, painter: &egui::Painter, rect: Rect, graph: &Graph) {
        painter.text(
            Pos2::new(rect.left() + 8.0, rect.bottom() - 10.0),
            Align2::LEFT_CENTER,
            format!(
                "Nodes: {} | Connections: {}",
                graph.node_count(),
                graph.connection_count(),
            ),
            FontId::proportional(11.0),
            Color32::from_gray(150),
        );
    }
}

impl Default for CanvasView {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_grid(painter: &egui::Painter, rect: Rect) {
    let color = Color32::from_rgba_unmultiplied(70, 70, 70, 90);

    let mut x = rect.left();
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, color),
        );
        x += GRID_SPACING;
    }

    let mut y = rect.top();
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, color),
        );
        y += GRID_SPACING;
    }
}

fn to_canvas(pos: Pos2, rect: Rect) -> [f32; 2] {
    [pos.x - rect.left(), pos.y - rect.top()]
}

fn to_screen(pos: [f32; 2], rect: Rect) -> Pos2 {
    Pos2::new(pos[0] + rect.left(), pos[1] + rect.top())
}

/// Outgoing connection anchor: right-middle of the card. Doubles as the
/// connect affordance location.
fn out_anchor(node: &Node) -> [f32; 2] {
    [node.position[0] + NODE_WIDTH, node.position[1] + NODE_HEIGHT / 2.0]
}

/// Incoming connection anchor: left-middle of the card
fn in_anchor(node: &Node) -> [f32; 2] {
    [node.position[0], node.position[1] + NODE_HEIGHT / 2.0]
}

/// Find the connect affordance under the pointer, if any
fn find_connector_at(pos: [f32; 2], graph: &Graph) -> Option<NodeId> {
    let mut hit = None;
    for node in graph.nodes() {
        let anchor = out_anchor(node);
        let dx = pos[0] - anchor[0];
        let dy = pos[1] - anchor[1];
        if (dx * dx + dy * dy).sqrt() < CONNECTOR_HIT_RADIUS {
            // Last hit wins: topmost card in insertion order
            hit = Some(node.id);
        }
    }
    hit
}

/// Find the node card under the pointer, if any
fn find_node_at(pos: [f32; 2], graph: &Graph) -> Option<NodeId> {
    let mut hit = None;
    for node in graph.nodes() {
        let card = Rect::from_min_size(
            Pos2::new(node.position[0], node.position[1]),
            Vec2::new(NODE_WIDTH, NODE_HEIGHT),
        );
        if card.contains(Pos2::new(pos[0], pos[1])) {
            hit = Some(node.id);
        }
    }
    hit
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
    fn test_connector_hit_wins_over_card() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Node::new(&template("a")).with_position(100.0, 100.0));

        // Right-middle edge of the card
        let anchor = [100.0 + NODE_WIDTH, 100.0 + NODE_HEIGHT / 2.0];
        assert_eq!(find_connector_at(anchor, &graph), Some(a));
        // Just inside the card body, away from the edge
        assert_eq!(find_connector_at([150.0, 150.0], &graph), None);
        assert_eq!(find_node_at([150.0, 150.0], &graph), Some(a));
        assert_eq!(find_node_at([50.0, 50.0], &graph), None);
    }

    #[test]
    fn test_topmost_card_wins() {
        let mut graph = Graph::new("test");
        let _under = graph.add_node(Node::new(&template("under")).with_position(100.0, 100.0));
        let over = graph.add_node(Node::new(&template("over")).with_position(150.0, 120.0));

        assert_eq!(find_node_at([200.0, 150.0], &graph), Some(over));
    }
}
