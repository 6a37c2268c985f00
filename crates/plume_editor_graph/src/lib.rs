// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playbook canvas framework for the Plume editor.
//!
//! This crate provides the graph model and interaction machinery behind the
//! playbook builder:
//! - Nodes and directed connections with stable ids
//! - A tagged-union pointer interaction machine (drag / two-click connect)
//! - A node template catalogue and preset playbooks
//! - egui canvas rendering
//!
//! ## Architecture
//!
//! Rendering and hit-testing live in [`ui`]; everything it feeds into
//! [`interaction`] is a semantic event, so the gesture logic is testable
//! without a UI.

pub mod connection;
pub mod graph;
pub mod interaction;
pub mod node;
pub mod playbooks;
pub mod ui;

pub use connection::{Connection, ConnectionId};
pub use graph::{ConnectError, Graph};
pub use interaction::{CanvasState, InteractionMode};
pub use node::{Node, NodeId, NodeKind, NodeTemplate, TemplateRegistry};
pub use ui::CanvasView;
