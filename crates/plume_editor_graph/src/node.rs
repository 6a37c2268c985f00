// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the playbook canvas.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Display category of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Entry point that starts a playbook run
    Trigger,
    /// A concrete automation step
    Action,
    /// An AI-driven step
    Ai,
}

impl NodeKind {
    /// Get the accent color for this kind (for UI)
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Trigger => [245, 158, 11],
            Self::Action => [99, 102, 241],
            Self::Ai => [168, 85, 247],
        }
    }
}

/// Template a node is stamped from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTemplate {
    /// Unique template identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Display category
    pub kind: NodeKind,
    /// Description shown on the node card
    pub description: String,
}

/// A node instance on the canvas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Template ID this node was created from
    pub template: String,
    /// Display category
    pub kind: NodeKind,
    /// Display title (can be customized per instance)
    pub title: String,
    /// Description shown on the node card
    pub description: String,
    /// Position on the canvas
    pub position: [f32; 2],
}

impl Node {
    /// Create a new node from a template
    pub fn new(template: &NodeTemplate) -> Self {
        Self {
            id: NodeId::new(),
            template: template.id.clone(),
            kind: template.kind,
            title: template.title.clone(),
            description: template.description.clone(),
            position: [0.0, 0.0],
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Override the display title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Override the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Registry of available node templates
pub struct TemplateRegistry {
    /// Registered templates by ID
    templates: indexmap::IndexMap<String, NodeTemplate>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            templates: indexmap::IndexMap::new(),
        }
    }

    /// Register a template
    pub fn register(&mut self, template: NodeTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    /// Get a template by ID
    pub fn get(&self, id: &str) -> Option<&NodeTemplate> {
        self.templates.get(id)
    }

    /// Get all registered templates
    pub fn templates(&self) -> impl Iterator<Item = &NodeTemplate> {
        self.templates.values()
    }

    /// Get templates of a kind
    pub fn templates_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &NodeTemplate> {
        self.templates.values().filter(move |t| t.kind == kind)
    }

    /// Create a node from a template ID
    pub fn create_node(&self, template_id: &str) -> Option<Node> {
        self.get(template_id).map(Node::new)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
