// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor state management.
//!
//! Holds the open playbook, its canvas interaction state, the template
//! catalogue, and file bookkeeping (path, dirty flag, recent playbooks).

use plume_editor_graph::graph::Graph;
use plume_editor_graph::interaction::CanvasState;
use plume_editor_graph::node::{NodeId, TemplateRegistry};
use plume_editor_graph::playbooks::{create_default_registry, create_pipeline_playbook};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Maximum number of recent playbooks to track
const MAX_RECENT_PLAYBOOKS: usize = 10;

/// Spawn grid for nodes added from the template catalogue
const SPAWN_ORIGIN: [f32; 2] = [120.0, 260.0];
const SPAWN_STEP: [f32; 2] = [40.0, 32.0];

/// Main editor state
pub struct EditorState {
    /// The open playbook
    pub playbook: Graph,

    /// Canvas interaction state for the open playbook
    pub canvas: CanvasState,

    /// Node template catalogue
    pub registry: TemplateRegistry,

    /// Current playbook file path
    pub playbook_path: Option<PathBuf>,

    /// Whether the playbook has unsaved changes
    pub dirty: bool,

    /// Recent playbooks list
    pub recent_playbooks: VecDeque<PathBuf>,
}

impl EditorState {
    /// Create a new editor state with the seeded pipeline playbook
    pub fn new() -> Self {
        let registry = create_default_registry();
        let playbook = create_pipeline_playbook(&registry);

        Self {
            playbook,
            canvas: CanvasState::new(),
            registry,
            playbook_path: None,
            dirty: false,
            recent_playbooks: VecDeque::new(),
        }
    }

    /// Replace the open playbook with an empty one
    pub fn new_playbook(&mut self) {
        self.playbook = Graph::new("Untitled Playbook");
        self.canvas = CanvasState::new();
        self.playbook_path = None;
        self.dirty = false;
        tracing::info!("Created new playbook");
    }

    /// Add a node stamped from a template, staggered so repeated inserts
    /// don't stack exactly on top of each other
    pub fn add_node_from_template(&mut self, template_id: &str) -> Option<NodeId> {
        let node = self.registry.create_node(template_id)?;
        let n = self.playbook.node_count() as f32;
        let id = self.playbook.add_node(node.with_position(
            SPAWN_ORIGIN[0] + n * SPAWN_STEP[0],
            SPAWN_ORIGIN[1] + n * SPAWN_STEP[1],
        ));
        self.dirty = true;
        tracing::debug!("Added node from template {template_id}");
        Some(id)
    }

    /// Save the current playbook to its file
    pub fn save_playbook(&mut self) -> Result<(), String> {
        if let Some(path) = &self.playbook_path.clone() {
            self.save_playbook_to_path(path)
        } else {
            Err("No playbook path set".to_string())
        }
    }

    /// Save the current playbook to a specific path (RON)
    pub fn save_playbook_to_path(&mut self, path: &Path) -> Result<(), String> {
        let ron_str = ron::ser::to_string_pretty(&self.playbook, ron::ser::PrettyConfig::default())
            .map_err(|e| format!("Serialization error: {e}"))?;

        std::fs::write(path, ron_str).map_err(|e| format!("File write error: {e}"))?;

        self.playbook_path = Some(path.to_path_buf());
        self.dirty = false;
        self.add_to_recent(path.to_path_buf());

        tracing::info!("Saved playbook to {path:?}");
        Ok(())
    }

    /// Load a playbook from a file (RON)
    pub fn load_playbook(&mut self, path: &Path) -> Result<(), String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("File read error: {e}"))?;

        let playbook: Graph =
            ron::from_str(&content).map_err(|e| format!("Deserialization error: {e}"))?;

        self.playbook = playbook;
        self.canvas = CanvasState::new();
        self.playbook_path = Some(path.to_path_buf());
        self.dirty = false;
        self.add_to_recent(path.to_path_buf());

        tracing::info!("Loaded playbook from {path:?}");
        Ok(())
    }

    /// Export the current playbook as JSON for the web platform
    pub fn export_playbook_json(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(&self.playbook)
            .map_err(|e| format!("Serialization error: {e}"))?;

        std::fs::write(path, json).map_err(|e| format!("File write error: {e}"))?;

        tracing::info!("Exported playbook to {path:?}");
        Ok(())
    }

    /// Check if the playbook has unsaved changes
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Add a playbook to the recent list
    pub fn add_to_recent(&mut self, path: PathBuf) {
        self.recent_playbooks.retain(|p| p != &path);
        self.recent_playbooks.push_front(path);
        while self.recent_playbooks.len() > MAX_RECENT_PLAYBOOKS {
            self.recent_playbooks.pop_back();
        }
    }

    /// Clear the recent playbooks list
    pub fn clear_recent_playbooks(&mut self) {
        self.recent_playbooks.clear();
    }

    /// Playbook display name (for the window title)
    pub fn playbook_name(&self) -> String {
        if let Some(path) = &self.playbook_path {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        } else {
            self.playbook.name.clone()
        }
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_seeds_pipeline() {
        let state = EditorState::new();
        assert_eq!(state.playbook.node_count(), 6);
        assert_eq!(state.playbook.connection_count(), 5);
        assert!(!state.has_unsaved_changes());
    }

    #[test]
    fn test_add_node_from_template_marks_dirty() {
        let mut state = EditorState::new();
        let before = state.playbook.node_count();

        let id = state.add_node_from_template("send_email");
        assert!(id.is_some());
        assert_eq!(state.playbook.node_count(), before + 1);
        assert!(state.has_unsaved_changes());

        assert!(state.add_node_from_template("no_such_template").is_none());
    }

    #[test]
    fn test_staggered_spawn_positions() {
        let mut state = EditorState::new();
        let a = state.add_node_from_template("send_email").unwrap();
        let b = state.add_node_from_template("send_email").unwrap();

        let pa = state.playbook.node(a).unwrap().position;
        let pb = state.playbook.node(b).unwrap().position;
        assert_ne!(pa, pb);
    }

    #[test]
    fn test_recent_playbooks_bounded_and_deduped() {
        let mut state = EditorState::new();
        for i in 0..12 {
            state.add_to_recent(PathBuf::from(format!("playbook-{i}.ron")));
        }
        assert_eq!(state.recent_playbooks.len(), MAX_RECENT_PLAYBOOKS);
        assert_eq!(
            state.recent_playbooks.front(),
            Some(&PathBuf::from("playbook-11.ron"))
        );

        // Re-adding moves to the front without growing the list
        state.add_to_recent(PathBuf::from("playbook-5.ron"));
        assert_eq!(state.recent_playbooks.len(), MAX_RECENT_PLAYBOOKS);
        assert_eq!(
            state.recent_playbooks.front(),
            Some(&PathBuf::from("playbook-5.ron"))
        );
    }

    #[test]
    fn test_playbook_name_falls_back_to_graph_name() {
        let mut state = EditorState::new();
        assert_eq!(state.playbook_name(), "Stage 3 Pipeline Generation");

        state.playbook_path = Some(PathBuf::from("/tmp/q3-outreach.ron"));
        assert_eq!(state.playbook_name(), "q3-outreach");
    }
}
