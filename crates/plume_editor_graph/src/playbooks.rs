// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node templates and preset playbooks.

use crate::graph::Graph;
use crate::node::{NodeKind, NodeTemplate, TemplateRegistry};

/// Create the default marketing-automation template registry
pub fn create_default_registry() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();

    // Triggers
    registry.register(NodeTemplate {
        id: "manual_trigger".to_string(),
        title: "Manual Trigger".to_string(),
        kind: NodeKind::Trigger,
        description: "Starts the playbook when run by hand".to_string(),
    });
    registry.register(NodeTemplate {
        id: "schedule_trigger".to_string(),
        title: "Schedule".to_string(),
        kind: NodeKind::Trigger,
        description: "Starts the playbook on a fixed schedule".to_string(),
    });

    // Actions
    registry.register(NodeTemplate {
        id: "set_icp".to_string(),
        title: "Set Ideal Customer Profile".to_string(),
        kind: NodeKind::Action,
        description: "Format and prepare profile data".to_string(),
    });
    registry.register(NodeTemplate {
        id: "aggregate".to_string(),
        title: "Aggregate".to_string(),
        kind: NodeKind::Action,
        description: "Combine and structure data".to_string(),
    });
    registry.register(NodeTemplate {
        id: "split_out".to_string(),
        title: "Split Out".to_string(),
        kind: NodeKind::Action,
        description: "Fan records out into separate items".to_string(),
    });
    registry.register(NodeTemplate {
        id: "database_write".to_string(),
        title: "Database Write".to_string(),
        kind: NodeKind::Action,
        description: "Store results in a connected database".to_string(),
    });
    registry.register(NodeTemplate {
        id: "send_email".to_string(),
        title: "Send Email".to_string(),
        kind: NodeKind::Action,
        description: "Send a templated email to a segment".to_string(),
    });

    // AI steps
    registry.register(NodeTemplate {
        id: "ai_agent".to_string(),
        title: "AI Agent".to_string(),
        kind: NodeKind::Ai,
        description: "Run an AI agent over the incoming data".to_string(),
    });

    registry
}

/// Create the seeded "Stage 3 Pipeline Generation" playbook
pub fn create_pipeline_playbook(registry: &TemplateRegistry) -> Graph {
    let mut graph = Graph::new("Stage 3 Pipeline Generation");

    let mut add = |template: &str, title: &str, description: &str, x: f32| {
        registry.create_node(template).map(|node| {
            graph.add_node(
                node.with_title(title)
                    .with_description(description)
                    .with_position(x, 100.0),
            )
        })
    };

    let trigger = add(
        "manual_trigger",
        "When clicking \"Test workflow\"",
        "Get data from airtable and format",
        100.0,
    );
    let icp = add(
        "set_icp",
        "Set Ideal Customer Profile (ICP)",
        "Format and prepare data",
        400.0,
    );
    let aggregate = add(
        "aggregate",
        "Aggregate for AI node",
        "Combine and structure data",
        700.0,
    );
    let agent = add(
        "ai_agent",
        "AI Agent",
        "Generate draft seed KW based on ICP",
        1000.0,
    );
    let split = add("split_out", "Split Out", "Add data to database", 1300.0);
    let store = add(
        "database_write",
        "Connect to your own database",
        "Final data storage",
        1600.0,
    );

    let chain = [trigger, icp, aggregate, agent, split, store];
    for pair in chain.windows(2) {
        if let [Some(from), Some(to)] = pair {
            // Presets only reference registered templates; connect cannot fail here
            let _ = graph.connect(*from, *to);
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_playbook_is_a_chain() {
        let registry = create_default_registry();
        let graph = create_pipeline_playbook(&registry);

        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.connection_count(), 5);

        let ids: Vec<_> = graph.node_ids().collect();
        let endpoints: Vec<_> = graph.connections().map(|c| (c.from, c.to)).collect();
        for (i, (from, to)) in endpoints.iter().enumerate() {
            assert_eq!(*from, ids[i]);
            assert_eq!(*to, ids[i + 1]);
        }
    }

    #[test]
    fn test_registry_covers_all_kinds() {
        let registry = create_default_registry();
        assert!(registry.templates_of_kind(NodeKind::Trigger).count() >= 1);
        assert!(registry.templates_of_kind(NodeKind::Action).count() >= 1);
        assert!(registry.templates_of_kind(NodeKind::Ai).count() >= 1);
    }
}
