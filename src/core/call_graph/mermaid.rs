// src/core/call_graph/mermaid.rs
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

use crate::core::identity::Identity;
use super::{CallGraph, EdgeKind, EdgeTarget};

/// Renders a [`CallGraph`] as a Mermaid `flowchart`.
///
/// Entry points are hexagons, orphans use the dashed `orphan` class and
/// unresolved targets become placeholder nodes on dotted, labelled edges.
/// Edges that close or sit on a detected cycle carry a `cycle` label.
pub struct MermaidRenderer {
    direction: String,
}

impl MermaidRenderer {
    pub fn new() -> Self {
        Self {
            direction: "TD".to_string(),
        }
    }

    pub fn with_direction(mut self, direction: &str) -> Self {
        self.direction = direction.to_string();
        self
    }

    pub fn render(&self, graph: &CallGraph) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "flowchart {}", self.direction);

        let ids: BTreeMap<&Identity, String> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, identity)| (identity, format!("n{}", i)))
            .collect();
        let roots: HashSet<&Identity> = graph.roots.iter().collect();

        for (identity, id) in &ids {
            let label = escape(identity.logical_path());
            if roots.contains(identity) {
                let _ = writeln!(out, "    {}{{{{\"{}\"}}}}", id, label);
            } else {
                let _ = writeln!(out, "    {}[\"{}\"]", id, label);
            }
        }

        let cycle_edges = cycle_edges(graph);
        let mut placeholders = 0usize;

        for edge in &graph.edges {
            let Some(from) = ids.get(&edge.from) else {
                continue;
            };

            match &edge.to {
                EdgeTarget::Node { identity } => {
                    let Some(to) = ids.get(identity) else {
                        continue;
                    };
                    if cycle_edges.contains(&(&edge.from, identity)) {
                        let _ = writeln!(out, "    {} -->|cycle| {}", from, to);
                    } else {
                        let _ = writeln!(out, "    {} --> {}", from, to);
                    }
                }
                EdgeTarget::Unresolved { attempted } => {
                    let placeholder = format!("u{}", placeholders);
                    placeholders += 1;

                    let shown = if attempted.is_empty() { "(none)" } else { attempted.as_str() };
                    let _ = writeln!(out, "    {}[/\"{}\"/]:::{}", placeholder, escape(shown), class_for(edge.kind));
                    let _ = writeln!(out, "    {} -.->|{}| {}", from, edge.kind.as_str(), placeholder);
                }
            }
        }

        let orphan_ids: Vec<&str> = ids
            .iter()
            .filter(|(identity, _)| graph.is_orphan(identity))
            .map(|(_, id)| id.as_str())
            .collect();
        if !orphan_ids.is_empty() {
            let _ = writeln!(out, "    class {} orphan", orphan_ids.join(","));
        }

        out.push_str("    classDef orphan stroke-dasharray: 5 5\n");
        out.push_str("    classDef missing fill:#fdd,stroke:#c33\n");
        out.push_str("    classDef dynamic fill:#ffd,stroke:#cc3\n");
        out.push_str("    classDef external fill:#eef,stroke:#669\n");
        out
    }
}

impl Default for MermaidRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn class_for(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Dynamic => "dynamic",
        EdgeKind::ExternalNonMarkup => "external",
        EdgeKind::Missing | EdgeKind::Invoke => "missing",
    }
}

/// Consecutive member pairs of every cycle, including the closing pair
fn cycle_edges(graph: &CallGraph) -> HashSet<(&Identity, &Identity)> {
    let mut pairs = HashSet::new();
    for cycle in &graph.cycles {
        for (i, member) in cycle.iter().enumerate() {
            let next = &cycle[(i + 1) % cycle.len()];
            pairs.insert((member, next));
        }
    }
    pairs
}

fn escape(label: &str) -> String {
    label.replace('"', "#quot;")
}
