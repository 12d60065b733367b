mod common;

use std::collections::BTreeMap;

use wfmap::config::{CycleHandling, ExpansionConfig};
use wfmap::core::{
    expand, render_expanded, CallGraph, CallGraphBuilder, ExpansionMarker, Identity,
    PseudocodeGenerator, PseudocodeLine,
};

use common::{context, parse, workflow_calling};

struct Project {
    graph: CallGraph,
    pseudocode: BTreeMap<Identity, Vec<PseudocodeLine>>,
}

impl Project {
    fn build(workflows: &[(&str, &[&str])]) -> Self {
        let context = context();
        let documents: Vec<_> = workflows
            .iter()
            .map(|(path, targets)| parse(&context, path, &workflow_calling(path.trim_end_matches(".xaml"), targets)))
            .collect();
        let root = vec![workflows[0].0.to_string()];
        let graph = CallGraphBuilder::new(&context).build(&documents, &root).graph;

        let generator = PseudocodeGenerator::new();
        let pseudocode = documents
            .iter()
            .map(|doc| {
                let identity = graph.identity_for_path(&doc.logical_path).unwrap().clone();
                (identity, generator.generate(doc))
            })
            .collect();

        Self { graph, pseudocode }
    }

    fn expand(&self, path: &str, max_depth: usize) -> wfmap::core::ExpandedPseudocode {
        let target = self.graph.identity_for_path(path).unwrap();
        expand(
            target,
            &self.pseudocode[target],
            &self.graph,
            &self.pseudocode,
            ExpansionConfig {
                max_depth,
                cycle_handling: CycleHandling::Mark,
            },
        )
        .unwrap()
    }
}

fn markers(lines: &[PseudocodeLine]) -> Vec<&ExpansionMarker> {
    let mut found = Vec::new();
    for line in lines {
        if let Some(marker) = &line.expansion {
            found.push(marker);
            if let ExpansionMarker::Inlined { lines } = marker {
                found.extend(markers(lines));
            }
        }
    }
    found
}

#[test]
fn test_depth_one_inlines_child_but_not_grandchild() {
    let project = Project::build(&[
        ("X.xaml", &["Y.xaml"]),
        ("Y.xaml", &["Z.xaml"]),
        ("Z.xaml", &[]),
    ]);

    let expanded = project.expand("X.xaml", 1);
    let found = markers(&expanded.lines);

    assert_eq!(found.len(), 2);
    assert!(matches!(found[0], ExpansionMarker::Inlined { .. }));
    assert!(matches!(
        found[1],
        ExpansionMarker::DepthLimitReached { identity } if identity.logical_path() == "Z.xaml"
    ));

    let text = render_expanded(&expanded);
    assert!(text.contains("[Y Sequence] Sequence"));
    assert!(!text.contains("[Z Sequence] Sequence"));
    assert!(text.contains("[DEPTH LIMIT REACHED: Z.xaml] (max depth: 1)"));
}

#[test]
fn test_mutual_recursion_terminates_with_one_cycle_marker() {
    let project = Project::build(&[("X.xaml", &["Y.xaml"]), ("Y.xaml", &["X.xaml"])]);

    let expanded = project.expand("X.xaml", 3);
    let cycles: Vec<_> = markers(&expanded.lines)
        .into_iter()
        .filter(|m| matches!(m, ExpansionMarker::CycleDetected { .. }))
        .collect();

    assert_eq!(cycles.len(), 1);
    assert_eq!(expanded.counts.cycles, 1);
    assert!(render_expanded(&expanded).contains("[CYCLE DETECTED: X.xaml]"));
}

#[test]
fn test_zero_depth_expands_nothing() {
    let project = Project::build(&[("X.xaml", &["Y.xaml"]), ("Y.xaml", &[])]);

    let expanded = project.expand("X.xaml", 0);
    assert_eq!(expanded.counts.inlined, 0);
    assert_eq!(expanded.counts.depth_limits, 1);
    assert_eq!(expanded.lines.len(), project.pseudocode[&expanded.target].len());
}
