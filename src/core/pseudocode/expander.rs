// src/core/pseudocode/expander.rs
use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::{debug, trace};

use crate::config::{CycleHandling, ExpansionConfig};
use crate::core::call_graph::{CallGraph, EdgeKind, EdgeTarget};
use crate::core::identity::Identity;
use crate::error::{Result, WfmapError};
use super::{ExpansionMarker, PseudocodeLine};

/// Result of expanding one document's pseudocode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedPseudocode {
    pub target: Identity,
    pub lines: Vec<PseudocodeLine>,
    pub max_depth: usize,
    pub cycle_handling: CycleHandling,
    pub counts: ExpansionCounts,
}

/// How many markers of each kind an expansion produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionCounts {
    pub inlined: usize,
    pub cycles: usize,
    pub depth_limits: usize,
    pub unresolved: usize,
}

/// Recursive inliner over a finished call graph.
///
/// Holds only shared references, so one graph and one pseudocode map can
/// serve any number of concurrent expansions.
pub struct PseudocodeExpander<'a> {
    graph: &'a CallGraph,
    per_document: &'a BTreeMap<Identity, Vec<PseudocodeLine>>,
    config: ExpansionConfig,
}

impl<'a> PseudocodeExpander<'a> {
    pub fn new(
        graph: &'a CallGraph,
        per_document: &'a BTreeMap<Identity, Vec<PseudocodeLine>>,
        config: ExpansionConfig,
    ) -> Self {
        Self {
            graph,
            per_document,
            config,
        }
    }

    /// Expand `base` as the pseudocode of `target`.
    ///
    /// Fails only when `target` is not a node of the graph or when an
    /// inlined callee has no entry in the pseudocode map.
    pub fn expand(&self, target: &Identity, base: &[PseudocodeLine]) -> Result<ExpandedPseudocode> {
        if !self.graph.contains(target) {
            return Err(WfmapError::UnknownTarget {
                identity: target.to_string(),
            });
        }

        let mut counts = ExpansionCounts::default();
        let lines = self.expand_lines(target, base, 0, 0, vec![target.clone()], &mut counts)?;

        debug!(
            "Expanded {}: {} inlined, {} cycle(s), {} depth limit(s), {} unresolved",
            target, counts.inlined, counts.cycles, counts.depth_limits, counts.unresolved
        );

        Ok(ExpandedPseudocode {
            target: target.clone(),
            lines,
            max_depth: self.config.max_depth,
            cycle_handling: self.config.cycle_handling,
            counts,
        })
    }

    /// `path` holds the ancestors of this branch, `current` last. It is
    /// moved in and cloned per inlined callee so siblings never share it.
    fn expand_lines(
        &self,
        current: &Identity,
        lines: &[PseudocodeLine],
        depth: usize,
        base_indent: usize,
        path: Vec<Identity>,
        counts: &mut ExpansionCounts,
    ) -> Result<Vec<PseudocodeLine>> {
        let mut out = Vec::with_capacity(lines.len());
        let mut halted = false;

        for line in lines {
            let mut emitted = PseudocodeLine {
                indent: line.indent + base_indent,
                expansion: None,
                ..line.clone()
            };

            if let Some(edge) = self.graph.edge_at(current, &line.source_node_id) {
                emitted.expansion = match (&edge.to, edge.kind) {
                    // Stop mode halts inlining only; unresolved lines below still get marked
                    (EdgeTarget::Node { .. }, EdgeKind::Invoke) if halted => None,
                    (EdgeTarget::Node { identity }, EdgeKind::Invoke) => {
                        if depth >= self.config.max_depth {
                            counts.depth_limits += 1;
                            Some(ExpansionMarker::DepthLimitReached {
                                identity: identity.clone(),
                            })
                        } else if path.contains(identity) {
                            counts.cycles += 1;
                            trace!("Cycle at {} -> {}", current, identity);
                            if self.config.cycle_handling == CycleHandling::Stop {
                                halted = true;
                            }
                            Some(ExpansionMarker::CycleDetected {
                                identity: identity.clone(),
                                path: path.clone(),
                            })
                        } else {
                            let callee = self.per_document.get(identity).ok_or_else(|| {
                                WfmapError::MissingPseudocode {
                                    identity: identity.to_string(),
                                }
                            })?;

                            let mut branch = path.clone();
                            branch.push(identity.clone());
                            counts.inlined += 1;
                            let inlined = self.expand_lines(
                                identity,
                                callee,
                                depth + 1,
                                emitted.indent + 1,
                                branch,
                                counts,
                            )?;
                            Some(ExpansionMarker::Inlined { lines: inlined })
                        }
                    }
                    (_, kind) => {
                        counts.unresolved += 1;
                        Some(ExpansionMarker::Unresolved {
                            raw_target: edge.raw_target.clone(),
                            kind,
                        })
                    }
                };
            }

            out.push(emitted);
        }

        Ok(out)
    }
}

/// Expand `base` (the pseudocode of `target`) against `graph`, inlining callee
/// pseudocode from `per_document` under the bounds in `config`.
pub fn expand(
    target: &Identity,
    base: &[PseudocodeLine],
    graph: &CallGraph,
    per_document: &BTreeMap<Identity, Vec<PseudocodeLine>>,
    config: ExpansionConfig,
) -> Result<ExpandedPseudocode> {
    PseudocodeExpander::new(graph, per_document, config).expand(target, base)
}
