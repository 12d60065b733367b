// src/core/call_graph/call_chain_tracer.rs
use std::collections::HashSet;
use serde::{Serialize, Deserialize};

use crate::core::identity::Identity;
use super::{CallGraph, EdgeKind};

/// Enumerates invocation paths through the call graph
pub struct CallChainTracer {
    /// Maximum number of invoke edges in one chain
    max_depth: usize,
    /// Whether to end a chain when it would re-enter a document already on it
    stop_at_cycles: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallChain {
    /// Root the chain starts from
    pub entry_point: Identity,
    /// Documents in invocation order, entry point first
    pub steps: Vec<CallStep>,
    /// The chain ended because the next step would close a cycle
    pub has_cycles: bool,
    /// The chain ended because it reached `max_depth`
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStep {
    pub identity: Identity,
    /// Depth in the call chain (0 = entry point)
    pub depth: usize,
    /// Activity in the previous step that invoked this one (`None` for the entry point)
    pub call_site: Option<String>,
}

impl CallChain {
    pub fn identities(&self) -> Vec<&Identity> {
        self.steps.iter().map(|step| &step.identity).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl CallChainTracer {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            stop_at_cycles: true,
        }
    }

    /// Keep walking through a cycle once (until `max_depth`) instead of stopping at it
    pub fn follow_cycles(mut self) -> Self {
        self.stop_at_cycles = false;
        self
    }

    /// All simple invocation paths from any root to `target`
    pub fn paths_to(&self, graph: &CallGraph, target: &Identity) -> Vec<CallChain> {
        let mut chains = Vec::new();

        for root in &graph.roots {
            let mut steps = vec![CallStep {
                identity: root.clone(),
                depth: 0,
                call_site: None,
            }];
            let mut on_path = HashSet::new();
            on_path.insert(root.clone());
            self.collect_paths_to(graph, root, target, &mut steps, &mut on_path, &mut chains);
        }

        chains
    }

    fn collect_paths_to(
        &self,
        graph: &CallGraph,
        current: &Identity,
        target: &Identity,
        steps: &mut Vec<CallStep>,
        on_path: &mut HashSet<Identity>,
        chains: &mut Vec<CallChain>,
    ) {
        if current == target {
            chains.push(CallChain {
                entry_point: steps[0].identity.clone(),
                steps: steps.clone(),
                has_cycles: false,
                truncated: false,
            });
            return;
        }

        let depth = steps.len() - 1;
        if depth >= self.max_depth {
            return;
        }

        for edge in graph.edges_from(current).filter(|e| e.kind == EdgeKind::Invoke) {
            let Some(callee) = edge.to.identity() else {
                continue;
            };
            if on_path.contains(callee) {
                continue;
            }

            on_path.insert(callee.clone());
            steps.push(CallStep {
                identity: callee.clone(),
                depth: depth + 1,
                call_site: Some(edge.call_site.clone()),
            });
            self.collect_paths_to(graph, callee, target, steps, on_path, chains);
            steps.pop();
            on_path.remove(callee);
        }
    }

    /// Trace call chains from all roots
    pub fn trace_all_chains(&self, graph: &CallGraph) -> Vec<CallChain> {
        graph
            .roots
            .iter()
            .flat_map(|root| self.trace_from_entry_point(graph, root))
            .collect()
    }

    /// Every maximal chain starting at `entry_point`
    pub fn trace_from_entry_point(&self, graph: &CallGraph, entry_point: &Identity) -> Vec<CallChain> {
        let mut chains = Vec::new();
        let mut steps = vec![CallStep {
            identity: entry_point.clone(),
            depth: 0,
            call_site: None,
        }];
        self.extend_chain(graph, &mut steps, &mut chains);
        chains
    }

    fn extend_chain(&self, graph: &CallGraph, steps: &mut Vec<CallStep>, chains: &mut Vec<CallChain>) {
        let Some(last) = steps.last() else {
            return;
        };
        let current = last.identity.clone();
        let depth = last.depth;

        let finish = |steps: &[CallStep], has_cycles: bool, truncated: bool| CallChain {
            entry_point: steps[0].identity.clone(),
            steps: steps.to_vec(),
            has_cycles,
            truncated,
        };

        let callees: Vec<_> = graph
            .edges_from(&current)
            .filter(|e| e.kind == EdgeKind::Invoke)
            .filter_map(|e| e.to.identity().map(|id| (id.clone(), e.call_site.clone())))
            .collect();

        if callees.is_empty() {
            chains.push(finish(&steps[..], false, false));
            return;
        }

        if depth >= self.max_depth {
            chains.push(finish(&steps[..], false, true));
            return;
        }

        for (callee, call_site) in callees {
            let closes_cycle = steps.iter().any(|step| step.identity == callee);
            if closes_cycle && self.stop_at_cycles {
                chains.push(finish(&steps[..], true, false));
                continue;
            }

            steps.push(CallStep {
                identity: callee,
                depth: depth + 1,
                call_site: Some(call_site),
            });
            self.extend_chain(graph, steps, chains);
            steps.pop();
        }
    }
}

impl Default for CallChainTracer {
    fn default() -> Self {
        Self::new(10)
    }
}
