// src/core/call_graph/call_graph.rs - Multi-root workflow call graph
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::core::context::AnalysisContext;
use crate::core::identity::Identity;
use crate::core::model::{InvocationKind, InvocationStatement, WorkflowDocument};
use super::entry_points::{EntryPoint, EntryPointResolver, RootError};
use super::resolver::{PathIndex, Resolution, TargetResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// Literal target resolved to a known document
    Invoke,
    /// Target absent, or literal target matching no known document
    Missing,
    /// Target is an expression evaluated at run time
    Dynamic,
    /// Target is an executable unit that is not workflow markup
    ExternalNonMarkup,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Invoke => "invoke",
            EdgeKind::Missing => "missing",
            EdgeKind::Dynamic => "dynamic",
            EdgeKind::ExternalNonMarkup => "external-non-markup",
        }
    }
}

/// Target side of an edge. Unresolved placeholders are never graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeTarget {
    Node { identity: Identity },
    Unresolved { attempted: String },
}

impl EdgeTarget {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            EdgeTarget::Node { identity } => Some(identity),
            EdgeTarget::Unresolved { .. } => None,
        }
    }
}

/// One invocation statement as a graph edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from: Identity,
    pub to: EdgeTarget,
    pub kind: EdgeKind,
    /// `nodeId` of the invoking activity in the source document
    pub call_site: String,
    /// Target as written in the source document
    pub raw_target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleType {
    /// A document invoking itself
    #[serde(rename = "self")]
    SelfLoop,
    /// Two documents invoking each other
    Mutual,
    Complex,
}

impl CycleType {
    pub fn of(cycle: &[Identity]) -> Self {
        match cycle.len() {
            0 | 1 => CycleType::SelfLoop,
            2 => CycleType::Mutual,
            _ => CycleType::Complex,
        }
    }
}

/// Complete call graph for one analysis pass; read-only once built
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallGraph {
    pub project_id: String,
    /// Identities of every parsed document, reachable or not
    pub nodes: BTreeSet<Identity>,
    pub edges: Vec<Edge>,
    /// Declared entry points that matched a document
    pub roots: Vec<Identity>,
    pub entry_points: Vec<EntryPoint>,
    /// Declared entry points that matched nothing, or more than one thing
    pub root_errors: Vec<RootError>,
    /// Each inner list is one cycle's member sequence
    pub cycles: Vec<Vec<Identity>>,
    /// Nodes not reachable from any root
    pub orphans: Vec<Identity>,
    /// Orphans that nothing invokes at all; the heads of unreachable subgraphs
    pub unreferenced_orphans: Vec<Identity>,
    /// Shortest edge count from any root; absent for orphans
    pub depth_from_root: BTreeMap<Identity, usize>,
    /// Non-fatal findings raised while assembling the graph
    pub warnings: Vec<String>,
    /// Adjacency list over `invoke` edges, deduplicated
    #[serde(skip)]
    adjacency_list: BTreeMap<Identity, Vec<Identity>>,
    /// Reverse adjacency list (who invokes this document)
    #[serde(skip)]
    reverse_adjacency: BTreeMap<Identity, Vec<Identity>>,
    #[serde(skip)]
    by_path: BTreeMap<String, Identity>,
    /// (source identity, call site) -> index into `edges`
    #[serde(skip)]
    call_sites: HashMap<(Identity, String), usize>,
}

/// Graph plus the per-document invocation lists updated by resolution
#[derive(Debug, Clone)]
pub struct GraphBuildOutput {
    pub graph: CallGraph,
    /// Keyed by logical path. Literal invocations that matched no document
    /// come back as `missing`; resolved ones carry `resolved_target_path`.
    pub resolved_invocations: BTreeMap<String, Vec<InvocationStatement>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallGraphStats {
    pub total_workflows: usize,
    pub total_edges: usize,
    pub edges_by_kind: BTreeMap<EdgeKind, usize>,
    pub entry_points: usize,
    pub root_errors: usize,
    pub orphans: usize,
    pub cycles: usize,
    pub max_depth: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
}

/// Builds a [`CallGraph`] from the full document set of one project
pub struct CallGraphBuilder<'a> {
    context: &'a AnalysisContext,
}

impl<'a> CallGraphBuilder<'a> {
    pub fn new(context: &'a AnalysisContext) -> Self {
        Self { context }
    }

    /// Resolve invocations, assemble the graph, detect cycles and compute
    /// reachability from the declared roots.
    pub fn build(&self, documents: &[WorkflowDocument], declared_roots: &[String]) -> GraphBuildOutput {
        let resolver = self.context.identity_resolver();
        let mut graph = CallGraph::new(&self.context.project_id);

        // Stable order regardless of how the documents were produced
        let mut ordered: Vec<&WorkflowDocument> = documents.iter().collect();
        ordered.sort_by(|a, b| a.logical_path.cmp(&b.logical_path));

        let mut accepted: Vec<(&WorkflowDocument, Identity)> = Vec::new();
        for document in ordered {
            if graph.by_path.contains_key(&document.logical_path) {
                let message = format!(
                    "duplicate logical path {}, later document ignored",
                    document.logical_path
                );
                warn!("{}", message);
                graph.warnings.push(message);
                continue;
            }
            let identity = resolver.identity_for(&self.context.project_id, document);
            graph.by_path.insert(document.logical_path.clone(), identity.clone());
            graph.nodes.insert(identity.clone());
            accepted.push((document, identity));
        }

        let index = PathIndex::new(graph.by_path.keys().map(String::as_str));
        let default_extension = self
            .context
            .parser
            .markup_extensions
            .first()
            .map(String::as_str)
            .unwrap_or("xaml");
        let targets = TargetResolver::new(&index, default_extension);

        let mut resolved_invocations = BTreeMap::new();
        for (document, identity) in &accepted {
            let mut updated = Vec::with_capacity(document.invocations.len());
            for invocation in &document.invocations {
                let (edge, statement) = graph.resolve_invocation(&targets, document, identity, invocation);
                graph.add_edge(edge);
                updated.push(statement);
            }
            resolved_invocations.insert(document.logical_path.clone(), updated);
        }

        debug!(
            "Call graph for {}: {} nodes, {} edges",
            self.context.project_id,
            graph.nodes.len(),
            graph.edges.len()
        );

        let (entry_points, root_errors) = EntryPointResolver::new(&index).resolve_all(declared_roots);
        for error in &root_errors {
            warn!("Entry point {} did not resolve: {:?}", error.declared, error.kind);
        }
        graph.roots = entry_points
            .iter()
            .filter_map(|entry| graph.by_path.get(&entry.logical_path).cloned())
            .collect();
        graph.entry_points = entry_points;
        graph.root_errors = root_errors;

        graph.build_adjacency_lists();
        graph.detect_cycles();
        graph.compute_reachability();

        GraphBuildOutput {
            graph,
            resolved_invocations,
        }
    }
}

impl CallGraph {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            nodes: BTreeSet::new(),
            edges: Vec::new(),
            roots: Vec::new(),
            entry_points: Vec::new(),
            root_errors: Vec::new(),
            cycles: Vec::new(),
            orphans: Vec::new(),
            unreferenced_orphans: Vec::new(),
            depth_from_root: BTreeMap::new(),
            warnings: Vec::new(),
            adjacency_list: BTreeMap::new(),
            reverse_adjacency: BTreeMap::new(),
            by_path: BTreeMap::new(),
            call_sites: HashMap::new(),
        }
    }

    fn resolve_invocation(
        &self,
        targets: &TargetResolver<'_>,
        document: &WorkflowDocument,
        from: &Identity,
        invocation: &InvocationStatement,
    ) -> (Edge, InvocationStatement) {
        let mut statement = invocation.clone();
        statement.resolved_target_path = None;

        let (kind, to) = match invocation.kind {
            InvocationKind::Literal => {
                match targets.resolve(&document.logical_path, &invocation.raw_target) {
                    Resolution::Resolved(path) => match self.by_path.get(&path) {
                        Some(identity) => {
                            statement.resolved_target_path = Some(path);
                            (EdgeKind::Invoke, EdgeTarget::Node { identity: identity.clone() })
                        }
                        None => {
                            statement.kind = InvocationKind::Missing;
                            (EdgeKind::Missing, EdgeTarget::Unresolved { attempted: path })
                        }
                    },
                    Resolution::Unresolved { attempted } => {
                        statement.kind = InvocationKind::Missing;
                        (EdgeKind::Missing, EdgeTarget::Unresolved { attempted })
                    }
                }
            }
            InvocationKind::Missing => (
                EdgeKind::Missing,
                EdgeTarget::Unresolved { attempted: invocation.raw_target.clone() },
            ),
            InvocationKind::Dynamic => (
                EdgeKind::Dynamic,
                EdgeTarget::Unresolved { attempted: invocation.raw_target.clone() },
            ),
            InvocationKind::ExternalNonMarkup => (
                EdgeKind::ExternalNonMarkup,
                EdgeTarget::Unresolved {
                    attempted: targets.attempted_path(&document.logical_path, &invocation.raw_target),
                },
            ),
        };

        let edge = Edge {
            from: from.clone(),
            to,
            kind,
            call_site: invocation.source_node_id.clone(),
            raw_target: invocation.raw_target.clone(),
        };
        (edge, statement)
    }

    /// Add an edge to the graph
    pub fn add_edge(&mut self, edge: Edge) {
        self.call_sites
            .insert((edge.from.clone(), edge.call_site.clone()), self.edges.len());
        self.edges.push(edge);
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.nodes.contains(identity)
    }

    pub fn identity_for_path(&self, logical_path: &str) -> Option<&Identity> {
        self.by_path.get(logical_path)
    }

    /// Edge created for the invocation at `call_site` in document `from`
    pub fn edge_at(&self, from: &Identity, call_site: &str) -> Option<&Edge> {
        self.call_sites
            .get(&(from.clone(), call_site.to_string()))
            .and_then(|index| self.edges.get(*index))
    }

    /// All edges leaving a document, in call-site order of creation
    pub fn edges_from<'g>(&'g self, from: &'g Identity) -> impl Iterator<Item = &'g Edge> + 'g {
        self.edges.iter().filter(move |edge| &edge.from == from)
    }

    /// Documents this document invokes (resolved `invoke` edges only)
    pub fn get_callees(&self, identity: &Identity) -> Vec<&Identity> {
        self.adjacency_list
            .get(identity)
            .map(|callees| callees.iter().collect())
            .unwrap_or_default()
    }

    /// Documents that invoke this document
    pub fn get_callers(&self, identity: &Identity) -> Vec<&Identity> {
        self.reverse_adjacency
            .get(identity)
            .map(|callers| callers.iter().collect())
            .unwrap_or_default()
    }

    pub fn in_degree(&self, identity: &Identity) -> usize {
        self.get_callers(identity).len()
    }

    pub fn out_degree(&self, identity: &Identity) -> usize {
        self.get_callees(identity).len()
    }

    /// Every document from which `identity` can be reached
    pub fn dependents(&self, identity: &Identity) -> BTreeSet<Identity> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&Identity> = VecDeque::new();
        queue.push_back(identity);

        while let Some(current) = queue.pop_front() {
            for caller in self.get_callers(current) {
                if caller != identity && seen.insert(caller.clone()) {
                    queue.push_back(caller);
                }
            }
        }

        seen
    }

    /// Documents that invoke others but are invoked by none
    pub fn entry_point_candidates(&self) -> Vec<&Identity> {
        self.nodes
            .iter()
            .filter(|identity| self.in_degree(identity) == 0 && self.out_degree(identity) > 0)
            .collect()
    }

    pub fn cycle_types(&self) -> Vec<CycleType> {
        self.cycles.iter().map(|cycle| CycleType::of(cycle)).collect()
    }

    pub fn is_orphan(&self, identity: &Identity) -> bool {
        self.orphans.binary_search(identity).is_ok()
    }

    /// Get statistics about the call graph
    pub fn get_statistics(&self) -> CallGraphStats {
        let mut edges_by_kind = BTreeMap::new();
        for edge in &self.edges {
            *edges_by_kind.entry(edge.kind).or_insert(0) += 1;
        }

        CallGraphStats {
            total_workflows: self.nodes.len(),
            total_edges: self.edges.len(),
            edges_by_kind,
            entry_points: self.roots.len(),
            root_errors: self.root_errors.len(),
            orphans: self.orphans.len(),
            cycles: self.cycles.len(),
            max_depth: self.depth_from_root.values().copied().max().unwrap_or(0),
            max_in_degree: self.nodes.iter().map(|n| self.in_degree(n)).max().unwrap_or(0),
            max_out_degree: self.nodes.iter().map(|n| self.out_degree(n)).max().unwrap_or(0),
        }
    }

    /// Build adjacency lists for efficient traversal
    fn build_adjacency_lists(&mut self) {
        self.adjacency_list.clear();
        self.reverse_adjacency.clear();

        for edge in &self.edges {
            let Some(target) = edge.to.identity() else {
                continue;
            };

            self.adjacency_list
                .entry(edge.from.clone())
                .or_insert_with(Vec::new)
                .push(target.clone());

            self.reverse_adjacency
                .entry(target.clone())
                .or_insert_with(Vec::new)
                .push(edge.from.clone());
        }

        for list in self
            .adjacency_list
            .values_mut()
            .chain(self.reverse_adjacency.values_mut())
        {
            list.sort();
            list.dedup();
        }
    }

    /// Detect cycles in the call graph using DFS. Cycles are reported, never broken.
    fn detect_cycles(&mut self) {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut current_path = Vec::new();

        let node_keys: Vec<_> = self.nodes.iter().cloned().collect();

        for node in node_keys {
            if !visited.contains(&node) {
                self.dfs_cycle_detection(&node, &mut visited, &mut rec_stack, &mut current_path);
            }
        }

        if !self.cycles.is_empty() {
            debug!("Detected {} cycle(s)", self.cycles.len());
        }
    }

    /// DFS helper for cycle detection
    fn dfs_cycle_detection(
        &mut self,
        node: &Identity,
        visited: &mut HashSet<Identity>,
        rec_stack: &mut HashSet<Identity>,
        current_path: &mut Vec<Identity>,
    ) {
        visited.insert(node.clone());
        rec_stack.insert(node.clone());
        current_path.push(node.clone());

        let callees: Vec<_> = self.adjacency_list.get(node).cloned().unwrap_or_default();

        for callee in callees {
            if !visited.contains(&callee) {
                self.dfs_cycle_detection(&callee, visited, rec_stack, current_path);
            } else if rec_stack.contains(&callee) {
                if let Some(cycle_start) = current_path.iter().position(|n| n == &callee) {
                    let cycle = current_path[cycle_start..].to_vec();
                    self.cycles.push(cycle);
                }
            }
        }

        rec_stack.remove(node);
        current_path.pop();
    }

    /// Multi-source BFS from the roots; unreached non-root nodes become orphans
    fn compute_reachability(&mut self) {
        self.depth_from_root.clear();
        let mut queue = VecDeque::new();

        for root in &self.roots {
            if !self.depth_from_root.contains_key(root) {
                self.depth_from_root.insert(root.clone(), 0);
                queue.push_back(root.clone());
            }
        }

        while let Some(current) = queue.pop_front() {
            let depth = self.depth_from_root.get(&current).copied().unwrap_or(0);
            if let Some(callees) = self.adjacency_list.get(&current) {
                for callee in callees {
                    if !self.depth_from_root.contains_key(callee) {
                        self.depth_from_root.insert(callee.clone(), depth + 1);
                        queue.push_back(callee.clone());
                    }
                }
            }
        }

        self.orphans = self
            .nodes
            .iter()
            .filter(|node| !self.depth_from_root.contains_key(*node))
            .cloned()
            .collect();

        self.unreferenced_orphans = self
            .orphans
            .iter()
            .filter(|node| self.in_degree(node) == 0)
            .cloned()
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::core::model::ActivityNode;

    fn invocation(node_id: &str, target: &str, kind: InvocationKind) -> InvocationStatement {
        InvocationStatement {
            source_node_id: node_id.to_string(),
            raw_target: target.to_string(),
            kind,
            resolved_target_path: None,
            passed_arguments: BTreeMap::new(),
        }
    }

    fn document(path: &str, invocations: Vec<InvocationStatement>) -> WorkflowDocument {
        WorkflowDocument {
            logical_path: path.to_string(),
            content_hash: "0".repeat(64),
            arguments: Vec::new(),
            variables: Vec::new(),
            activities: ActivityNode {
                tag: "Activity".to_string(),
                node_id: "Activity".to_string(),
                display_name: None,
                annotation: None,
                is_visual: false,
                properties: BTreeMap::new(),
                children: Vec::new(),
            },
            invocations,
            root_annotation: None,
            display_name: None,
            expression_language: "VisualBasic".to_string(),
            namespaces: BTreeMap::new(),
        }
    }

    fn calls(path: &str, targets: &[&str]) -> WorkflowDocument {
        let invocations = targets
            .iter()
            .enumerate()
            .map(|(i, t)| invocation(&format!("Sequence[0]/InvokeWorkflowFile[{}]", i), t, InvocationKind::Literal))
            .collect();
        document(path, invocations)
    }

    fn build(documents: &[WorkflowDocument], roots: &[&str]) -> GraphBuildOutput {
        let context = AnalysisContext::with_defaults("test").unwrap();
        let roots: Vec<String> = roots.iter().map(|r| r.to_string()).collect();
        CallGraphBuilder::new(&context).build(documents, &roots)
    }

    fn paths(identities: &[Identity]) -> Vec<&str> {
        identities.iter().map(|i| i.logical_path()).collect()
    }

    #[test]
    fn test_single_three_node_cycle() {
        let docs = vec![
            calls("A.xaml", &["B.xaml"]),
            calls("B.xaml", &["C.xaml"]),
            calls("C.xaml", &["A.xaml"]),
        ];
        let output = build(&docs, &["A.xaml"]);
        let graph = &output.graph;

        assert_eq!(graph.cycles.len(), 1);
        let members: BTreeSet<&str> = graph.cycles[0].iter().map(|i| i.logical_path()).collect();
        assert_eq!(members, ["A.xaml", "B.xaml", "C.xaml"].into_iter().collect());
        assert_eq!(graph.cycle_types(), vec![CycleType::Complex]);
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let docs = vec![
            calls("A.xaml", &["B.xaml", "C.xaml"]),
            calls("B.xaml", &["C.xaml"]),
            calls("C.xaml", &[]),
        ];
        let output = build(&docs, &["A.xaml"]);
        assert!(output.graph.cycles.is_empty());
        assert_eq!(output.graph.get_statistics().max_depth, 1);
    }

    #[test]
    fn test_self_and_mutual_cycles_are_classified() {
        let docs = vec![
            calls("Loop.xaml", &["Loop.xaml"]),
            calls("Ping.xaml", &["Pong.xaml"]),
            calls("Pong.xaml", &["Ping.xaml"]),
        ];
        let output = build(&docs, &["Loop.xaml", "Ping.xaml"]);
        let mut types = output.graph.cycle_types();
        types.sort_by_key(|t| format!("{:?}", t));
        assert_eq!(types, vec![CycleType::Mutual, CycleType::SelfLoop]);
    }

    #[test]
    fn test_reachability_and_orphans() {
        let docs = vec![
            calls("A.xaml", &["B.xaml"]),
            calls("B.xaml", &["C.xaml"]),
            calls("C.xaml", &[]),
            calls("D.xaml", &["E.xaml"]),
            calls("E.xaml", &[]),
        ];
        let output = build(&docs, &["A.xaml"]);
        let graph = &output.graph;

        assert_eq!(paths(&graph.orphans), vec!["D.xaml", "E.xaml"]);
        assert_eq!(paths(&graph.unreferenced_orphans), vec!["D.xaml"]);

        let depth = |p: &str| graph.depth_from_root.get(graph.identity_for_path(p).unwrap()).copied();
        assert_eq!(depth("A.xaml"), Some(0));
        assert_eq!(depth("B.xaml"), Some(1));
        assert_eq!(depth("C.xaml"), Some(2));
        assert_eq!(depth("D.xaml"), None);

        let orphan = |p: &str| graph.is_orphan(graph.identity_for_path(p).unwrap());
        assert!(orphan("E.xaml"));
        assert!(!orphan("A.xaml"));
        assert!(!orphan("C.xaml"));
    }

    #[test]
    fn test_missing_literal_is_reclassified() {
        let docs = vec![calls("Main.xaml", &["Gone.xaml"])];
        let output = build(&docs, &["Main.xaml"]);

        let edge = &output.graph.edges[0];
        assert_eq!(edge.kind, EdgeKind::Missing);
        assert_eq!(edge.to, EdgeTarget::Unresolved { attempted: "Gone.xaml".to_string() });
        assert_eq!(output.graph.nodes.len(), 1);

        let statements = &output.resolved_invocations["Main.xaml"];
        assert_eq!(statements[0].kind, InvocationKind::Missing);
        assert_eq!(statements[0].resolved_target_path, None);
    }

    #[test]
    fn test_dynamic_and_external_edges_keep_raw_target() {
        let docs = vec![document(
            "Main.xaml",
            vec![
                invocation("Sequence[0]/InvokeWorkflowFile[0]", "[folder + \"\\X.xaml\"]", InvocationKind::Dynamic),
                invocation("Sequence[0]/InvokeWorkflowFile[1]", "Coded\\Helper.cs", InvocationKind::ExternalNonMarkup),
            ],
        )];
        let output = build(&docs, &["Main.xaml"]);
        let graph = &output.graph;

        assert_eq!(graph.edges[0].kind, EdgeKind::Dynamic);
        assert_eq!(graph.edges[0].raw_target, "[folder + \"\\X.xaml\"]");
        assert_eq!(graph.edges[1].kind, EdgeKind::ExternalNonMarkup);
        assert_eq!(
            graph.edges[1].to,
            EdgeTarget::Unresolved { attempted: "Coded/Helper.cs".to_string() }
        );
    }

    #[test]
    fn test_resolved_invocation_records_path() {
        let docs = vec![calls("Main.xaml", &["Flows\\Child.xaml"]), calls("Flows/Child.xaml", &[])];
        let output = build(&docs, &["Main.xaml"]);

        let statements = &output.resolved_invocations["Main.xaml"];
        assert_eq!(statements[0].resolved_target_path.as_deref(), Some("Flows/Child.xaml"));

        let main = output.graph.identity_for_path("Main.xaml").unwrap().clone();
        let edge = output.graph.edge_at(&main, "Sequence[0]/InvokeWorkflowFile[0]").unwrap();
        assert_eq!(edge.kind, EdgeKind::Invoke);
        assert_eq!(output.graph.get_callees(&main).len(), 1);
    }

    #[test]
    fn test_unresolved_root_is_recorded() {
        let docs = vec![calls("Main.xaml", &[])];
        let output = build(&docs, &["Main.xaml", "Missing.xaml"]);
        let graph = &output.graph;

        assert_eq!(graph.roots.len(), 1);
        assert_eq!(graph.root_errors.len(), 1);
        assert_eq!(graph.root_errors[0].declared, "Missing.xaml");
    }

    #[test]
    fn test_order_independence() {
        let docs = vec![
            calls("A.xaml", &["B.xaml"]),
            calls("B.xaml", &["A.xaml"]),
            calls("C.xaml", &[]),
        ];
        let mut reversed = docs.clone();
        reversed.reverse();

        let a = build(&docs, &["A.xaml"]).graph;
        let b = build(&reversed, &["A.xaml"]).graph;
        assert_eq!(a.cycles, b.cycles);
        assert_eq!(a.orphans, b.orphans);
        assert_eq!(a.edges, b.edges);
    }

    #[test]
    fn test_dependents() {
        let docs = vec![
            calls("A.xaml", &["B.xaml"]),
            calls("B.xaml", &["C.xaml"]),
            calls("C.xaml", &[]),
        ];
        let output = build(&docs, &["A.xaml"]);
        let graph = &output.graph;
        let c = graph.identity_for_path("C.xaml").unwrap();

        let dependents = graph.dependents(c);
        assert_eq!(paths(&dependents.into_iter().collect::<Vec<_>>()), vec!["A.xaml", "B.xaml"]);
        assert_eq!(graph.entry_point_candidates().len(), 1);
    }
}
