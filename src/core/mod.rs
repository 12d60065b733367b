// src/core/mod.rs
pub mod model;
pub mod classifier;
pub mod extractors;
pub mod identity;
pub mod context;
pub mod parser;
pub mod call_graph;
pub mod pseudocode;
mod engine;

pub use model::{
    ActivityNode, Argument, Diagnostic, Direction, InvocationKind, InvocationStatement,
    ParseOutcome, PropertyValue, Severity, Variable, WorkflowDocument,
};
pub use classifier::{Classifier, ElementClass};
pub use identity::{content_hash, normalize_logical_path, same_content, Identity, IdentityResolver};
pub use context::AnalysisContext;
pub use parser::StructuralParser;

pub use call_graph::{
    CallChain, CallChainTracer, CallGraph, CallGraphBuilder, CallGraphStats, CycleType, Edge,
    EdgeKind, EdgeTarget, GraphBuildOutput, MermaidRenderer,
};
pub use pseudocode::{
    expand, render_expanded, render_lines, ExpandedPseudocode, ExpansionMarker,
    PseudocodeExpander, PseudocodeGenerator, PseudocodeLine,
};

// Export the main engine
pub use engine::{read_manifest, slugify, Engine, ProjectAnalysis, ProjectManifest, SourceDocument};
