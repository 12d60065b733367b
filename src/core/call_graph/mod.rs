// src/core/call_graph/mod.rs
//! Invocation resolution and the multi-root workflow call graph.
//!
//! [`CallGraphBuilder`] is the synchronization point of an analysis pass: it
//! needs every parsed document before it can resolve invocation targets,
//! detect cycles and compute reachability from the declared roots. Everything
//! else in this module reads the finished [`CallGraph`].

mod call_graph;
mod resolver;
mod entry_points;
mod call_chain_tracer;
mod cross_scope;
mod mermaid;

pub use call_graph::{
    CallGraph, CallGraphBuilder, CallGraphStats, CycleType, Edge, EdgeKind, EdgeTarget,
    GraphBuildOutput,
};
pub use resolver::{PathIndex, PathMatch, Resolution, TargetResolver};
pub use entry_points::{EntryPoint, EntryPointResolver, MatchType, RootError, RootErrorKind};
pub use call_chain_tracer::{CallChainTracer, CallChain, CallStep};
pub use cross_scope::{CrossScopeOutcome, CrossScopeResolver, ExternalResolution, ExternalScope};
pub use mermaid::MermaidRenderer;
