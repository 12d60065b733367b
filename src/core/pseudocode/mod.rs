//! Pseudocode rendering of workflow activity trees
//!
//! A document's visual activities become one indented line each. The
//! expander then inlines the pseudocode of literally invoked documents,
//! guarded by a depth bound and a per-branch cycle check, and the renderer
//! turns the result into plain text.

mod generator;
mod expander;
mod render;

pub use generator::PseudocodeGenerator;
pub use expander::{expand, ExpandedPseudocode, ExpansionCounts, PseudocodeExpander};
pub use render::{render_expanded, render_lines};

use serde::{Serialize, Deserialize};

use crate::core::call_graph::EdgeKind;
use crate::core::identity::Identity;

/// One line of pseudocode, tied back to the activity it was produced from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PseudocodeLine {
    /// Nesting level among visual activities (0 = top level)
    pub indent: usize,
    pub text: String,
    pub source_node_id: String,
    pub activity_tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<ExpansionMarker>,
}

/// What the expander did with an invocation line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExpansionMarker {
    /// Callee pseudocode, already re-indented below the invoking line
    Inlined { lines: Vec<PseudocodeLine> },
    /// Callee is already on the current call path
    CycleDetected { identity: Identity, path: Vec<Identity> },
    DepthLimitReached { identity: Identity },
    /// Dynamic, missing or non-markup target; never expanded
    Unresolved { raw_target: String, kind: EdgeKind },
}

impl PseudocodeLine {
    pub fn is_expanded(&self) -> bool {
        matches!(self.expansion, Some(ExpansionMarker::Inlined { .. }))
    }
}
