// src/core/call_graph/cross_scope.rs
//! Second-pass resolution of `missing` edges against other document sets.
//!
//! A project's own documents always win: only edges that the primary
//! resolution left as `missing` are looked up here. Scopes are consulted in
//! the order given and the first scope with an unambiguous match wins. The
//! primary graph is never modified; the pass yields separate records.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::identity::{Identity, IdentityResolver};
use crate::core::model::WorkflowDocument;
use super::entry_points::MatchType;
use super::resolver::{PathIndex, PathMatch};
use super::{CallGraph, EdgeKind, EdgeTarget};

/// A named set of documents outside the project, e.g. a shared library
pub struct ExternalScope {
    pub name: String,
    index: PathIndex,
    identities: BTreeMap<String, Identity>,
}

impl ExternalScope {
    pub fn new(name: &str, documents: &[WorkflowDocument], resolver: &IdentityResolver) -> Self {
        let identities: BTreeMap<String, Identity> = documents
            .iter()
            .map(|doc| (doc.logical_path.clone(), resolver.identity_for(name, doc)))
            .collect();
        let index = PathIndex::new(identities.keys().map(String::as_str));

        Self {
            name: name.to_string(),
            index,
            identities,
        }
    }

    fn lookup(&self, attempted: &str) -> CrossScopeOutcome {
        let by_path = match self.index.lookup_path(attempted) {
            PathMatch::Found(path) => {
                let match_type = if path == attempted {
                    MatchType::Exact
                } else {
                    MatchType::CaseInsensitive
                };
                Some((path, match_type))
            }
            PathMatch::Ambiguous(candidates) => return CrossScopeOutcome::Ambiguous { candidates },
            PathMatch::NotFound => None,
        };

        let found = match by_path {
            Some(found) => Some(found),
            None => match self.index.lookup_file_name(attempted) {
                PathMatch::Found(path) => Some((path, MatchType::FileName)),
                PathMatch::Ambiguous(candidates) => {
                    return CrossScopeOutcome::Ambiguous { candidates }
                }
                PathMatch::NotFound => None,
            },
        };

        match found.and_then(|(path, match_type)| {
            self.identities.get(&path).map(|identity| (identity.clone(), match_type))
        }) {
            Some((identity, match_type)) => CrossScopeOutcome::Resolved {
                scope: self.name.clone(),
                identity,
                match_type,
            },
            None => CrossScopeOutcome::Unresolved,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CrossScopeOutcome {
    Resolved {
        scope: String,
        identity: Identity,
        match_type: MatchType,
    },
    /// Several documents in one scope match; none is chosen
    Ambiguous { candidates: Vec<String> },
    Unresolved,
}

/// Re-classification of one `missing` edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalResolution {
    pub from: Identity,
    pub call_site: String,
    pub attempted: String,
    pub outcome: CrossScopeOutcome,
}

pub struct CrossScopeResolver {
    scopes: Vec<ExternalScope>,
}

impl CrossScopeResolver {
    pub fn new(scopes: Vec<ExternalScope>) -> Self {
        Self { scopes }
    }

    /// One record per `missing` edge of `graph`, in edge order
    pub fn resolve(&self, graph: &CallGraph) -> Vec<ExternalResolution> {
        let mut records = Vec::new();

        for edge in graph.edges.iter().filter(|e| e.kind == EdgeKind::Missing) {
            let EdgeTarget::Unresolved { attempted } = &edge.to else {
                continue;
            };
            if attempted.trim().is_empty() {
                continue;
            }

            let mut outcome = CrossScopeOutcome::Unresolved;
            for scope in &self.scopes {
                match scope.lookup(attempted) {
                    CrossScopeOutcome::Unresolved => continue,
                    other => {
                        outcome = other;
                        break;
                    }
                }
            }

            records.push(ExternalResolution {
                from: edge.from.clone(),
                call_site: edge.call_site.clone(),
                attempted: attempted.clone(),
                outcome,
            });
        }

        debug!(
            "Cross-scope pass: {} missing edge(s), {} resolved",
            records.len(),
            records
                .iter()
                .filter(|r| matches!(r.outcome, CrossScopeOutcome::Resolved { .. }))
                .count()
        );

        records
    }
}
