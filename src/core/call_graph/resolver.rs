// src/core/call_graph/resolver.rs
use std::collections::{BTreeSet, HashMap};

use crate::core::identity::normalize_logical_path;

/// Lookup structure over the known logical paths of one document set
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    exact: BTreeSet<String>,
    /// Lower-cased path -> actual paths
    lowercase: HashMap<String, Vec<String>>,
    /// Lower-cased file name -> actual paths
    file_names: HashMap<String, Vec<String>>,
}

/// Outcome of a path lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    Found(String),
    Ambiguous(Vec<String>),
    NotFound,
}

impl PathIndex {
    pub fn new<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = Self::default();

        for path in paths {
            let path = path.to_string();
            index
                .lowercase
                .entry(path.to_lowercase())
                .or_insert_with(Vec::new)
                .push(path.clone());
            index
                .file_names
                .entry(file_name(&path).to_lowercase())
                .or_insert_with(Vec::new)
                .push(path.clone());
            index.exact.insert(path);
        }

        for candidates in index.lowercase.values_mut().chain(index.file_names.values_mut()) {
            candidates.sort();
            candidates.dedup();
        }

        index
    }

    pub fn contains(&self, path: &str) -> bool {
        self.exact.contains(path)
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Exact match, then a unique case-insensitive match
    pub fn lookup_path(&self, path: &str) -> PathMatch {
        if self.exact.contains(path) {
            return PathMatch::Found(path.to_string());
        }

        match self.lowercase.get(&path.to_lowercase()) {
            Some(candidates) if candidates.len() == 1 => PathMatch::Found(candidates[0].clone()),
            Some(candidates) if candidates.len() > 1 => PathMatch::Ambiguous(candidates.clone()),
            _ => PathMatch::NotFound,
        }
    }

    /// Match on file name alone, case-insensitive
    pub fn lookup_file_name(&self, name: &str) -> PathMatch {
        match self.file_names.get(&file_name(name).to_lowercase()) {
            Some(candidates) if candidates.len() == 1 => PathMatch::Found(candidates[0].clone()),
            Some(candidates) if candidates.len() > 1 => PathMatch::Ambiguous(candidates.clone()),
            _ => PathMatch::NotFound,
        }
    }
}

/// Result of resolving one literal invocation target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Unresolved { attempted: String },
}

/// Resolves literal invocation targets against a [`PathIndex`].
///
/// Candidates are tried in order: relative to the invoking document's
/// directory, relative to the project root, relative to the parent of the
/// invoking directory. Each candidate is tried as written and, when it has
/// no extension, with the default markup extension appended. A unique
/// case-insensitive match is accepted next, then a unique file-name match.
pub struct TargetResolver<'a> {
    index: &'a PathIndex,
    default_extension: String,
}

impl<'a> TargetResolver<'a> {
    pub fn new(index: &'a PathIndex, default_extension: &str) -> Self {
        Self {
            index,
            default_extension: default_extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn resolve(&self, source_path: &str, raw_target: &str) -> Resolution {
        let candidates = self.candidates(source_path, raw_target);
        let attempted = candidates.first().cloned().unwrap_or_default();

        for candidate in &candidates {
            if self.index.contains(candidate) {
                return Resolution::Resolved(candidate.clone());
            }
        }

        for candidate in &candidates {
            if let PathMatch::Found(path) = self.index.lookup_path(candidate) {
                return Resolution::Resolved(path);
            }
        }

        if let Some(last) = candidates.last() {
            if let PathMatch::Found(path) = self.index.lookup_file_name(last) {
                return Resolution::Resolved(path);
            }
        }

        Resolution::Unresolved { attempted }
    }

    /// Normalized location a target points at from `source_path`, without lookup
    pub fn attempted_path(&self, source_path: &str, raw_target: &str) -> String {
        join_relative(parent_dir(source_path), raw_target.trim())
    }

    fn candidates(&self, source_path: &str, raw_target: &str) -> Vec<String> {
        let target = raw_target.trim().trim_matches('"');
        let source_dir = parent_dir(source_path);

        let mut bases = vec![join_relative(source_dir, target), normalize_logical_path(target)];
        if !source_dir.is_empty() {
            bases.push(join_relative(parent_dir(source_dir), target));
        }

        let mut candidates: Vec<String> = Vec::new();
        for base in bases {
            if base.is_empty() {
                continue;
            }
            let with_extension = if has_extension(&base) {
                None
            } else {
                Some(format!("{}.{}", base, self.default_extension))
            };
            for candidate in std::iter::once(base).chain(with_extension) {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }
}

/// Directory part of a logical path, empty for top-level documents
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

pub fn file_name(path: &str) -> &str {
    let path = path.trim_end_matches(|c: char| c == '/' || c == '\\');
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

fn has_extension(path: &str) -> bool {
    file_name(path).contains('.')
}

fn join_relative(dir: &str, target: &str) -> String {
    if dir.is_empty() {
        normalize_logical_path(target)
    } else {
        normalize_logical_path(&format!("{}/{}", dir, target))
    }
}
