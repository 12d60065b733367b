// src/core/call_graph/entry_points.rs
use serde::{Serialize, Deserialize};

use crate::core::identity::normalize_logical_path;
use super::resolver::{PathIndex, PathMatch};

/// Why a declared entry point could not be turned into a root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum RootErrorKind {
    /// No parsed document matches the declared path
    NotFound,
    /// More than one document matches and none exactly
    Ambiguous { candidates: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootError {
    pub declared: String,
    #[serde(flatten)]
    pub kind: RootErrorKind,
}

/// How a declared entry point was matched to a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    Exact,
    CaseInsensitive,
    FileName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    pub declared: String,
    pub logical_path: String,
    pub match_type: MatchType,
}

/// Matches declared entry-point paths against the parsed document set
pub struct EntryPointResolver<'a> {
    index: &'a PathIndex,
}

impl<'a> EntryPointResolver<'a> {
    pub fn new(index: &'a PathIndex) -> Self {
        Self { index }
    }

    /// Resolve every declared path. Duplicates (after matching) are kept once,
    /// in declaration order.
    pub fn resolve_all(&self, declared: &[String]) -> (Vec<EntryPoint>, Vec<RootError>) {
        let mut entry_points: Vec<EntryPoint> = Vec::new();
        let mut errors = Vec::new();

        for path in declared {
            match self.resolve(path) {
                Ok(entry) => {
                    if !entry_points.iter().any(|e| e.logical_path == entry.logical_path) {
                        entry_points.push(entry);
                    }
                }
                Err(error) => errors.push(error),
            }
        }

        (entry_points, errors)
    }

    /// Exact path, then a unique case-insensitive path, then a unique file name
    pub fn resolve(&self, declared: &str) -> Result<EntryPoint, RootError> {
        let normalized = normalize_logical_path(declared);
        let found = |logical_path: String, match_type| EntryPoint {
            declared: declared.to_string(),
            logical_path,
            match_type,
        };

        if self.index.contains(&normalized) {
            return Ok(found(normalized, MatchType::Exact));
        }

        match self.index.lookup_path(&normalized) {
            PathMatch::Found(path) => return Ok(found(path, MatchType::CaseInsensitive)),
            PathMatch::Ambiguous(candidates) => {
                return Err(RootError {
                    declared: declared.to_string(),
                    kind: RootErrorKind::Ambiguous { candidates },
                })
            }
            PathMatch::NotFound => {}
        }

        match self.index.lookup_file_name(&normalized) {
            PathMatch::Found(path) => Ok(found(path, MatchType::FileName)),
            PathMatch::Ambiguous(candidates) => Err(RootError {
                declared: declared.to_string(),
                kind: RootErrorKind::Ambiguous { candidates },
            }),
            PathMatch::NotFound => Err(RootError {
                declared: declared.to_string(),
                kind: RootErrorKind::NotFound,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> PathIndex {
        PathIndex::new(["Main.xaml", "Flows/Process.xaml", "A/Init.xaml", "B/Init.xaml"])
    }

    #[test]
    fn test_exact_and_flexible_matches() {
        let index = index();
        let resolver = EntryPointResolver::new(&index);

        assert_eq!(resolver.resolve("Main.xaml").unwrap().match_type, MatchType::Exact);
        assert_eq!(resolver.resolve(".\\Main.xaml").unwrap().match_type, MatchType::Exact);

        let case = resolver.resolve("flows/PROCESS.xaml").unwrap();
        assert_eq!(case.logical_path, "Flows/Process.xaml");
        assert_eq!(case.match_type, MatchType::CaseInsensitive);

        let by_name = resolver.resolve("Process.xaml").unwrap();
        assert_eq!(by_name.logical_path, "Flows/Process.xaml");
        assert_eq!(by_name.match_type, MatchType::FileName);
    }

    #[test]
    fn test_ambiguous_and_missing_roots_are_errors() {
        let index = index();
        let resolver = EntryPointResolver::new(&index);

        let ambiguous = resolver.resolve("Init.xaml").unwrap_err();
        assert!(matches!(ambiguous.kind, RootErrorKind::Ambiguous { ref candidates } if candidates.len() == 2));

        let missing = resolver.resolve("Nope.xaml").unwrap_err();
        assert_eq!(missing.kind, RootErrorKind::NotFound);
    }

    #[test]
    fn test_resolve_all_deduplicates() {
        let index = index();
        let resolver = EntryPointResolver::new(&index);
        let declared = vec![
            "Main.xaml".to_string(),
            "main.xaml".to_string(),
            "Missing.xaml".to_string(),
        ];

        let (roots, errors) = resolver.resolve_all(&declared);
        assert_eq!(roots.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].declared, "Missing.xaml");
    }
}
