// src/core/model.rs
//! Value types produced by one analysis pass.
//!
//! Everything here is constructed once and never mutated afterwards; a
//! re-parse of changed content yields new values with a new hash.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

/// Direction of a workflow argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::InOut => "inout",
        }
    }
}

/// Argument declared in the workflow's member section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    pub name: String,
    /// Full type signature as written, e.g. `InArgument(x:String)`
    #[serde(rename = "type")]
    pub type_name: String,
    pub direction: Direction,
    pub annotation: Option<String>,
    pub default_value: Option<String>,
}

/// Variable declared in some activity scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// `nodeId` of the nearest enclosing scope
    pub scope_id: String,
    pub default_value: Option<String>,
}

/// Value of one activity property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum PropertyValue {
    Literal(String),
    Expression(String),
    Nested(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Flat string form, `None` for nested values
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Literal(s) | PropertyValue::Expression(s) => Some(s),
            PropertyValue::Nested(_) => None,
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, PropertyValue::Expression(_))
    }
}

/// One element of the activity hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityNode {
    /// Local tag name, namespace prefix removed
    pub tag: String,
    /// Sibling-indexed locator, e.g. `Sequence[0]/If[1]/Then/Assign[0]`
    pub node_id: String,
    pub display_name: Option<String>,
    pub annotation: Option<String>,
    pub is_visual: bool,
    pub properties: BTreeMap<String, PropertyValue>,
    pub children: Vec<ActivityNode>,
}

impl ActivityNode {
    /// Pre-order iterator over this node and all descendants
    pub fn iter(&self) -> ActivityIter<'_> {
        ActivityIter { stack: vec![self] }
    }

    pub fn find(&self, node_id: &str) -> Option<&ActivityNode> {
        self.iter().find(|node| node.node_id == node_id)
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn visual_count(&self) -> usize {
        self.iter().filter(|node| node.is_visual).count()
    }
}

pub struct ActivityIter<'a> {
    stack: Vec<&'a ActivityNode>,
}

impl<'a> Iterator for ActivityIter<'a> {
    type Item = &'a ActivityNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// How an invocation target was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvocationKind {
    Literal,
    Dynamic,
    Missing,
    ExternalNonMarkup,
}

/// A statement in one document that names another unit to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationStatement {
    pub source_node_id: String,
    /// Target exactly as written in the document
    pub raw_target: String,
    pub kind: InvocationKind,
    /// Set only for literal targets that resolved to a known document
    pub resolved_target_path: Option<String>,
    pub passed_arguments: BTreeMap<String, String>,
}

/// Parsed form of one workflow document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    pub logical_path: String,
    /// Full hex SHA-256 of the normalized structural content
    pub content_hash: String,
    pub arguments: Vec<Argument>,
    pub variables: Vec<Variable>,
    pub activities: ActivityNode,
    pub invocations: Vec<InvocationStatement>,
    pub root_annotation: Option<String>,
    pub display_name: Option<String>,
    pub expression_language: String,
    /// Declared namespace prefixes; informational, not hashed
    pub namespaces: BTreeMap<String, String>,
}

impl WorkflowDocument {
    pub fn invocation_at(&self, node_id: &str) -> Option<&InvocationStatement> {
        self.invocations.iter().find(|inv| inv.source_node_id == node_id)
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Fatal,
}

/// Non-fatal (or, for `Fatal`, document-excluding) parse finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    /// Locator of the element the finding is about, when known
    pub location: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            location: Some(location.into()),
            message: message.into(),
        }
    }

    pub fn info(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            location: Some(location.into()),
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Fatal,
            location: None,
            message: message.into(),
        }
    }
}

/// Result of parsing one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ParseOutcome {
    Parsed {
        document: WorkflowDocument,
        diagnostics: Vec<Diagnostic>,
    },
    /// The root could not be parsed; no partial tree is produced
    Fatal {
        logical_path: String,
        diagnostics: Vec<Diagnostic>,
    },
}

impl ParseOutcome {
    pub fn document(&self) -> Option<&WorkflowDocument> {
        match self {
            ParseOutcome::Parsed { document, .. } => Some(document),
            ParseOutcome::Fatal { .. } => None,
        }
    }

    pub fn into_document(self) -> Option<WorkflowDocument> {
        match self {
            ParseOutcome::Parsed { document, .. } => Some(document),
            ParseOutcome::Fatal { .. } => None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ParseOutcome::Parsed { diagnostics, .. } | ParseOutcome::Fatal { diagnostics, .. } => {
                diagnostics
            }
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ParseOutcome::Fatal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tag: &str, node_id: &str) -> ActivityNode {
        ActivityNode {
            tag: tag.to_string(),
            node_id: node_id.to_string(),
            display_name: None,
            annotation: None,
            is_visual: true,
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_iter_is_preorder() {
        let mut root = leaf("Sequence", "Sequence[0]");
        let mut branch = leaf("If", "Sequence[0]/If[0]");
        branch.children.push(leaf("Assign", "Sequence[0]/If[0]/Assign[0]"));
        root.children.push(branch);
        root.children.push(leaf("LogMessage", "Sequence[0]/LogMessage[0]"));

        let ids: Vec<&str> = root.iter().map(|n| n.node_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "Sequence[0]",
                "Sequence[0]/If[0]",
                "Sequence[0]/If[0]/Assign[0]",
                "Sequence[0]/LogMessage[0]",
            ]
        );
        assert_eq!(root.count(), 4);
        root.children[0].is_visual = false;
        assert_eq!(root.visual_count(), 3);
        assert!(root.find("Sequence[0]/If[0]/Assign[0]").is_some());
    }

    #[test]
    fn test_invocation_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&InvocationKind::ExternalNonMarkup).unwrap();
        assert_eq!(json, "\"external-non-markup\"");
        let json = serde_json::to_string(&Direction::InOut).unwrap();
        assert_eq!(json, "\"inout\"");
    }

    #[test]
    fn test_property_value_text() {
        assert_eq!(PropertyValue::Literal("a".into()).as_text(), Some("a"));
        assert!(PropertyValue::Expression("[x]".into()).is_expression());
        assert_eq!(PropertyValue::Nested(BTreeMap::new()).as_text(), None);
    }
}
