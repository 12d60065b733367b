// src/core/identity.rs
//! Content-addressed identities for workflow documents.

use std::fmt;
use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};
use unicode_normalization::UnicodeNormalization;

use crate::config::IdentityConfig;
use crate::core::model::{ActivityNode, PropertyValue, WorkflowDocument};
use crate::error::{Result, WfmapError};

const DELIMITER: char = '#';

/// `{projectId}#{logicalPath}#{hashPrefix}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Compose an identity. A `#` inside the project id would make the
    /// string ambiguous, so it is replaced with `_`.
    pub fn new(project_id: &str, logical_path: &str, hash_prefix: &str) -> Self {
        let project_id = project_id.replace(DELIMITER, "_");
        Self(format!(
            "{}{}{}{}{}",
            project_id,
            DELIMITER,
            normalize_logical_path(logical_path),
            DELIMITER,
            hash_prefix
        ))
    }

    /// Split an identity string back into its fields. The first and last `#`
    /// delimit the fields, so the logical path may itself contain `#`.
    pub fn parse(value: &str) -> Result<Self> {
        let malformed = || WfmapError::InvalidIdentity(value.to_string());

        let first = value.find(DELIMITER).ok_or_else(malformed)?;
        let last = value.rfind(DELIMITER).ok_or_else(malformed)?;
        if first == last {
            return Err(malformed());
        }

        let project_id = &value[..first];
        let logical_path = &value[first + 1..last];
        let hash = &value[last + 1..];

        if project_id.is_empty()
            || logical_path.is_empty()
            || hash.is_empty()
            || !hash.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(malformed());
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn project_id(&self) -> &str {
        self.0.split_once(DELIMITER).map(|(p, _)| p).unwrap_or(&self.0)
    }

    pub fn logical_path(&self) -> &str {
        match (self.0.find(DELIMITER), self.0.rfind(DELIMITER)) {
            (Some(first), Some(last)) if first < last => &self.0[first + 1..last],
            _ => "",
        }
    }

    pub fn hash_prefix(&self) -> &str {
        self.0.rsplit_once(DELIMITER).map(|(_, h)| h).unwrap_or("")
    }

    /// File name part of the logical path
    pub fn file_name(&self) -> &str {
        let path = self.logical_path();
        path.rsplit('/').next().unwrap_or(path)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Project-relative, forward-slash form of a path.
///
/// `.` segments and empty segments are dropped and `..` pops the previous
/// segment; a `..` at the top is clamped to the project root. Case is kept.
pub fn normalize_logical_path(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();

    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Computes identities from document content
#[derive(Debug, Clone, Copy)]
pub struct IdentityResolver {
    hash_prefix_len: usize,
}

impl IdentityResolver {
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            hash_prefix_len: config.hash_prefix_len.clamp(1, 64),
        }
    }

    pub fn compute_identity(
        &self,
        project_id: &str,
        logical_path: &str,
        document: &WorkflowDocument,
    ) -> Identity {
        let hash = content_hash(document);
        Identity::new(project_id, logical_path, self.prefix(&hash))
    }

    /// Identity from an already computed full hash
    pub fn identity_for(&self, project_id: &str, document: &WorkflowDocument) -> Identity {
        Identity::new(
            project_id,
            &document.logical_path,
            self.prefix(&document.content_hash),
        )
    }

    fn prefix<'h>(&self, hash: &'h str) -> &'h str {
        &hash[..self.hash_prefix_len.min(hash.len())]
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(IdentityConfig::default())
    }
}

/// Full-hash equality, independent of logical path
pub fn same_content(a: &WorkflowDocument, b: &WorkflowDocument) -> bool {
    a.content_hash == b.content_hash
}

/// Hex SHA-256 over the normalized structural content of a document.
///
/// Covers arguments, variables, the activity tree, invocations and the root
/// annotation. Logical path, namespace declarations, expression language,
/// the invocation kind and any resolution result are left out, so the same
/// content hashes the same wherever it lives.
pub fn content_hash(document: &WorkflowDocument) -> String {
    let mut hasher = CanonicalHasher::new();

    hasher.section(b'A', document.arguments.len());
    for argument in &document.arguments {
        hasher.text(&argument.name);
        hasher.text(&argument.type_name);
        hasher.text(argument.direction.as_str());
        hasher.optional(argument.annotation.as_deref());
        hasher.optional(argument.default_value.as_deref());
    }

    hasher.section(b'V', document.variables.len());
    for variable in &document.variables {
        hasher.text(&variable.name);
        hasher.text(&variable.type_name);
        hasher.text(&variable.scope_id);
        hasher.optional(variable.default_value.as_deref());
    }

    hasher.section(b'T', document.activities.count());
    hasher.activity(&document.activities);

    hasher.section(b'I', document.invocations.len());
    for invocation in &document.invocations {
        hasher.text(&invocation.source_node_id);
        hasher.text(&invocation.raw_target);
        hasher.section(b'P', invocation.passed_arguments.len());
        for (key, value) in &invocation.passed_arguments {
            hasher.text(key);
            hasher.text(value);
        }
    }

    hasher.section(b'R', 1);
    hasher.optional(document.root_annotation.as_deref());

    hasher.finish()
}

/// Length-prefixed, NFC-normalized feed into SHA-256
struct CanonicalHasher {
    hasher: Sha256,
}

impl CanonicalHasher {
    fn new() -> Self {
        Self { hasher: Sha256::new() }
    }

    fn section(&mut self, marker: u8, len: usize) {
        self.hasher.update([marker]);
        self.hasher.update((len as u64).to_le_bytes());
    }

    fn text(&mut self, value: &str) {
        let normalized: String = value.nfc().collect();
        self.hasher.update((normalized.len() as u64).to_le_bytes());
        self.hasher.update(normalized.as_bytes());
    }

    fn optional(&mut self, value: Option<&str>) {
        match value {
            Some(value) => {
                self.hasher.update([1u8]);
                self.text(value);
            }
            None => self.hasher.update([0u8]),
        }
    }

    fn activity(&mut self, node: &ActivityNode) {
        self.text(&node.tag);
        self.text(&node.node_id);
        self.optional(node.display_name.as_deref());
        self.optional(node.annotation.as_deref());
        self.hasher.update([node.is_visual as u8]);

        self.section(b'p', node.properties.len());
        for (key, value) in &node.properties {
            self.text(key);
            self.property(value);
        }

        self.section(b'c', node.children.len());
        for child in &node.children {
            self.activity(child);
        }
    }

    fn property(&mut self, value: &PropertyValue) {
        match value {
            PropertyValue::Literal(text) => {
                self.hasher.update([b'l']);
                self.text(text);
            }
            PropertyValue::Expression(text) => {
                self.hasher.update([b'e']);
                self.text(text);
            }
            PropertyValue::Nested(map) => {
                self.section(b'n', map.len());
                for (key, nested) in map {
                    self.text(key);
                    self.property(nested);
                }
            }
        }
    }

    fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}
