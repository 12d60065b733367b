// src/core/classifier.rs
//! Central tag and target classification.
//!
//! The rest of the pipeline branches on [`ElementClass`] and
//! [`InvocationKind`] instead of re-testing tag strings.

use std::collections::HashSet;
use regex::Regex;

use crate::config::ParserConfig;
use crate::core::model::InvocationKind;
use crate::error::Result;

/// Activities that are always shown in the designer
const CORE_VISUAL_ACTIVITIES: &[&str] = &[
    "Sequence", "Flowchart", "StateMachine", "TryCatch", "Parallel",
    "ParallelForEach", "ForEach", "While", "DoWhile", "If", "Switch",
    "InvokeWorkflowFile", "Assign", "Delay", "RetryScope",
    "Pick", "PickBranch", "MultipleAssign",
    "LogMessage", "WriteLine", "InputDialog", "MessageBox",
    "InvokeMethod", "InvokeCode",
];

/// Designer-only layout and view-state elements, dropped entirely
const VOLATILE_ELEMENTS: &[&str] = &[
    "ViewState", "ViewStateData", "WorkflowViewState", "WorkflowViewStateService",
    "VirtualizedContainerService", "HintSize", "IdRef",
    "WorkflowViewStateService.ViewState", "VirtualizedContainerService.HintSize",
    "WorkflowViewState.IdRef", "Dictionary", "BackupSlot", "BackupValues",
];

/// Declarations and imports, read by the extractors but not kept as nodes
const METADATA_ELEMENTS: &[&str] = &[
    "Members", "Property", "Imports", "TextExpression", "VisualBasic",
    "VisualBasic.Settings", "TextExpression.NamespacesForImplementation",
    "TextExpression.ReferencesForImplementation", "NamespacesForImplementation",
    "ReferencesForImplementation", "AssemblyReference", "Collection",
    "WorkflowFileInfo", "Annotation", "Annotation.AnnotationText",
    "Variable", "DelegateInArgument", "DelegateOutArgument", "TypeArguments",
];

/// Typed value wrappers folded into their owner's properties
const VALUE_ELEMENTS: &[&str] = &[
    "InArgument", "OutArgument", "InOutArgument",
    "CSharpValue", "CSharpReference", "VisualBasicValue", "VisualBasicReference",
    "Literal", "Reference", "String", "Boolean", "Int32", "Int64", "Double",
    "Decimal", "Object", "Null", "TimeSpan", "DateTime", "AssignOperation",
];

/// Value wrappers whose text is always an expression
const EXPRESSION_WRAPPERS: &[&str] = &[
    "CSharpValue", "CSharpReference", "VisualBasicValue", "VisualBasicReference",
];

/// Attributes that never carry business content
const EXCLUDED_ATTRIBUTES: &[&str] = &[
    "Class", "Ignorable", "DisplayName", "Annotation.AnnotationText",
    "WorkflowViewState.IdRef", "VirtualizedContainerService.HintSize",
    "WorkflowViewStateService.ViewState", "TypeArguments", "Key",
];

/// Invocation activities and the attributes holding their target, in priority order
const INVOCATION_TAGS: &[(&str, &[&str])] = &[
    ("InvokeWorkflowFile", &["WorkflowFileName", "FileName"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementClass {
    /// Designer-visible business logic
    Visual,
    /// Wrapper or container sub-element kept in the activity tree
    Structural,
    /// Declaration or import section, handled outside the tree walk
    Metadata,
    /// Layout and view-state, excluded from output and hash
    Volatile,
    /// Typed value wrapper, folded into the owner's properties
    Value,
}

/// Compiled classification rules for one analysis context
#[derive(Debug, Clone)]
pub struct Classifier {
    custom_blacklist: HashSet<String>,
    custom_whitelist: HashSet<String>,
    external_extensions: Vec<String>,
    expression_patterns: Vec<Regex>,
    bare_call: Regex,
}

impl Classifier {
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let expression_patterns = [
            r"^\s*\[[\s\S]*\]\s*$",
            r"\w\.[A-Za-z_]\w*\(",
            r"=>",
            r"[{}]",
            r#"\$""#,
            r#""\s*\+|\+\s*""#,
            r"\w\s+\+\s+\w",
            r"\b[Nn]ew\s+[A-Za-z_]",
            r"\b(?:Path\.Combine|String\.Format|Function)\b",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern))
        .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            custom_blacklist: config.custom_blacklist.iter().cloned().collect(),
            custom_whitelist: config.custom_whitelist.iter().cloned().collect(),
            external_extensions: config
                .external_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            expression_patterns,
            bare_call: Regex::new(r"^[A-Za-z_]\w*\(")?,
        })
    }

    /// Classify an element by its local tag name and whether it carries a display name
    pub fn classify_element(&self, tag: &str, has_display_name: bool) -> ElementClass {
        if VOLATILE_ELEMENTS.contains(&tag) || tag.starts_with("WorkflowViewState") {
            return ElementClass::Volatile;
        }

        if METADATA_ELEMENTS.contains(&tag) || tag.ends_with(".Variables") || tag == "Variables" {
            return ElementClass::Metadata;
        }

        if VALUE_ELEMENTS.contains(&tag) {
            return ElementClass::Value;
        }

        if self.custom_blacklist.contains(tag) {
            return ElementClass::Structural;
        }

        if self.custom_whitelist.contains(tag) || CORE_VISUAL_ACTIVITIES.contains(&tag) {
            return ElementClass::Visual;
        }

        if has_display_name && !is_property_element(tag) {
            return ElementClass::Visual;
        }

        ElementClass::Structural
    }

    /// Heuristic check for expression syntax in an attribute or text value
    pub fn is_expression(&self, value: &str) -> bool {
        let trimmed = value.trim();
        if trimmed.is_empty() || is_markup_extension(trimmed) {
            return false;
        }
        if self.expression_patterns.iter().any(|re| re.is_match(trimmed)) {
            return true;
        }
        self.bare_call.is_match(trimmed) && !self.has_file_extension(trimmed)
    }

    /// Classify an invocation target as written in the document
    pub fn classify_invocation(&self, raw_target: Option<&str>) -> InvocationKind {
        let raw = match raw_target.map(str::trim) {
            Some(raw) if !raw.is_empty() && !is_markup_extension(raw) => raw,
            _ => return InvocationKind::Missing,
        };

        if self.is_expression(raw) {
            return InvocationKind::Dynamic;
        }

        if self.is_external(raw) {
            return InvocationKind::ExternalNonMarkup;
        }

        InvocationKind::Literal
    }

    /// Ends in `.xaml` or one of the configured external extensions
    fn has_file_extension(&self, value: &str) -> bool {
        value.to_ascii_lowercase().ends_with(".xaml") || self.is_external(value)
    }

    fn is_external(&self, target: &str) -> bool {
        let lower = target.to_ascii_lowercase();
        match lower.rsplit_once('.') {
            Some((_, ext)) => self.external_extensions.iter().any(|e| e == ext),
            None => false,
        }
    }

    /// Attribute names the invocation tag stores its target in, if it is an invocation
    pub fn invocation_target_attributes(&self, tag: &str) -> Option<&'static [&'static str]> {
        INVOCATION_TAGS
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, attrs)| *attrs)
    }

    pub fn is_excluded_attribute(&self, name: &str) -> bool {
        EXCLUDED_ATTRIBUTES.contains(&name)
            || name.contains("ViewState")
            || name.contains("HintSize")
    }

    pub fn is_expression_wrapper(&self, tag: &str) -> bool {
        EXPRESSION_WRAPPERS.contains(&tag)
    }
}

/// `Owner.Member` property element syntax
pub fn is_property_element(tag: &str) -> bool {
    tag.contains('.')
}

/// Member part of a property element tag, e.g. `Then` for `If.Then`
pub fn property_member(tag: &str) -> &str {
    tag.rsplit_once('.').map(|(_, member)| member).unwrap_or(tag)
}

/// `{x:Null}` and similar markup extensions are constants, not expressions
fn is_markup_extension(value: &str) -> bool {
    value.starts_with("{x:") && value.ends_with('}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(&ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_core_activities_are_visual() {
        let c = classifier();
        assert_eq!(c.classify_element("Sequence", false), ElementClass::Visual);
        assert_eq!(c.classify_element("InvokeWorkflowFile", false), ElementClass::Visual);
    }

    #[test]
    fn test_display_name_makes_unknown_tag_visual() {
        let c = classifier();
        assert_eq!(c.classify_element("ClickImage", true), ElementClass::Visual);
        assert_eq!(c.classify_element("ClickImage", false), ElementClass::Structural);
        assert_eq!(c.classify_element("If.Then", true), ElementClass::Structural);
    }

    #[test]
    fn test_view_state_is_volatile() {
        let c = classifier();
        assert_eq!(
            c.classify_element("WorkflowViewStateService.ViewState", false),
            ElementClass::Volatile
        );
        assert_eq!(c.classify_element("HintSize", false), ElementClass::Volatile);
    }

    #[test]
    fn test_declarations_are_metadata() {
        let c = classifier();
        assert_eq!(c.classify_element("Members", false), ElementClass::Metadata);
        assert_eq!(c.classify_element("Sequence.Variables", false), ElementClass::Metadata);
        assert_eq!(c.classify_element("InArgument", false), ElementClass::Value);
    }

    #[test]
    fn test_custom_lists_override_heuristics() {
        let config = ParserConfig {
            custom_blacklist: vec!["Comment".to_string()],
            custom_whitelist: vec!["ReadRange".to_string()],
            ..ParserConfig::default()
        };
        let c = Classifier::new(&config).unwrap();
        assert_eq!(c.classify_element("Comment", true), ElementClass::Structural);
        assert_eq!(c.classify_element("ReadRange", false), ElementClass::Visual);
    }

    #[test]
    fn test_expression_detection() {
        let c = classifier();
        assert!(c.is_expression("[in_Config(\"Path\").ToString]"));
        assert!(c.is_expression("Path.Combine(folder, \"X.xaml\")"));
        assert!(c.is_expression("folder + \"\\X.xaml\""));
        assert!(c.is_expression("$\"{folder}\\X.xaml\""));
        assert!(c.is_expression("New List(Of String)"));
        assert!(!c.is_expression("Workflows\\Process.xaml"));
        assert!(!c.is_expression("Hello world"));
        assert!(!c.is_expression("{x:Null}"));
    }

    #[test]
    fn test_invocation_classification() {
        let c = classifier();
        assert_eq!(c.classify_invocation(Some("Sub\\Child.xaml")), InvocationKind::Literal);
        assert_eq!(c.classify_invocation(Some("[folder + \"\\Child.xaml\"]")), InvocationKind::Dynamic);
        assert_eq!(c.classify_invocation(Some("Coded/Helper.cs")), InvocationKind::ExternalNonMarkup);
        assert_eq!(c.classify_invocation(Some("   ")), InvocationKind::Missing);
        assert_eq!(c.classify_invocation(None), InvocationKind::Missing);
    }

    #[test]
    fn test_parentheses_in_file_names_are_literal() {
        let c = classifier();
        assert_eq!(c.classify_invocation(Some("Flows\\Process(v2).xaml")), InvocationKind::Literal);
        assert_eq!(c.classify_invocation(Some("Report(final).xaml")), InvocationKind::Literal);
        assert_eq!(c.classify_invocation(Some("Coded\\Export(old).cs")), InvocationKind::ExternalNonMarkup);
        assert!(c.is_expression("GetPath(\"Main\")"));
        assert!(c.is_expression("config.Item(\"Flow\")"));
        assert!(c.is_expression("folder.ToString()"));
    }

    #[test]
    fn test_property_member() {
        assert_eq!(property_member("If.Then"), "Then");
        assert_eq!(property_member("InvokeWorkflowFile.Arguments"), "Arguments");
        assert!(!is_property_element("Sequence"));
    }
}
