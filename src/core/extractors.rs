// src/core/extractors.rs
//! Declaration and metadata extraction over a namespace-agnostic element tree.
//!
//! All matching is done on local names, so `x:Property`, `Property` and a
//! property under a re-versioned namespace URI are the same thing here.

use std::collections::BTreeMap;
use roxmltree::Node;

use crate::core::model::{Argument, Diagnostic, Direction, Variable};

const ANNOTATION_ATTRIBUTE: &str = "Annotation.AnnotationText";

/// Attribute value by local name, ignoring any namespace prefix
pub fn attr<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attribute| attribute.name() == name)
        .map(|attribute| attribute.value())
}

pub fn local_name<'a, 'input>(node: Node<'a, 'input>) -> &'a str {
    node.tag_name().name()
}

/// Concatenated text of all descendants, trimmed
pub fn inner_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Annotation text with HTML entities decoded
pub fn annotation(node: Node<'_, '_>) -> Option<String> {
    attr(node, ANNOTATION_ATTRIBUTE)
        .filter(|text| !text.trim().is_empty())
        .map(|text| html_escape::decode_html_entities(text).into_owned())
}

pub fn direction_from_type(type_signature: &str) -> Direction {
    if type_signature.contains("InOutArgument") {
        Direction::InOut
    } else if type_signature.contains("OutArgument") {
        Direction::Out
    } else {
        Direction::In
    }
}

/// Arguments declared under the root's `Members` section
pub fn extract_arguments(root: Node<'_, '_>, diagnostics: &mut Vec<Diagnostic>) -> Vec<Argument> {
    let class_short = attr(root, "Class").map(|class| {
        class.rsplit('.').next().unwrap_or(class).to_string()
    });

    let mut arguments = Vec::new();

    let members = root
        .children()
        .filter(|n| n.is_element() && local_name(*n) == "Members");

    for section in members {
        for (index, property) in section
            .children()
            .filter(|n| n.is_element() && local_name(*n) == "Property")
            .enumerate()
        {
            let Some(name) = non_empty(attr(property, "Name")) else {
                diagnostics.push(Diagnostic::warning(
                    format!("Members/Property[{}]", index),
                    "argument declaration without a Name, skipped",
                ));
                continue;
            };

            let type_name = attr(property, "Type").unwrap_or_default().to_string();

            let default_value = non_empty(attr(property, "default"))
                .or_else(|| non_empty(attr(property, "Default")))
                .or_else(|| non_empty(Some(own_text(property).as_str())))
                .or_else(|| {
                    class_short.as_ref().and_then(|short| {
                        non_empty(attr(root, &format!("{}.{}", short, name)))
                    })
                });

            arguments.push(Argument {
                direction: direction_from_type(&type_name),
                annotation: annotation(property),
                name,
                type_name,
                default_value,
            });
        }
    }

    arguments
}

/// Text directly inside an element, ignoring nested elements
fn own_text(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
}

/// Variables declared in one `*.Variables` section
pub fn extract_scope_variables(
    section: Node<'_, '_>,
    scope_id: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Variable> {
    let mut variables = Vec::new();

    for (index, element) in section
        .children()
        .filter(|n| n.is_element() && local_name(*n) == "Variable")
        .enumerate()
    {
        let Some(name) = non_empty(attr(element, "Name")) else {
            diagnostics.push(Diagnostic::warning(
                format!("{}/Variables/Variable[{}]", scope_id, index),
                "variable declaration without a Name, skipped",
            ));
            continue;
        };

        let default_value = non_empty(attr(element, "Default")).or_else(|| {
            non_empty(Some(inner_text(element).as_str()))
        });

        variables.push(Variable {
            name,
            type_name: attr(element, "TypeArguments").unwrap_or("Object").to_string(),
            scope_id: scope_id.to_string(),
            default_value,
        });
    }

    variables
}

/// Delegate arguments (e.g. a loop's current item) declared under an action property
pub fn extract_delegate_arguments(property: Node<'_, '_>, scope_id: &str) -> Vec<Variable> {
    property
        .children()
        .filter(|n| {
            n.is_element()
                && matches!(local_name(*n), "DelegateInArgument" | "DelegateOutArgument")
        })
        .filter_map(|element| {
            let name = non_empty(attr(element, "Name"))?;
            Some(Variable {
                name,
                type_name: attr(element, "TypeArguments").unwrap_or("Object").to_string(),
                scope_id: scope_id.to_string(),
                default_value: None,
            })
        })
        .collect()
}

/// Annotation on the root, falling back to the first annotated `Sequence`
pub fn extract_root_annotation(root: Node<'_, '_>) -> Option<String> {
    annotation(root).or_else(|| {
        root.descendants()
            .filter(|n| n.is_element() && local_name(*n) == "Sequence")
            .find_map(annotation)
    })
}

pub fn extract_namespaces(root: Node<'_, '_>) -> BTreeMap<String, String> {
    root.namespaces()
        .map(|ns| (ns.name().unwrap_or_default().to_string(), ns.uri().to_string()))
        .collect()
}

pub fn extract_expression_language(root: Node<'_, '_>) -> String {
    let editor = root
        .attributes()
        .find(|a| a.name().starts_with("ExpressionActivityEditor"))
        .map(|a| a.value());

    if let Some(editor) = editor {
        return if editor.contains("C#") || editor.contains("CSharp") {
            "CSharp".to_string()
        } else {
            "VisualBasic".to_string()
        };
    }

    for node in root.descendants().filter(|n| n.is_element()) {
        let tag = local_name(node);
        if tag.starts_with("VisualBasic") {
            return "VisualBasic".to_string();
        }
        if tag.starts_with("CSharp") {
            return "CSharp".to_string();
        }
    }

    "VisualBasic".to_string()
}

/// Raw invocation target: first matching attribute, then a matching property element
pub fn extract_invocation_target(
    element: Node<'_, '_>,
    tag: &str,
    target_attributes: &[&str],
) -> Option<String> {
    for name in target_attributes {
        if let Some(value) = attr(element, name) {
            return Some(value.to_string());
        }
    }

    for name in target_attributes {
        let property_tag = format!("{}.{}", tag, name);
        if let Some(property) = element
            .children()
            .find(|n| n.is_element() && local_name(*n) == property_tag)
        {
            let text = inner_text(property);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    None
}

/// Arguments handed to the invoked unit
pub fn extract_passed_arguments(element: Node<'_, '_>) -> BTreeMap<String, String> {
    let mut arguments = BTreeMap::new();

    for section in element.children().filter(|n| {
        n.is_element() && {
            let tag = local_name(*n);
            tag == "Arguments" || tag.ends_with(".Arguments")
        }
    }) {
        for entry in section.children().filter(|n| n.is_element()) {
            let Some(key) = attr(entry, "Key").filter(|k| !k.is_empty()) else {
                continue;
            };
            let value = attr(entry, "Value")
                .map(str::to_string)
                .unwrap_or_else(|| inner_text(entry));
            arguments.insert(key.to_string(), value);
        }
    }

    for attribute in element.attributes() {
        let name = attribute.name();
        if name.starts_with("arg_") || name.ends_with("Argument") {
            arguments.insert(name.to_string(), attribute.value().to_string());
        }
    }

    arguments
}
