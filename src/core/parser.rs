use std::collections::{BTreeMap, HashMap};
use roxmltree::{Document, Node};
use tracing::{debug, trace};

use crate::core::classifier::{is_property_element, property_member, Classifier, ElementClass};
use crate::core::context::AnalysisContext;
use crate::core::extractors::{
    annotation, attr, extract_arguments, extract_delegate_arguments, extract_expression_language,
    extract_invocation_target, extract_namespaces, extract_passed_arguments,
    extract_root_annotation, extract_scope_variables, inner_text, local_name,
};
use crate::core::identity::{content_hash, normalize_logical_path};
use crate::core::model::{
    ActivityNode, Diagnostic, InvocationKind, InvocationStatement, ParseOutcome, PropertyValue,
    Variable, WorkflowDocument,
};

/// Hard cap on raw element nesting, checked before the XML parser sees the content
const MAX_ELEMENT_NESTING: usize = 256;

/// Tolerant parser for a single workflow document.
///
/// Has no knowledge of other documents; invocation targets are classified
/// but not resolved here.
pub struct StructuralParser<'a> {
    context: &'a AnalysisContext,
}

impl<'a> StructuralParser<'a> {
    pub fn new(context: &'a AnalysisContext) -> Self {
        Self { context }
    }

    /// Parse raw document content. Never panics on malformed input: an
    /// unparseable root yields [`ParseOutcome::Fatal`], anything smaller is
    /// reported as a diagnostic next to the partial document.
    pub fn parse(&self, logical_path: &str, content: &str) -> ParseOutcome {
        let logical_path = normalize_logical_path(logical_path);

        if exceeds_nesting(content, MAX_ELEMENT_NESTING) {
            debug!("Fatal parse error in {}: nesting limit exceeded", logical_path);
            return ParseOutcome::Fatal {
                logical_path,
                diagnostics: vec![Diagnostic::fatal(format!(
                    "unparseable document: elements nested deeper than {}",
                    MAX_ELEMENT_NESTING
                ))],
            };
        }

        let xml = match Document::parse(content) {
            Ok(xml) => xml,
            Err(e) => {
                debug!("Fatal parse error in {}: {}", logical_path, e);
                return ParseOutcome::Fatal {
                    logical_path,
                    diagnostics: vec![Diagnostic::fatal(format!("unparseable document: {}", e))],
                };
            }
        };

        let root = xml.root_element();
        let mut walker = TreeWalker::new(self.context.classifier(), self.context.parser.max_depth);

        let arguments = extract_arguments(root, &mut walker.diagnostics);
        let activities = walker.walk_root(root);

        let display_name = attr(root, "DisplayName")
            .map(str::to_string)
            .or_else(|| activities.children.iter().find_map(|c| c.display_name.clone()));

        let mut document = WorkflowDocument {
            logical_path,
            content_hash: String::new(),
            arguments,
            variables: walker.variables,
            activities,
            invocations: walker.invocations,
            root_annotation: extract_root_annotation(root),
            display_name,
            expression_language: extract_expression_language(root),
            namespaces: extract_namespaces(root),
        };
        document.content_hash = content_hash(&document);

        trace!(
            "Parsed {}: {} nodes ({} visual), {} invocations, {} diagnostics",
            document.logical_path,
            document.activities.count(),
            document.activities.visual_count(),
            document.invocations.len(),
            walker.diagnostics.len()
        );

        ParseOutcome::Parsed {
            document,
            diagnostics: walker.diagnostics,
        }
    }
}

/// Per-document traversal state
struct TreeWalker<'c> {
    classifier: &'c Classifier,
    max_depth: usize,
    variables: Vec<Variable>,
    invocations: Vec<InvocationStatement>,
    diagnostics: Vec<Diagnostic>,
}

impl<'c> TreeWalker<'c> {
    fn new(classifier: &'c Classifier, max_depth: usize) -> Self {
        Self {
            classifier,
            max_depth,
            variables: Vec::new(),
            invocations: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn walk_root(&mut self, root: Node<'_, '_>) -> ActivityNode {
        let tag = local_name(root).to_string();
        let mut node = ActivityNode {
            node_id: tag.clone(),
            tag,
            display_name: None,
            annotation: None,
            is_visual: false,
            properties: BTreeMap::new(),
            children: Vec::new(),
        };
        self.walk_children(root, &mut node, 0, true);
        node
    }

    fn build_node(
        &mut self,
        element: Node<'_, '_>,
        tag: &str,
        node_id: String,
        is_visual: bool,
        depth: usize,
    ) -> ActivityNode {
        let mut node = ActivityNode {
            tag: tag.to_string(),
            node_id,
            display_name: attr(element, "DisplayName").map(str::to_string),
            annotation: annotation(element),
            is_visual,
            properties: self.attribute_properties(element),
            children: Vec::new(),
        };

        if let Some(target_attributes) = self.classifier.invocation_target_attributes(tag) {
            self.record_invocation(element, &node, target_attributes);
        }

        self.walk_children(element, &mut node, depth, false);
        node
    }

    fn record_invocation(
        &mut self,
        element: Node<'_, '_>,
        node: &ActivityNode,
        target_attributes: &[&str],
    ) {
        let raw_target = extract_invocation_target(element, &node.tag, target_attributes);
        let kind = self.classifier.classify_invocation(raw_target.as_deref());

        if kind == InvocationKind::Missing {
            self.diagnostics.push(Diagnostic::info(
                node.node_id.clone(),
                "invocation without a target",
            ));
        }

        self.invocations.push(InvocationStatement {
            source_node_id: node.node_id.clone(),
            raw_target: raw_target.unwrap_or_default(),
            kind,
            resolved_target_path: None,
            passed_arguments: extract_passed_arguments(element),
        });
    }

    fn walk_children(&mut self, element: Node<'_, '_>, node: &mut ActivityNode, depth: usize, is_root: bool) {
        let mut sibling_counts: HashMap<String, usize> = HashMap::new();
        self.variables
            .extend(extract_delegate_arguments(element, &node.node_id));

        for child in element.children().filter(|n| n.is_element()) {
            self.visit(child, node, &mut sibling_counts, depth + 1, is_root);
        }
    }

    fn visit(
        &mut self,
        child: Node<'_, '_>,
        parent: &mut ActivityNode,
        sibling_counts: &mut HashMap<String, usize>,
        depth: usize,
        parent_is_root: bool,
    ) {
        let tag = local_name(child);
        let class = self.classify(child);

        if depth > self.max_depth && matches!(class, ElementClass::Visual | ElementClass::Structural) {
            let segment = if is_property_element(tag) {
                property_member(tag).to_string()
            } else {
                let index = sibling_counts.entry(tag.to_string()).or_insert(0);
                let segment = format!("{}[{}]", tag, index);
                *index += 1;
                segment
            };
            self.diagnostics.push(Diagnostic::warning(
                child_id(&parent.node_id, &segment, parent_is_root),
                format!("nesting deeper than {} levels, subtree skipped", self.max_depth),
            ));
            return;
        }

        match class {
            ElementClass::Volatile => {}
            ElementClass::Metadata => {
                if tag == "Variables" || tag.ends_with(".Variables") {
                    let scope_id = parent.node_id.clone();
                    let found = extract_scope_variables(child, &scope_id, &mut self.diagnostics);
                    self.variables.extend(found);
                }
            }
            ElementClass::Value => {
                let value = self.property_value(child, depth);
                insert_unique(&mut parent.properties, tag.to_string(), value);
            }
            ElementClass::Visual | ElementClass::Structural if is_property_element(tag) => {
                let member = property_member(tag);

                if self.has_activity_descendant(child) {
                    let node_id = child_id(&parent.node_id, member, parent_is_root);
                    let branch = self.build_node(child, member, node_id, false, depth);
                    parent.children.push(branch);
                } else {
                    self.variables
                        .extend(extract_delegate_arguments(child, &parent.node_id));
                    let value = self.property_value(child, depth);
                    insert_unique(&mut parent.properties, member.to_string(), value);
                }
            }
            ElementClass::Visual | ElementClass::Structural => {
                let index = sibling_counts.entry(tag.to_string()).or_insert(0);
                let segment = format!("{}[{}]", tag, index);
                *index += 1;

                let node_id = child_id(&parent.node_id, &segment, parent_is_root);
                let node = self.build_node(child, tag, node_id, class == ElementClass::Visual, depth);
                parent.children.push(node);
            }
        }
    }

    fn classify(&self, element: Node<'_, '_>) -> ElementClass {
        self.classifier
            .classify_element(local_name(element), attr(element, "DisplayName").is_some())
    }

    fn has_activity_descendant(&self, element: Node<'_, '_>) -> bool {
        element
            .descendants()
            .skip(1)
            .filter(|n| n.is_element())
            .any(|n| self.classify(n) == ElementClass::Visual)
    }

    fn attribute_properties(&self, element: Node<'_, '_>) -> BTreeMap<String, PropertyValue> {
        element
            .attributes()
            .filter(|a| !self.classifier.is_excluded_attribute(a.name()))
            .map(|a| (a.name().to_string(), self.scalar(a.value())))
            .collect()
    }

    fn scalar(&self, text: &str) -> PropertyValue {
        if self.classifier.is_expression(text) {
            PropertyValue::Expression(text.to_string())
        } else {
            PropertyValue::Literal(text.to_string())
        }
    }

    /// Fold a property element or value wrapper into a property value.
    /// Below `max_depth` levels the remaining subtree collapses to its text.
    fn property_value(&self, element: Node<'_, '_>, depth: usize) -> PropertyValue {
        let tag = local_name(element);

        if self.classifier.is_expression_wrapper(tag) {
            return PropertyValue::Expression(inner_text(element));
        }

        if tag == "Literal" {
            if let Some(value) = attr(element, "Value") {
                return self.scalar(value);
            }
        }

        let children: Vec<Node<'_, '_>> = element
            .children()
            .filter(|n| n.is_element() && self.classify(*n) != ElementClass::Volatile)
            .collect();
        let attributes = self.attribute_properties(element);

        if children.is_empty() {
            let text = inner_text(element);
            if attributes.is_empty() || !text.is_empty() {
                return self.scalar(&text);
            }
            return PropertyValue::Nested(attributes);
        }

        if depth >= self.max_depth {
            return self.scalar(&inner_text(element));
        }

        if children.len() == 1 && attributes.is_empty() && self.classify(children[0]) == ElementClass::Value {
            return self.property_value(children[0], depth + 1);
        }

        let mut map = attributes;
        for child in children {
            let child_tag = local_name(child);
            let key = attr(child, "Key")
                .map(str::to_string)
                .unwrap_or_else(|| property_member(child_tag).to_string());
            let value = self.property_value(child, depth + 1);
            insert_unique(&mut map, key, value);
        }
        PropertyValue::Nested(map)
    }
}

/// Node locator below `parent_id`; children of the document root omit the root segment
fn child_id(parent_id: &str, segment: &str, parent_is_root: bool) -> String {
    if parent_is_root {
        segment.to_string()
    } else {
        format!("{}/{}", parent_id, segment)
    }
}

fn insert_unique(map: &mut BTreeMap<String, PropertyValue>, key: String, value: PropertyValue) {
    if !map.contains_key(&key) {
        map.insert(key, value);
        return;
    }

    let mut n = 1;
    loop {
        let candidate = format!("{}[{}]", key, n);
        if !map.contains_key(&candidate) {
            map.insert(candidate, value);
            return;
        }
        n += 1;
    }
}

/// Lexical scan for element nesting deeper than `limit`. Comments, CDATA,
/// processing instructions and quoted attribute values are skipped; malformed
/// markup is left for the XML parser to reject.
fn exceeds_nesting(content: &str, limit: usize) -> bool {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while let Some(offset) = bytes[i..].iter().position(|&b| b == b'<') {
        i += offset;
        let rest = &content[i..];

        let skip_to = move |terminator: &str| {
            rest.find(terminator)
                .map(|end| i + end + terminator.len())
                .unwrap_or(bytes.len())
        };

        if rest.starts_with("<!--") {
            i = skip_to("-->");
        } else if rest.starts_with("<![CDATA[") {
            i = skip_to("]]>");
        } else if rest.starts_with("<?") {
            i = skip_to("?>");
        } else if rest.starts_with("<!") {
            i = skip_to(">");
        } else if rest.starts_with("</") {
            depth = depth.saturating_sub(1);
            i = skip_to(">");
        } else {
            let mut quote = None;
            let mut end = bytes.len();
            for (j, &b) in bytes.iter().enumerate().skip(i + 1) {
                match quote {
                    Some(q) if b == q => quote = None,
                    Some(_) => {}
                    None if b == b'"' || b == b'\'' => quote = Some(b),
                    None if b == b'>' => {
                        end = j;
                        break;
                    }
                    None => {}
                }
            }
            if end >= bytes.len() {
                return false;
            }
            if bytes[end - 1] != b'/' {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            i = end + 1;
        }
    }

    false
}
