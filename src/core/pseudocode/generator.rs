// src/core/pseudocode/generator.rs
use crate::core::model::{ActivityNode, WorkflowDocument};
use super::PseudocodeLine;

/// Turns a document's activity tree into flat, indented pseudocode lines
pub struct PseudocodeGenerator {
    /// Emit lines for structural wrappers too, not only visual activities
    include_structural: bool,
}

impl PseudocodeGenerator {
    pub fn new() -> Self {
        Self {
            include_structural: false,
        }
    }

    pub fn with_structural(mut self) -> Self {
        self.include_structural = true;
        self
    }

    /// One line per emitted activity in document order. Skipped wrappers do
    /// not add an indent level; their children stay at the wrapper's level.
    /// Invocation activities are always emitted so the expander can find them.
    pub fn generate(&self, document: &WorkflowDocument) -> Vec<PseudocodeLine> {
        let mut lines = Vec::new();
        for child in &document.activities.children {
            self.visit(document, child, 0, &mut lines);
        }
        lines
    }

    fn visit(&self, document: &WorkflowDocument, node: &ActivityNode, indent: usize, lines: &mut Vec<PseudocodeLine>) {
        let invocation = document.invocation_at(&node.node_id);
        let emit = node.is_visual || self.include_structural || invocation.is_some();

        if emit {
            let mut text = match &node.display_name {
                Some(name) => format!("[{}] {}", name, node.tag),
                None => node.tag.clone(),
            };
            if let Some(invocation) = invocation {
                let target = invocation.raw_target.trim();
                if target.is_empty() {
                    text.push_str(" -> (no target)");
                } else {
                    text.push_str(" -> ");
                    text.push_str(target);
                }
            }

            lines.push(PseudocodeLine {
                indent,
                text,
                source_node_id: node.node_id.clone(),
                activity_tag: node.tag.clone(),
                expansion: None,
            });
        }

        let child_indent = if emit { indent + 1 } else { indent };
        for child in &node.children {
            self.visit(document, child, child_indent, lines);
        }
    }
}

impl Default for PseudocodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use crate::core::context::AnalysisContext;
    use crate::core::parser::StructuralParser;

    const WORKFLOW: &str = indoc! {r#"
        <Activity x:Class="Main"
                  xmlns="http://schemas.microsoft.com/netfx/2009/xaml/activities"
                  xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml"
                  xmlns:ui="http://schemas.uipath.com/workflow/activities">
          <Sequence DisplayName="Main Sequence">
            <ui:LogMessage DisplayName="Log start" Message="[&quot;start&quot;]" />
            <If DisplayName="Check" Condition="[ready]">
              <If.Then>
                <ui:InvokeWorkflowFile DisplayName="Run child" WorkflowFileName="Child.xaml" />
              </If.Then>
            </If>
          </Sequence>
        </Activity>
    "#};

    fn document() -> WorkflowDocument {
        let context = AnalysisContext::with_defaults("demo").unwrap();
        StructuralParser::new(&context)
            .parse("Main.xaml", WORKFLOW)
            .into_document()
            .unwrap()
    }

    #[test]
    fn test_visual_lines_and_indentation() {
        let lines = PseudocodeGenerator::new().generate(&document());
        let rendered: Vec<(usize, &str)> = lines.iter().map(|l| (l.indent, l.text.as_str())).collect();

        assert_eq!(
            rendered,
            vec![
                (0, "[Main Sequence] Sequence"),
                (1, "[Log start] LogMessage"),
                (1, "[Check] If"),
                (2, "[Run child] InvokeWorkflowFile -> Child.xaml"),
            ]
        );
    }

    #[test]
    fn test_lines_keep_source_node_ids() {
        let doc = document();
        let lines = PseudocodeGenerator::new().generate(&doc);
        let invoke = lines.last().unwrap();

        assert_eq!(invoke.activity_tag, "InvokeWorkflowFile");
        assert!(doc.invocation_at(&invoke.source_node_id).is_some());
    }

    #[test]
    fn test_structural_mode_emits_wrappers() {
        let visual = PseudocodeGenerator::new().generate(&document());
        let all = PseudocodeGenerator::new().with_structural().generate(&document());

        assert!(all.len() > visual.len());
        assert!(all.iter().any(|l| l.activity_tag == "Then"));
    }
}
