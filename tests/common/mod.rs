#![allow(dead_code)]

use wfmap::core::{AnalysisContext, StructuralParser, WorkflowDocument};

/// Minimal workflow whose top-level sequence invokes each target in order
pub fn workflow_calling(name: &str, targets: &[&str]) -> String {
    let invocations: String = targets
        .iter()
        .map(|target| {
            format!(
                "    <ui:InvokeWorkflowFile DisplayName=\"Call {}\" WorkflowFileName=\"{}\" />\n",
                target, target
            )
        })
        .collect();

    format!(
        r#"<Activity x:Class="{name}"
  xmlns="http://schemas.microsoft.com/netfx/2009/xaml/activities"
  xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml"
  xmlns:ui="http://schemas.uipath.com/workflow/activities">
  <Sequence DisplayName="{name} Sequence">
    <ui:LogMessage DisplayName="Log {name}" Level="Info" Message="[&quot;{name}&quot;]" />
{invocations}  </Sequence>
</Activity>
"#,
        name = name,
        invocations = invocations
    )
}

pub fn parse(context: &AnalysisContext, logical_path: &str, content: &str) -> WorkflowDocument {
    StructuralParser::new(context)
        .parse(logical_path, content)
        .into_document()
        .expect("workflow should parse")
}

pub fn context() -> AnalysisContext {
    AnalysisContext::with_defaults("acme-bot").expect("default context")
}
