mod common;

use indoc::indoc;
use pretty_assertions::assert_eq;
use wfmap::core::{Identity, IdentityResolver};

use common::{context, parse, workflow_calling};

const WITH_VIEW_STATE: &str = indoc! {r#"
    <Activity x:Class="Main"
              xmlns="http://schemas.microsoft.com/netfx/2009/xaml/activities"
              xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml"
              xmlns:sap="http://schemas.microsoft.com/netfx/2009/xaml/activities/presentation"
              xmlns:sap2010="http://schemas.microsoft.com/netfx/2010/xaml/activities/presentation">
      <Sequence DisplayName="Main" sap:VirtualizedContainerService.HintSize="400,300"
                sap2010:WorkflowViewState.IdRef="Sequence_1">
        <sap:WorkflowViewStateService.ViewState>
          <scg:Dictionary x:TypeArguments="x:String, x:Object" xmlns:scg="clr-namespace:System.Collections.Generic;assembly=mscorlib">
            <x:Boolean x:Key="IsExpanded">True</x:Boolean>
          </scg:Dictionary>
        </sap:WorkflowViewStateService.ViewState>
        <Assign DisplayName="Set total" sap:VirtualizedContainerService.HintSize="250,60">
          <Assign.To>
            <OutArgument x:TypeArguments="x:Int32">[total]</OutArgument>
          </Assign.To>
          <Assign.Value>
            <InArgument x:TypeArguments="x:Int32">42</InArgument>
          </Assign.Value>
        </Assign>
      </Sequence>
    </Activity>
"#};

#[test]
fn test_identity_is_deterministic_across_parses() {
    let context = context();
    let resolver = IdentityResolver::default();
    let content = workflow_calling("Main", &["Child.xaml"]);

    let first = resolver.identity_for("acme-bot", &parse(&context, "Main.xaml", &content));
    let second = resolver.identity_for("acme-bot", &parse(&context, "Main.xaml", &content));

    assert_eq!(first, second);
    assert_eq!(first.project_id(), "acme-bot");
    assert_eq!(first.logical_path(), "Main.xaml");
    assert_eq!(first.hash_prefix().len(), 16);
}

#[test]
fn test_hash_is_independent_of_logical_path() {
    let context = context();
    let resolver = IdentityResolver::default();
    let content = workflow_calling("Shared", &[]);

    let here = resolver.identity_for("acme-bot", &parse(&context, "Shared.xaml", &content));
    let there = resolver.identity_for("acme-bot", &parse(&context, "Lib/Shared.xaml", &content));

    assert_ne!(here, there);
    assert_eq!(here.hash_prefix(), there.hash_prefix());
    assert_eq!(there.logical_path(), "Lib/Shared.xaml");
}

#[test]
fn test_view_state_changes_do_not_change_the_hash() {
    let context = context();
    let resolver = IdentityResolver::default();

    let moved = WITH_VIEW_STATE
        .replace("400,300", "512,480")
        .replace("250,60", "300,90")
        .replace("Sequence_1", "Sequence_7")
        .replace(">True<", ">False<");
    assert_ne!(moved, WITH_VIEW_STATE);

    let original = parse(&context, "Main.xaml", WITH_VIEW_STATE);
    let relaid = parse(&context, "Main.xaml", &moved);

    assert_eq!(original, relaid);
    assert_eq!(
        resolver.identity_for("acme-bot", &original),
        resolver.identity_for("acme-bot", &relaid)
    );
}

#[test]
fn test_content_changes_do_change_the_hash() {
    let context = context();
    let resolver = IdentityResolver::default();

    let original = parse(&context, "Main.xaml", WITH_VIEW_STATE);
    let edited = parse(&context, "Main.xaml", &WITH_VIEW_STATE.replace(">42<", ">43<"));

    assert_ne!(
        resolver.identity_for("acme-bot", &original).hash_prefix(),
        resolver.identity_for("acme-bot", &edited).hash_prefix()
    );
}

#[test]
fn test_node_ids_are_stable_across_parses() {
    let context = context();
    let content = workflow_calling("Main", &["A.xaml", "B.xaml"]);

    let ids = |doc: &wfmap::core::WorkflowDocument| -> Vec<String> {
        doc.activities.iter().map(|node| node.node_id.clone()).collect()
    };
    let first = ids(&parse(&context, "Main.xaml", &content));
    let second = ids(&parse(&context, "Main.xaml", &content));

    assert_eq!(first, second);
    assert!(first.contains(&"Sequence[0]/InvokeWorkflowFile[1]".to_string()));
}

#[test]
fn test_identity_string_round_trips() {
    let context = context();
    let document = parse(&context, "Flows/Main.xaml", &workflow_calling("Main", &[]));
    let identity = IdentityResolver::default().identity_for("acme-bot", &document);

    let parsed = Identity::parse(identity.as_str()).unwrap();
    assert_eq!(parsed, identity);
    assert!(identity.as_str().starts_with("acme-bot#Flows/Main.xaml#"));
}
