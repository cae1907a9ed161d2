use super::*;
use crate::test_fixtures::sample_graph;
use tsb_names::{NamingOptions, reserve_graph};
use tsb_shape::{ShapeOptions, run_passes};

fn report() -> SurfaceReport {
    let graph = run_passes(&sample_graph(), &ShapeOptions::default()).graph;
    let mut ledger = NameLedger::new();
    let diagnostics = reserve_graph(&graph, &mut ledger, &NamingOptions::default());
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    SurfaceReport::build(&graph, &ledger)
}

fn find<'r>(report: &'r SurfaceReport, clr_name: &str) -> &'r TypeReport {
    report
        .find_type(clr_name)
        .unwrap_or_else(|| panic!("type {clr_name} missing"))
}

#[test]
fn namespaces_and_types_follow_traversal_order() {
    let report = report();
    let layout: Vec<(&str, Vec<&str>)> = report
        .namespaces
        .iter()
        .map(|ns| {
            (
                ns.name.as_str(),
                ns.types.iter().map(|ty| ty.clr_name.as_str()).collect(),
            )
        })
        .collect();

    assert_eq!(
        layout,
        [
            ("Demo.IO", vec!["Demo.IO.ISized", "Demo.IO.Stream"]),
            ("Demo.Net", vec!["Demo.Net.Handle"]),
        ]
    );
}

#[test]
fn names_come_from_the_ledger() {
    let report = report();
    let handle = find(&report, "Demo.Net.Handle");

    assert_eq!(handle.name.as_deref(), Some("Handle"));
    assert_eq!(handle.member_names(".ctor"), [Some("constructor")]);
    assert_eq!(handle.member_names("delete"), [Some("delete_")]);
    assert_eq!(handle.member_names("Close"), [Some("Close"), Some("Close")]);
}

#[test]
fn omitted_members_keep_their_reason_and_no_name() {
    let report = report();
    let handle = find(&report, "Demo.Net.Handle");

    let dispose = handle
        .members
        .iter()
        .find(|m| m.clr_name == "Demo.IDisposable.Dispose")
        .expect("dispose is reported");
    assert_eq!(dispose.scope, EmitScope::Omitted);
    assert_eq!(dispose.name, None);
    assert_eq!(dispose.omit_reason, Some(OmitReason::ExplicitImplementation));
    assert!(handle.main_surface().all(|m| m.clr_name != "Demo.IDisposable.Dispose"));
}

#[test]
fn demoted_interface_is_reported_as_a_view() {
    let report = report();
    let stream = find(&report, "Demo.IO.Stream");

    assert!(stream.implements.is_empty());
    assert_eq!(
        stream.views,
        [ViewReport {
            ancestor: "Demo.IO.ISized".to_string(),
            accessor: Some("As_ISized".to_string()),
        }]
    );

    let view_member = stream
        .members
        .iter()
        .find(|m| m.scope == EmitScope::ViewOnly)
        .expect("view member");
    assert_eq!(view_member.name.as_deref(), Some("Size"));
    assert_eq!(view_member.signature, "P:Size:System.Int32|get");
    assert_eq!(view_member.source_ancestor.as_deref(), Some("Demo:Demo.IO.ISized"));
}

#[test]
fn json_uses_camel_case_and_skips_empty_fields() {
    let json = report().to_json().expect("serialize report");

    assert!(json.contains("\"clrName\": \"Demo.Net.Handle\""));
    assert!(json.contains("\"omitReason\""));
    assert!(json.contains("\"scope\": \"viewOnly\""));
    assert!(!json.contains("\"extends\""));
    assert!(!json.contains("\"flattened\""));
}
