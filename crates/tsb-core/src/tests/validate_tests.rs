use super::*;
use crate::test_fixtures::{ASM, method, sample_graph, type_id};
use tsb_common::DiagnosticSeverity;
use tsb_names::{NamingOptions, reserve_graph};
use tsb_shape::{ShapeOptions, run_passes};

fn shaped(graph: &SymbolGraph) -> SymbolGraph {
    run_passes(graph, &ShapeOptions::default()).graph
}

fn named(graph: &SymbolGraph) -> NameLedger {
    let mut ledger = NameLedger::new();
    let diagnostics = reserve_graph(graph, &mut ledger, &NamingOptions::default());
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    ledger
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
    diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn complete_run_passes_the_gate() {
    let graph = shaped(&sample_graph());
    let ledger = named(&graph);

    assert_eq!(validate(&graph, &ledger, false), vec![]);
    assert_eq!(validate(&graph, &ledger, true), vec![]);
}

#[test]
fn empty_ledger_reports_every_missing_name() {
    let graph = shaped(&sample_graph());
    let ledger = NameLedger::new();

    let diagnostics = validate(&graph, &ledger, false);
    assert!(diagnostics.len() >= graph.type_count());
    assert!(
        diagnostics
            .iter()
            .all(|d| d.code == diagnostic_codes::MISSING_FINAL_NAME
                && d.severity == DiagnosticSeverity::Error)
    );
    // The first finding is the first type's own name.
    assert_eq!(
        diagnostics[0].identity.as_deref(),
        Some(type_id("Demo.IO.ISized").to_string().as_str())
    );
}

#[test]
fn view_member_needs_a_declared_view() {
    let graph = shaped(&sample_graph());
    let ledger = named(&graph);

    let stripped = graph.map_types(|ty| {
        let mut out = ty.clone();
        out.views.clear();
        out
    });

    let diagnostics = validate(&stripped, &ledger, false);
    assert_eq!(codes(&diagnostics), [diagnostic_codes::VIEW_MEMBER_WITHOUT_VIEW]);
    assert!(diagnostics[0].message_text.contains("Demo.IO.ISized"));
}

#[test]
fn repeated_class_surface_signature_is_an_error() {
    // Built directly so no pass gets to deduplicate.
    let graph = SymbolGraph::from_types([TypeSymbol::class(ASM, "Demo.Twice")
        .with_member(method("Run", vec![]))
        .with_member(method("Run", vec![]))]);
    let ledger = named(&graph);

    let diagnostics = validate(&graph, &ledger, false);
    assert_eq!(
        codes(&diagnostics),
        [diagnostic_codes::DUPLICATE_CLASS_SURFACE_SIGNATURE]
    );
    assert!(diagnostics[0].message_text.contains("M:Run()->System.Void"));
}

#[test]
fn shared_name_outside_one_family_is_an_error() {
    let owner = type_id("Demo.Io");
    let read = method("Read", vec![]);
    let write = method("Write", vec![]);
    let graph = SymbolGraph::from_types([TypeSymbol::class(ASM, "Demo.Io")
        .with_member(read.clone())
        .with_member(write.clone())]);

    let mut ledger = NameLedger::new();
    let instance = NameScope::instance(&owner);
    ledger
        .reserve(owner.clone(), "Io", &NameScope::namespace("Demo"), false)
        .expect("type name");
    // Both members claim one family key, so they end up sharing "Read".
    for member in [&read, &write] {
        ledger
            .reserve_overload(
                member_stable_id(&owner, member),
                "shared",
                &member.name,
                &instance,
                false,
            )
            .expect("member name");
    }

    let diagnostics = validate(&graph, &ledger, false);
    assert_eq!(codes(&diagnostics), [diagnostic_codes::DUPLICATE_FINAL_NAME]);
    assert!(diagnostics[0].message_text.contains("'Read'"));
}

#[test]
fn overload_family_may_share_a_name() {
    let graph = shaped(&sample_graph());
    let ledger = named(&graph);
    let handle = type_id("Demo.Net.Handle");
    let instance = NameScope::instance(&handle);

    let close_names: Vec<&str> = ledger
        .entries(&instance)
        .filter(|(id, _)| id.as_member().is_some_and(|m| m.member_name == "Close"))
        .map(|(_, entry)| entry.final_name.as_str())
        .collect();
    assert_eq!(close_names, ["Close", "Close"]);
    assert!(check_scope_uniqueness(&ledger).is_empty());
}
