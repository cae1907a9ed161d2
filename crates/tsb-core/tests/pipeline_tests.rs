//! Whole-pipeline runs: shaping, naming, validation and the surface report.

use tsb_common::diagnostic_codes;
use tsb_core::{
    ImportSet, Pipeline, PipelineOptions, SurfaceReport, TypeReport, init_tracing, parse_options,
};
use tsb_model::{
    EmitScope, MemberOrigin, MemberSymbol, NameScope, OmitReason, Parameter, StableId,
    SymbolGraph, TypeRef, TypeStableId, TypeSymbol,
};
use tsb_shape::{ClosureScope, SurfaceIndex};

const ASM: &str = "Demo";

fn int32() -> TypeRef {
    TypeRef::core("System.Int32")
}

fn t() -> TypeRef {
    TypeRef::type_param("T", 0)
}

fn local(name: &str) -> TypeRef {
    TypeRef::named(ASM, name)
}

fn closed(name: &str, args: Vec<TypeRef>) -> TypeRef {
    TypeRef::generic(ASM, name, args)
}

fn id(name: &str) -> TypeStableId {
    TypeStableId::new(ASM, name)
}

fn method(name: &str, params: &[(&str, TypeRef)], ret: TypeRef) -> MemberSymbol {
    MemberSymbol::method(
        name,
        params
            .iter()
            .map(|(param, ty)| Parameter::new(*param, ty.clone()))
            .collect(),
        ret,
    )
}

fn types() -> Vec<TypeSymbol> {
    vec![
        TypeSymbol::interface(ASM, "Demo.Num`1")
            .with_generic_params(&["T"])
            .with_member(method("compare", &[("x", t())], int32())),
        TypeSymbol::interface(ASM, "Demo.Ord`1")
            .with_generic_params(&["T"])
            .with_interface(closed("Demo.Num`1", vec![t()]))
            .with_member(method("compare", &[("x", t())], local("Demo.Ordering"))),
        TypeSymbol::interface(ASM, "Demo.X`1")
            .with_generic_params(&["T"])
            .with_interface(closed("Demo.Ord`1", vec![t()]))
            .with_interface(closed("Demo.Num`1", vec![t()])),
        TypeSymbol::interface(ASM, "Demo.Collections.IComparer`1")
            .with_generic_params(&["T"])
            .with_member(method("compare", &[("x", t()), ("y", t())], int32()))
            .with_member(method(
                "equals",
                &[("x", t()), ("y", t())],
                TypeRef::core("System.Boolean"),
            )),
        TypeSymbol::class(ASM, "Demo.Collections.ByteComparer")
            .with_interface(closed(
                "Demo.Collections.IComparer`1",
                vec![TypeRef::core("System.Byte")],
            ))
            .with_member(method(
                "compare",
                &[("x", TypeRef::core("System.Byte")), ("y", TypeRef::core("System.Byte"))],
                int32(),
            )),
        TypeSymbol::class(ASM, "Demo.Text.Base")
            .with_member(method("toString", &[], TypeRef::core("System.String"))),
        TypeSymbol::class(ASM, "Demo.Text.Custom")
            .with_base(local("Demo.Text.Base"))
            .with_member(method("toString", &[], local("Demo.Text.CustomString"))),
        TypeSymbol::class(ASM, "Demo.IO.Handle").with_member(method("Close", &[], TypeRef::void())),
        TypeSymbol::class(ASM, "Demo.Net.Handle")
            .with_member(method("Close", &[], TypeRef::void()))
            .with_member(method(
                "Close",
                &[("force", TypeRef::core("System.Boolean"))],
                TypeRef::void(),
            )),
    ]
}

/// Pipeline with the `TSB_LOG` subscriber installed, so a failing run can be
/// replayed with tracing output.
fn pipeline(options: PipelineOptions) -> Pipeline {
    init_tracing();
    Pipeline::new(options)
}

fn sequential() -> PipelineOptions {
    PipelineOptions {
        parallel: false,
        ..PipelineOptions::default()
    }
}

fn handles() -> ImportSet {
    ImportSet::new("Demo.App", [id("Demo.Net.Handle"), id("Demo.IO.Handle")])
}

fn find<'r>(report: &'r SurfaceReport, clr_name: &str) -> &'r TypeReport {
    report
        .find_type(clr_name)
        .unwrap_or_else(|| panic!("type {clr_name} missing"))
}

#[test]
fn library_runs_clean() {
    let output = pipeline(sequential())
        .with_import_set(handles())
        .run(&SymbolGraph::from_types(types()));

    assert!(!output.has_errors(), "{:?}", output.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn narrowed_diamond_flattens_the_wider_ancestor() {
    let output = pipeline(sequential()).run(&SymbolGraph::from_types(types()));
    let report = output.report();
    let x = find(&report, "Demo.X`1");

    assert_eq!(x.implements.len(), 1);
    assert!(x.implements[0].starts_with("Demo.Ord`1"));
    assert_eq!(x.flattened.len(), 1);
    assert!(x.flattened[0].starts_with("Demo.Num`1"));

    let graph = &output.graph;
    let x_symbol = graph.find_by_name("Demo.X`1").expect("X is in the graph");
    let index = SurfaceIndex::new(graph);
    let surface = index.open_surface(x_symbol, ClosureScope::Interfaces);
    let ordering = surface
        .members_named("compare")
        .filter(|entry| entry.signature == "M:compare(T)->Demo.Ordering")
        .count();
    assert_eq!(ordering, 1);
}

#[test]
fn closed_comparer_gets_a_named_equals() {
    let report = pipeline(sequential())
        .run(&SymbolGraph::from_types(types()))
        .report();
    let comparer = find(&report, "Demo.Collections.ByteComparer");

    let equals = comparer
        .members
        .iter()
        .find(|m| m.clr_name == "equals")
        .expect("equals is synthesized");
    assert_eq!(equals.origin, MemberOrigin::Synthesized);
    assert_eq!(equals.scope, EmitScope::ClassSurface);
    assert_eq!(equals.signature, "M:equals(System.Byte,System.Byte)->System.Boolean");
    assert_eq!(equals.name.as_deref(), Some("equals"));
}

#[test]
fn sibling_handles_share_an_import_scope() {
    let graph = SymbolGraph::from_types(types());
    let scope = NameScope::import("Demo.App");
    let io: StableId = id("Demo.IO.Handle").into();
    let net: StableId = id("Demo.Net.Handle").into();

    let reversed = ImportSet::new("Demo.App", [id("Demo.IO.Handle"), id("Demo.Net.Handle")]);
    for import_set in [handles(), reversed] {
        let output = pipeline(sequential())
            .with_import_set(import_set)
            .run(&graph);
        assert_eq!(output.ledger.final_name(&io, &scope, false), Ok("Handle"));
        assert_eq!(output.ledger.final_name(&net, &scope, false), Ok("Handle2"));
    }
}

#[test]
fn covariant_override_is_suppressed_with_a_reason() {
    let output = pipeline(sequential()).run(&SymbolGraph::from_types(types()));
    let report = output.report();
    let custom = find(&report, "Demo.Text.Custom");

    let own: Vec<_> = custom
        .members
        .iter()
        .filter(|m| m.clr_name == "toString" && m.origin == MemberOrigin::Declared)
        .collect();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].scope, EmitScope::Omitted);
    assert_eq!(own[0].name, None);
    assert!(matches!(
        own[0].omit_reason,
        Some(OmitReason::CovariantOverride { .. })
    ));
    assert!(
        output
            .diagnostics
            .with_code(diagnostic_codes::COVARIANT_OVERRIDE_SUPPRESSED)
            .next()
            .is_some()
    );
}

#[test]
fn reports_are_byte_identical_across_runs() {
    let graph = SymbolGraph::from_types(types());
    let mut reversed_types = types();
    reversed_types.reverse();
    let reversed = SymbolGraph::from_types(reversed_types);

    let json = |options: PipelineOptions, graph: &SymbolGraph| {
        pipeline(options)
            .with_import_set(handles())
            .run(graph)
            .report()
            .to_json()
            .expect("serialize report")
    };

    let first = json(sequential(), &graph);
    assert_eq!(first, json(sequential(), &graph));
    assert_eq!(first, json(PipelineOptions::default(), &graph));
    assert_eq!(first, json(sequential(), &reversed));
}

#[test]
fn member_naming_follows_configuration() {
    let options = parse_options(r#"{ "memberNaming": "camelCase", "parallel": false }"#)
        .expect("valid config");
    let report = pipeline(options)
        .run(&SymbolGraph::from_types(types()))
        .report();

    let handle = find(&report, "Demo.Net.Handle");
    assert_eq!(handle.member_names("Close"), [Some("close"), Some("close")]);
}

#[test]
fn duplicate_declared_signatures_block_the_run() {
    let graph = SymbolGraph::from_types([TypeSymbol::class(ASM, "Demo.Twice")
        .with_member(method("Run", &[], TypeRef::void()))
        .with_member(method("Run", &[], TypeRef::void()))]);

    let output = pipeline(sequential()).run(&graph);
    assert!(output.has_errors());
    assert!(output.diagnostics.iter().any(|d| {
        d.is_error()
            && (d.code == diagnostic_codes::DUPLICATE_IDENTITY
                || d.code == diagnostic_codes::DUPLICATE_OWN_SIGNATURE)
    }));
}

#[test]
fn exhausted_suffixes_stop_naming_before_validation() {
    let options = PipelineOptions {
        max_suffix_attempts: 1,
        ..sequential()
    };
    let output = pipeline(options)
        .with_import_set(handles())
        .run(&SymbolGraph::from_types(types()));

    assert!(output.has_errors());
    assert_eq!(
        output
            .diagnostics
            .with_code(diagnostic_codes::NAME_SUFFIX_EXHAUSTED)
            .count(),
        1
    );
    assert_eq!(
        output
            .diagnostics
            .with_code(diagnostic_codes::MISSING_FINAL_NAME)
            .count(),
        0
    );
}
