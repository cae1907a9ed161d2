//! End-to-end conformance checks over the full structural pass pipeline.

use rustc_hash::FxHashSet;
use tsb_common::diagnostic_codes;
use tsb_model::{
    Accessors, EmitScope, MemberOrigin, MemberSymbol, OmitReason, Parameter, SymbolGraph, TypeRef,
    TypeSymbol,
};
use tsb_shape::{ClosureScope, ShapeOptions, SurfaceIndex, normalize, run_passes};

const ASM: &str = "Demo";

fn int32() -> TypeRef {
    TypeRef::core("System.Int32")
}

fn string() -> TypeRef {
    TypeRef::core("System.String")
}

fn byte() -> TypeRef {
    TypeRef::core("System.Byte")
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

fn find<'g>(graph: &'g SymbolGraph, name: &str) -> &'g TypeSymbol {
    graph
        .find_by_name(name)
        .unwrap_or_else(|| panic!("type {name} missing"))
}

fn printed(ty: &TypeSymbol, scope: EmitScope) -> Vec<String> {
    ty.members
        .iter()
        .filter(|m| m.emit_scope == scope)
        .map(normalize)
        .collect()
}

fn ordering_types() -> Vec<TypeSymbol> {
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
    ]
}

/// A mixed graph spread over several namespaces.
fn library() -> SymbolGraph {
    let mut types = ordering_types();
    types.extend([
        TypeSymbol::interface(ASM, "Demo.Collections.IComparer`1")
            .with_generic_params(&["T"])
            .with_member(method("compare", &[("x", t()), ("y", t())], int32()))
            .with_member(method("equals", &[("x", t()), ("y", t())], TypeRef::core("System.Boolean"))),
        TypeSymbol::class(ASM, "Demo.Collections.ByteComparer")
            .with_interface(closed("Demo.Collections.IComparer`1", vec![byte()]))
            .with_member(method("compare", &[("x", byte()), ("y", byte())], int32())),
        TypeSymbol::class(ASM, "Demo.Text.Base").with_member(method("toString", &[], string())),
        TypeSymbol::class(ASM, "Demo.Text.Custom")
            .with_base(local("Demo.Text.Base"))
            .with_member(method("toString", &[], local("Demo.Text.CustomString"))),
        TypeSymbol::interface(ASM, "Demo.Text.ISized")
            .with_member(MemberSymbol::property("Size", int32(), Accessors::Get)),
        TypeSymbol::interface(ASM, "Demo.Text.ILabeled")
            .with_member(MemberSymbol::property("Size", string(), Accessors::Get))
            .with_member(method("Label", &[], string())),
        TypeSymbol::class(ASM, "Demo.Text.Badge")
            .with_interface(local("Demo.Text.ILabeled"))
            .with_member(MemberSymbol::property("Size", int32(), Accessors::Get)),
        TypeSymbol::class(ASM, "Demo.Text.Tag")
            .with_interface(local("Demo.Text.ISized"))
            .with_interface(local("Demo.Text.ILabeled")),
        TypeSymbol::class(ASM, "Demo.Text.Grid")
            .with_member(MemberSymbol::indexer("Item", vec![Parameter::new("i", int32())], string(), Accessors::Get))
            .with_member(MemberSymbol::indexer("Item", vec![Parameter::new("key", string())], string(), Accessors::Get)),
    ]);
    SymbolGraph::from_types(types)
}

#[test]
fn narrowed_diamond_keeps_one_retained_shape() {
    let output = run_passes(&SymbolGraph::from_types(ordering_types()), &ShapeOptions::default());
    let graph = &output.graph;

    let x = find(graph, "Demo.X`1");
    assert_eq!(x.interfaces, vec![closed("Demo.Ord`1", vec![t()])]);
    assert_eq!(x.flattened, vec![closed("Demo.Num`1", vec![t()])]);

    let index = SurfaceIndex::new(graph);
    let surface = index.open_surface(x, ClosureScope::Interfaces);
    let ordering: Vec<_> = surface
        .members_named("compare")
        .filter(|entry| entry.signature == "M:compare(T)->Demo.Ordering")
        .collect();
    assert_eq!(ordering.len(), 1);
    assert!(!output.diagnostics.iter().any(|d| d.is_error()));
}

#[test]
fn closed_comparer_gets_substituted_equals() {
    let output = run_passes(&library(), &ShapeOptions::default());
    let comparer = find(&output.graph, "Demo.Collections.ByteComparer");

    assert!(
        printed(comparer, EmitScope::ClassSurface)
            .contains(&"M:equals(System.Byte,System.Byte)->System.Boolean".to_string())
    );
}

#[test]
fn covariant_override_reaches_surface_once() {
    let output = run_passes(&library(), &ShapeOptions::default());
    let graph = &output.graph;
    let custom = find(graph, "Demo.Text.Custom");

    let own = &custom.members[0];
    assert_eq!(own.emit_scope, EmitScope::Omitted);
    assert!(matches!(
        own.omit_reason,
        Some(OmitReason::CovariantOverride { .. })
    ));

    let index = SurfaceIndex::new(graph);
    let surface = index.open_surface(custom, ClosureScope::Full);
    assert_eq!(
        surface.signatures_for("toString").into_iter().collect::<Vec<_>>(),
        ["M:toString()->System.String"]
    );
}

#[test]
fn incompatible_interface_moves_to_view() {
    let output = run_passes(&library(), &ShapeOptions::default());
    let badge = find(&output.graph, "Demo.Text.Badge");

    assert!(badge.interfaces.is_empty());
    assert_eq!(badge.views, vec![local("Demo.Text.ILabeled")]);
    assert_eq!(
        printed(badge, EmitScope::ViewOnly),
        ["M:Label()->System.String", "P:Size:System.String|get"]
    );
    assert!(
        output
            .diagnostics
            .iter()
            .any(|d| d.code == diagnostic_codes::INTERFACE_DEMOTED_TO_VIEW)
    );
}

#[test]
fn conflicting_property_ancestor_is_flattened() {
    let output = run_passes(&library(), &ShapeOptions::default());
    let tag = find(&output.graph, "Demo.Text.Tag");

    assert_eq!(tag.interfaces, vec![local("Demo.Text.ISized")]);
    assert_eq!(tag.flattened, vec![local("Demo.Text.ILabeled")]);
    assert_eq!(
        printed(tag, EmitScope::ClassSurface),
        ["M:Label()->System.String", "P:Size:System.Int32|get"]
    );
}

#[test]
fn overloaded_indexers_become_accessors() {
    let output = run_passes(&library(), &ShapeOptions::default());
    let grid = find(&output.graph, "Demo.Text.Grid");

    let accessors: Vec<&MemberSymbol> = grid
        .members
        .iter()
        .filter(|m| m.origin == MemberOrigin::IndexerAccessor)
        .collect();
    assert_eq!(accessors.len(), 2);
    assert!(
        grid.members
            .iter()
            .filter(|m| m.is_indexer())
            .all(|m| m.omit_reason == Some(OmitReason::IndexerOverload))
    );
}

#[test]
fn printed_surfaces_have_unique_signatures() {
    let output = run_passes(&library(), &ShapeOptions::with_builtin_exceptions());

    for ty in output.graph.types() {
        let mut seen = FxHashSet::default();
        for member in ty.members.iter().filter(|m| m.emit_scope.is_printed()) {
            let key = (
                member.emit_scope,
                member.source_ancestor.clone().filter(|_| member.emit_scope == EmitScope::ViewOnly),
                normalize(member),
            );
            assert!(seen.insert(key), "{} prints {} twice", ty.id, member.name);
        }
    }
}

#[test]
fn retained_ancestors_agree_on_properties() {
    let output = run_passes(&library(), &ShapeOptions::default());
    let index = SurfaceIndex::new(&output.graph);

    for ty in output.graph.types() {
        let surfaces: Vec<_> = ty
            .interfaces
            .iter()
            .map(|reference| index.surface(reference, ClosureScope::Interfaces))
            .collect();
        for (i, left) in surfaces.iter().enumerate() {
            for right in &surfaces[i + 1..] {
                for name in left.properties.keys() {
                    if right.contains_name(name) {
                        assert_eq!(
                            left.signatures_for(name),
                            right.signatures_for(name),
                            "{} keeps conflicting '{name}'",
                            ty.id
                        );
                    }
                }
            }
        }
    }
}

fn io_types() -> Vec<TypeSymbol> {
    vec![
        TypeSymbol::interface(ASM, "Demo.Io.IReader")
            .with_member(method("Read", &[("count", int32())], int32())),
        TypeSymbol::interface(ASM, "Demo.Io.IByteReader")
            .with_interface(local("Demo.Io.IReader"))
            .with_member(method("Read", &[("value", byte())], int32())),
        TypeSymbol::interface(ASM, "Demo.Io.IStream")
            .with_interface(local("Demo.Io.IByteReader"))
            .with_interface(local("Demo.Io.IReader")),
        TypeSymbol::interface(ASM, "Demo.Io.IWriter")
            .with_member(method("Write", &[("text", string())], TypeRef::void())),
        TypeSymbol::interface(ASM, "Demo.Io.ILogger")
            .with_member(method("Write", &[("code", int32())], TypeRef::void())),
        TypeSymbol::class(ASM, "Demo.Io.Sink")
            .with_interface(local("Demo.Io.IWriter"))
            .with_interface(local("Demo.Io.ILogger")),
        TypeSymbol::class(ASM, "Demo.Io.Pipe")
            .with_interface(local("Demo.Io.IStream"))
            .with_interface(local("Demo.Io.IWriter")),
    ]
}

#[test]
fn retained_ancestors_agree_on_methods_or_carry_overloads() {
    let mut types = io_types();
    types.extend(library().types().cloned());
    let output = run_passes(&SymbolGraph::from_types(types), &ShapeOptions::default());
    let graph = &output.graph;
    let index = SurfaceIndex::new(graph);

    let stream = find(graph, "Demo.Io.IStream");
    assert_eq!(stream.interfaces, vec![local("Demo.Io.IByteReader")]);
    assert_eq!(stream.flattened, vec![local("Demo.Io.IReader")]);

    let sink = find(graph, "Demo.Io.Sink");
    assert_eq!(sink.interfaces.len(), 2);
    assert_eq!(
        sink.members
            .iter()
            .filter(|m| m.origin == MemberOrigin::DiamondOverload)
            .count(),
        2
    );

    for ty in graph.types() {
        let own: FxHashSet<String> = printed(ty, EmitScope::ClassSurface).into_iter().collect();
        let surfaces: Vec<_> = ty
            .interfaces
            .iter()
            .map(|reference| index.surface(reference, ClosureScope::Interfaces))
            .collect();
        for (i, left) in surfaces.iter().enumerate() {
            for right in &surfaces[i + 1..] {
                for name in left.methods.keys() {
                    if !right.methods.contains_key(name) {
                        continue;
                    }
                    let (mine, theirs) = (left.signatures_for(name), right.signatures_for(name));
                    if mine == theirs {
                        continue;
                    }
                    for signature in mine.union(&theirs) {
                        assert!(
                            own.contains(*signature),
                            "{} keeps conflicting '{name}' without overload {signature}",
                            ty.id
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let graph = library();
    let sequential = run_passes(&graph, &ShapeOptions::with_builtin_exceptions());
    let again = run_passes(&graph, &ShapeOptions::with_builtin_exceptions());
    let parallel = run_passes(
        &graph,
        &ShapeOptions {
            parallel: true,
            ..ShapeOptions::with_builtin_exceptions()
        },
    );

    assert_eq!(sequential.graph, again.graph);
    assert_eq!(sequential.graph, parallel.graph);
    assert_eq!(sequential.diagnostics, parallel.diagnostics);
}
