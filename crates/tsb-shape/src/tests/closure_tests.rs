use super::*;
use crate::test_fixtures::*;
use tsb_model::{Accessors, Parameter};

fn collections() -> SymbolGraph {
    graph(vec![
        TypeSymbol::interface(ASM, "Demo.IEnumerable`1")
            .with_generic_params(&["T"])
            .with_member(method(
                "GetEnumerator",
                Vec::new(),
                closed("Demo.IEnumerator`1", vec![t()]),
            )),
        TypeSymbol::interface(ASM, "Demo.ICollection`1")
            .with_generic_params(&["T"])
            .with_interface(closed("Demo.IEnumerable`1", vec![t()]))
            .with_member(MemberSymbol::property("Count", int32(), Accessors::Get))
            .with_member(method("Add", vec![("item", t())], TypeRef::void())),
        TypeSymbol::interface(ASM, "Demo.IList`1")
            .with_generic_params(&["T"])
            .with_interface(closed("Demo.ICollection`1", vec![t()]))
            .with_member(MemberSymbol::indexer(
                "Item",
                vec![Parameter::new("index", int32())],
                t(),
                Accessors::GetSet,
            ))
            .with_member(method("IndexOf", vec![("item", t())], int32())),
    ])
}

#[test]
fn test_closure_substitutes_inherited_members() {
    let graph = collections();
    let index = SurfaceIndex::new(&graph);
    let surface = index.surface(
        &closed("Demo.IList`1", vec![string()]),
        ClosureScope::Interfaces,
    );

    assert!(surface.contains_signature("Add", "M:Add(System.String)->System.Void"));
    assert!(surface.contains_signature(
        "GetEnumerator",
        "M:GetEnumerator()->Demo.IEnumerator`1[System.String]"
    ));
    assert!(surface.contains_signature("Item", "P:Item[System.Int32]:System.String|get-set"));
    assert_eq!(surface.len(), 5);
    assert!(
        surface
            .ancestors
            .contains(&TypeStableId::new(ASM, "Demo.IEnumerable`1"))
    );
    assert!(surface.unresolved.is_empty());
}

#[test]
fn test_closure_records_declaring_type() {
    let graph = collections();
    let index = SurfaceIndex::new(&graph);
    let surface = index.open_surface(find(&graph, "Demo.IList`1"), ClosureScope::Interfaces);

    let add = surface.members_named("Add").next().expect("Add on surface");
    assert_eq!(add.declared_by, TypeStableId::new(ASM, "Demo.ICollection`1"));
    assert_eq!(surface.signatures_for("Add").len(), 1);
}

#[test]
fn test_open_surfaces_are_memoized() {
    let graph = collections();
    let index = SurfaceIndex::new(&graph);
    let list = find(&graph, "Demo.IList`1");

    let first = index.open_surface(list, ClosureScope::Interfaces);
    let second = index.open_surface(list, ClosureScope::Interfaces);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(index.cached_len(), 3);
}

#[test]
fn test_ancestor_cycle_is_cut_and_only_the_root_memoized() {
    let graph = graph(vec![
        TypeSymbol::interface(ASM, "Demo.IA")
            .with_interface(local("Demo.IB"))
            .with_member(method("A", Vec::new(), TypeRef::void())),
        TypeSymbol::interface(ASM, "Demo.IB")
            .with_interface(local("Demo.IA"))
            .with_member(method("B", Vec::new(), TypeRef::void())),
    ]);
    let index = SurfaceIndex::new(&graph);
    let surface = index.open_surface(find(&graph, "Demo.IA"), ClosureScope::Interfaces);

    assert!(surface.contains_name("A"));
    assert!(surface.contains_name("B"));
    assert_eq!(surface.cycles, vec![TypeStableId::new(ASM, "Demo.IA")]);
    assert_eq!(index.cached_len(), 1);
}

#[test]
fn test_closed_cycle_is_memoized_once_per_type() {
    let graph = graph(vec![
        TypeSymbol::interface(ASM, "Demo.IA")
            .with_interface(local("Demo.IB"))
            .with_member(method("A", Vec::new(), TypeRef::void())),
        TypeSymbol::interface(ASM, "Demo.IB")
            .with_interface(local("Demo.IC"))
            .with_member(method("B", Vec::new(), TypeRef::void())),
        TypeSymbol::interface(ASM, "Demo.IC")
            .with_interface(local("Demo.IA"))
            .with_member(method("C", Vec::new(), TypeRef::void())),
    ]);
    let index = SurfaceIndex::new(&graph);

    for name in ["Demo.IA", "Demo.IB", "Demo.IC"] {
        let surface = index.open_surface(find(&graph, name), ClosureScope::Interfaces);
        assert_eq!(surface.names().collect::<Vec<_>>().len(), 3, "{name}");
    }
    assert_eq!(index.cached_len(), 3);

    let again = index.open_surface(find(&graph, "Demo.IC"), ClosureScope::Interfaces);
    assert!(again.contains_name("A"));
    assert_eq!(index.cached_len(), 3);
}

#[test]
fn test_memo_stops_growing_at_its_limit() {
    let graph = collections();
    let index = SurfaceIndex::with_cache_limit(&graph, 1);
    let list = find(&graph, "Demo.IList`1");

    let first = index.open_surface(list, ClosureScope::Interfaces);
    let second = index.open_surface(list, ClosureScope::Interfaces);
    assert_eq!(first, second);
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(index.cached_len(), 1);
}

#[test]
fn test_unresolved_ancestors_are_opaque() {
    let graph = graph(vec![
        TypeSymbol::interface(ASM, "Demo.IThing")
            .with_interface(local("Demo.IMissing"))
            .with_member(method("Run", Vec::new(), TypeRef::void())),
    ]);
    let index = SurfaceIndex::new(&graph);

    let surface = index.surface(&local("Demo.IThing"), ClosureScope::Interfaces);
    assert_eq!(surface.len(), 1);
    assert_eq!(surface.unresolved, vec![local("Demo.IMissing")]);

    let missing = index.surface(&local("Demo.IMissing"), ClosureScope::Interfaces);
    assert!(missing.is_empty());
    assert_eq!(missing.unresolved.len(), 1);
}

#[test]
fn test_scope_controls_base_traversal() {
    let graph = graph(vec![
        TypeSymbol::class(ASM, "Demo.Base").with_member(method("Reset", Vec::new(), TypeRef::void())),
        TypeSymbol::class(ASM, "Demo.Derived")
            .with_base(local("Demo.Base"))
            .with_member(method("Run", Vec::new(), TypeRef::void()))
            .with_member(method("Create", Vec::new(), local("Demo.Derived")).with_static(true))
            .with_member(method("Demo.IRunner.Run", Vec::new(), TypeRef::void())),
    ]);
    let index = SurfaceIndex::new(&graph);
    let derived = find(&graph, "Demo.Derived");

    let full = index.open_surface(derived, ClosureScope::Full);
    assert!(full.contains_name("Reset"));
    assert!(full.contains_name("Run"));
    assert!(!full.contains_name("Create"));
    assert!(!full.contains_name("Demo.IRunner.Run"));

    let interfaces_only = index.open_surface(derived, ClosureScope::Interfaces);
    assert!(!interfaces_only.contains_name("Reset"));
    assert!(index.reaches(derived, &TypeStableId::new(ASM, "Demo.Base")));
}

#[test]
fn test_uncovered_reference_keeps_open_parameters() {
    let graph = collections();
    let index = SurfaceIndex::new(&graph);
    let surface = index.surface(&local("Demo.IEnumerable`1"), ClosureScope::Interfaces);

    let entry = surface
        .members_named("GetEnumerator")
        .next()
        .expect("GetEnumerator on surface");
    assert_eq!(entry.member.type_level_params(), ["T"]);
}
