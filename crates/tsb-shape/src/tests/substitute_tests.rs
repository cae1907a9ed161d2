use super::*;
use crate::normalize::normalize;
use crate::test_fixtures::*;

fn params(names: &[&str]) -> Vec<GenericParameter> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| GenericParameter::new(*name, i as u32))
        .collect()
}

#[test]
fn test_build_pairs_parameters_by_position() {
    let closed = closed("Demo.IMap`2", vec![string(), int32()]);
    let map = SubstitutionMap::build(&closed, &params(&["K", "V"]));

    assert_eq!(map.len(), 2);
    assert_eq!(map.get("K"), Some(&string()));
    assert_eq!(map.get("V"), Some(&int32()));
    assert!(map.covers(&params(&["K", "V"])));
}

#[test]
fn test_arity_mismatch_yields_empty_map() {
    let open = closed("Demo.IMap`2", vec![string()]);
    let map = SubstitutionMap::build(&open, &params(&["K", "V"]));

    assert!(map.is_empty());
    assert!(!map.covers(&params(&["K", "V"])));
    assert!(map.covers(&[]));
}

#[test]
fn test_substitute_reaches_nested_positions() {
    let mut map = SubstitutionMap::new();
    map.insert("T", int32());

    let enumerable = closed("Demo.IEnumerable`1", vec![TypeRef::array(t())]);
    assert_eq!(
        substitute(&enumerable, &map),
        closed("Demo.IEnumerable`1", vec![TypeRef::array(int32())])
    );
    assert_eq!(
        substitute(&TypeRef::by_ref(t()), &map),
        TypeRef::by_ref(int32())
    );
    assert_eq!(substitute(&string(), &map), string());
}

#[test]
fn test_method_generics_are_never_substituted() {
    let mut map = SubstitutionMap::new();
    map.insert("T", string());

    let convert = MemberSymbol::method(
        "Convert",
        vec![Parameter::new("value", t())],
        TypeRef::method_param("U", 0),
    )
    .with_method_generics(&["U"]);
    assert_eq!(
        normalize(&substitute_member(&convert, &map)),
        "M:Convert`1(System.String)->!!0"
    );

    // A method parameter named like the type's parameter shadows it.
    let echo = MemberSymbol::method(
        "Echo",
        vec![Parameter::new("value", TypeRef::method_param("T", 0))],
        TypeRef::method_param("T", 0),
    )
    .with_method_generics(&["T"]);
    assert_eq!(substitute_member(&echo, &map), echo);
}

#[test]
fn test_substitution_round_trips_through_renaming() {
    let mut forward = SubstitutionMap::new();
    forward.insert("T", TypeRef::type_param("K", 0));
    let mut back = SubstitutionMap::new();
    back.insert("K", t());

    let original = closed(
        "Demo.IPair`2",
        vec![t(), TypeRef::array(closed("Demo.IBox`1", vec![t()]))],
    );
    let renamed = substitute(&original, &forward);
    assert_ne!(renamed, original);
    assert_eq!(substitute(&renamed, &back), original);
}

#[test]
fn test_out_of_scope_params_reports_free_names() {
    let member = method(
        "Zip",
        vec![("first", t()), ("second", TypeRef::type_param("U", 1))],
        TypeRef::method_param("R", 0),
    )
    .with_method_generics(&["R"]);

    assert_eq!(out_of_scope_params(&member, ["T"]), ["U"]);
    assert!(out_of_scope_params(&member, ["T", "U"]).is_empty());
}

#[test]
fn test_without_drops_shadowed_names() {
    let mut map = SubstitutionMap::new();
    map.insert("T", int32());
    map.insert("U", string());

    let reduced = map.without(["T"]);
    assert_eq!(reduced.len(), 1);
    assert!(reduced.get("T").is_none());
    assert!(!map.is_identity());

    let mut identity = SubstitutionMap::new();
    identity.insert("T", t());
    assert!(identity.is_identity());
}
