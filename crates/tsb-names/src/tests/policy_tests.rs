use super::*;
use tsb_model::TypeKind;

#[test]
fn test_camel_case() {
    assert_eq!(camel_case("ToString"), "toString");
    assert_eq!(camel_case("IOStream"), "ioStream");
    assert_eq!(camel_case("URL"), "url");
    assert_eq!(camel_case("X"), "x");
    assert_eq!(camel_case("alreadyCamel"), "alreadyCamel");
    assert_eq!(camel_case(""), "");
}

#[test]
fn test_member_naming_none_keeps_clr_name() {
    assert_eq!(MemberNaming::None.apply("GetHashCode"), "GetHashCode");
    assert_eq!(MemberNaming::CamelCase.apply("GetHashCode"), "getHashCode");
}

#[test]
fn test_type_names_drop_arity_ticks_and_nesting() {
    let list = TypeSymbol::new(TypeKind::Class, "Demo", "Demo.Collections.List`1");
    assert_eq!(type_name(&list), "List_1");

    let inner = TypeSymbol::new(TypeKind::Class, "Demo", "Demo.Outer+Inner");
    assert_eq!(type_name(&inner), "Outer_Inner");
}

#[test]
fn test_view_accessor_uses_referenced_simple_name() {
    let comparer = TypeRef::generic("Demo", "Demo.IComparer`1", vec![TypeRef::core("System.Byte")]);
    assert_eq!(
        view_accessor_name("As_", &comparer).as_deref(),
        Some("As_IComparer_1")
    );
    assert_eq!(view_accessor_name("As_", &TypeRef::type_param("T", 0)), None);
}
