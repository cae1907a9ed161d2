//! Builders shared by the unit tests.

use tsb_model::{MemberSymbol, Parameter, SymbolGraph, TypeRef, TypeSymbol};

pub const ASM: &str = "Demo";

pub fn int32() -> TypeRef {
    TypeRef::core("System.Int32")
}

pub fn string() -> TypeRef {
    TypeRef::core("System.String")
}

pub fn boolean() -> TypeRef {
    TypeRef::core("System.Boolean")
}

pub fn byte() -> TypeRef {
    TypeRef::core("System.Byte")
}

/// The first type-level generic parameter, `T`.
pub fn t() -> TypeRef {
    TypeRef::type_param("T", 0)
}

pub fn local(full_name: &str) -> TypeRef {
    TypeRef::named(ASM, full_name)
}

pub fn closed(full_name: &str, args: Vec<TypeRef>) -> TypeRef {
    TypeRef::generic(ASM, full_name, args)
}

pub fn method(name: &str, params: Vec<(&str, TypeRef)>, ret: TypeRef) -> MemberSymbol {
    MemberSymbol::method(
        name,
        params
            .into_iter()
            .map(|(param, ty)| Parameter::new(param, ty))
            .collect(),
        ret,
    )
}

pub fn graph(types: Vec<TypeSymbol>) -> SymbolGraph {
    SymbolGraph::from_types(types)
}

pub fn find<'g>(graph: &'g SymbolGraph, full_name: &str) -> &'g TypeSymbol {
    graph
        .find_by_name(full_name)
        .unwrap_or_else(|| panic!("type {full_name} missing from graph"))
}

/// Normalized signatures of the members printed on the main surface.
pub fn main_surface(ty: &TypeSymbol) -> Vec<String> {
    ty.members
        .iter()
        .filter(|m| m.emit_scope.is_main_surface())
        .map(crate::normalize::normalize)
        .collect()
}
