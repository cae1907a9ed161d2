//! Symbol model for the tsb declaration-surface engine.
//!
//! This crate defines the data every pass reads and produces:
//! - Type references (`TypeRef`) and generic parameter references
//! - Type and member symbols with emit scopes and provenance
//! - The namespace-partitioned `SymbolGraph` and its resolution index
//! - Pre-rename identity keys (`StableId`) and naming scopes (`NameScope`)

pub mod graph;
pub mod identity;
pub mod scope;
pub mod symbols;
pub mod type_ref;

pub use graph::{NamespaceSymbol, SymbolGraph, TypeLocation};
pub use identity::{MemberStableId, StableId, TypeStableId};
pub use scope::NameScope;
pub use symbols::{
    Accessibility, Accessors, ConstructorShape, EmitScope, EventShape, FieldShape,
    GenericParameter, MemberKind, MemberOrigin, MemberSymbol, MethodShape, OmitReason, Parameter,
    ParameterList, ParameterMode, PropertyShape, TypeFlags, TypeKind, TypeSymbol,
    split_full_name,
};
pub use type_ref::{CORE_ASSEMBLY, GenericOwner, GenericParamRef, NamedTypeRef, NestedTypeRef, TypeRef};

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod model_tests;
