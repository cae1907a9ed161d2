//! Type and member symbols.
//!
//! Symbols are plain owned data. Passes never mutate a symbol in place; they
//! clone what they change into the next graph snapshot.

use crate::identity::TypeStableId;
use crate::type_ref::{GenericOwner, TypeRef};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// =============================================================================
// Types
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
    /// A static class: only a static surface, never instantiated.
    StaticContainer,
}

impl TypeKind {
    /// Kinds that own an implementation and must satisfy their interfaces
    /// on their own surface.
    pub const fn is_concrete(self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::Struct)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Accessibility {
    #[default]
    Public,
    Protected,
    Internal,
    ProtectedInternal,
    PrivateProtected,
    Private,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TypeFlags: u8 {
        const STATIC = 1 << 0;
        const ABSTRACT = 1 << 1;
        const SEALED = 1 << 2;
    }
}

impl Default for TypeFlags {
    fn default() -> Self {
        TypeFlags::empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericParameter {
    pub name: String,
    pub position: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<TypeRef>,
}

impl GenericParameter {
    pub fn new(name: impl Into<String>, position: u32) -> Self {
        Self {
            name: name.into(),
            position,
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: TypeRef) -> Self {
        self.constraints.push(constraint);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeSymbol {
    pub id: TypeStableId,
    pub namespace: String,
    /// CLR simple name, including arity and nesting (`List`1`, `Outer+Inner`).
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub flags: TypeFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<GenericParameter>,
    #[serde(default)]
    pub members: Vec<MemberSymbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<TypeStableId>,
    /// Interfaces demoted to companion views, in demotion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<TypeRef>,
    /// Ancestors removed from the declared list by flattening, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flattened: Vec<TypeRef>,
}

/// Split a CLR full name into `(namespace, simple name)`.
///
/// The namespace ends at the last `.` before the first `+`, so nested names
/// keep their `Outer+Inner` form.
pub fn split_full_name(full_name: &str) -> (&str, &str) {
    let outer_end = full_name.find('+').unwrap_or(full_name.len());
    match full_name[..outer_end].rfind('.') {
        Some(dot) => (&full_name[..dot], &full_name[dot + 1..]),
        None => ("", full_name),
    }
}

impl TypeSymbol {
    pub fn new(kind: TypeKind, assembly: &str, full_name: &str) -> Self {
        let (namespace, name) = split_full_name(full_name);
        let declaring_type = full_name
            .rfind('+')
            .map(|plus| TypeStableId::new(assembly, &full_name[..plus]));
        Self {
            id: TypeStableId::new(assembly, full_name),
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind,
            accessibility: Accessibility::Public,
            flags: if kind == TypeKind::StaticContainer {
                TypeFlags::STATIC | TypeFlags::ABSTRACT | TypeFlags::SEALED
            } else {
                TypeFlags::empty()
            },
            base_type: None,
            interfaces: Vec::new(),
            generic_parameters: Vec::new(),
            members: Vec::new(),
            declaring_type,
            views: Vec::new(),
            flattened: Vec::new(),
        }
    }

    pub fn class(assembly: &str, full_name: &str) -> Self {
        Self::new(TypeKind::Class, assembly, full_name)
    }

    pub fn interface(assembly: &str, full_name: &str) -> Self {
        Self::new(TypeKind::Interface, assembly, full_name)
    }

    pub fn structure(assembly: &str, full_name: &str) -> Self {
        Self::new(TypeKind::Struct, assembly, full_name)
    }

    #[must_use]
    pub fn with_generic_params(mut self, names: &[&str]) -> Self {
        self.generic_parameters = names
            .iter()
            .enumerate()
            .map(|(i, name)| GenericParameter::new(*name, i as u32))
            .collect();
        self
    }

    #[must_use]
    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base_type = Some(base);
        self
    }

    #[must_use]
    pub fn with_interface(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: MemberSymbol) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn full_name(&self) -> &str {
        &self.id.clr_full_name
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Reference to this type closed over its own generic parameters.
    pub fn self_ref(&self) -> TypeRef {
        let args = self
            .generic_parameters
            .iter()
            .map(|p| TypeRef::type_param(p.name.clone(), p.position))
            .collect();
        TypeRef::generic(self.id.assembly.clone(), self.id.clr_full_name.clone(), args)
    }

    /// Declared ancestors in declaration order: base first, then interfaces.
    pub fn declared_ancestors(&self) -> impl Iterator<Item = &TypeRef> {
        self.base_type.iter().chain(self.interfaces.iter())
    }

    pub fn generic_param_names(&self) -> impl Iterator<Item = &str> {
        self.generic_parameters.iter().map(|p| p.name.as_str())
    }
}

// =============================================================================
// Members
// =============================================================================

/// Where (and whether) a member is printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmitScope {
    /// Declared directly on the type's instance surface.
    #[default]
    ClassSurface,
    StaticSurface,
    /// Declared only on the companion view of `source_ancestor`.
    ViewOnly,
    /// Tracked for metadata, never printed.
    Omitted,
}

impl EmitScope {
    pub const fn is_printed(self) -> bool {
        !matches!(self, EmitScope::Omitted)
    }

    /// Class and static surfaces together form the type's main surface.
    pub const fn is_main_surface(self) -> bool {
        matches!(self, EmitScope::ClassSurface | EmitScope::StaticSurface)
    }
}

/// How a member came to be on its type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberOrigin {
    #[default]
    Declared,
    /// Filled in for an interface requirement missing from the surface.
    Synthesized,
    /// Inlined from a flattened ancestor.
    Flattened,
    /// A base-class overload re-declared so the overload set stays compatible.
    BaseOverload,
    /// One shape of a name that unrelated ancestors disagree on.
    DiamondOverload,
    /// Accessor method replacing an overloaded indexer.
    IndexerAccessor,
}

impl MemberOrigin {
    /// Keep-priority when two members collapse to one signature; lower wins.
    pub const fn rank(self) -> u8 {
        match self {
            MemberOrigin::Declared => 0,
            MemberOrigin::IndexerAccessor => 1,
            MemberOrigin::BaseOverload => 2,
            MemberOrigin::DiamondOverload => 3,
            MemberOrigin::Synthesized => 4,
            MemberOrigin::Flattened => 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum OmitReason {
    ExplicitImplementation,
    GenericStaticMember,
    IndexerOverload,
    DiamondConflict { ancestor: String },
    CovariantOverride { base_signature: String },
    DuplicateSignature { kept: String },
    PropertyOverload,
    IncompleteSubstitution { parameters: Vec<String> },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterMode {
    #[default]
    Value,
    In,
    Out,
    Ref,
    Params,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub mode: ParameterMode,
    #[serde(default)]
    pub is_optional: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            mode: ParameterMode::Value,
            is_optional: false,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ParameterMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }
}

pub type ParameterList = SmallVec<[Parameter; 4]>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Accessors {
    #[default]
    Get,
    Set,
    GetSet,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodShape {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<GenericParameter>,
    #[serde(default)]
    pub parameters: ParameterList,
    pub return_type: TypeRef,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyShape {
    pub property_type: TypeRef,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub index_parameters: ParameterList,
    #[serde(default)]
    pub accessors: Accessors,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldShape {
    pub field_type: TypeRef,
    #[serde(default)]
    pub is_readonly: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventShape {
    pub handler_type: TypeRef,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstructorShape {
    #[serde(default)]
    pub parameters: ParameterList,
}

/// Variant data for the five member kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "camelCase")]
pub enum MemberKind {
    Method(MethodShape),
    Property(PropertyShape),
    Field(FieldShape),
    Event(EventShape),
    Constructor(ConstructorShape),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberSymbol {
    /// CLR-facing name.
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub emit_scope: EmitScope,
    #[serde(default)]
    pub origin: MemberOrigin,
    /// Ancestor this member was synthesized or inlined from. Key data only,
    /// resolved through the graph index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ancestor: Option<TypeStableId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_token: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omit_reason: Option<OmitReason>,
    pub kind: MemberKind,
}

impl MemberSymbol {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            emit_scope: EmitScope::ClassSurface,
            origin: MemberOrigin::Declared,
            source_ancestor: None,
            metadata_token: None,
            omit_reason: None,
            kind,
        }
    }

    pub fn method(name: impl Into<String>, parameters: Vec<Parameter>, return_type: TypeRef) -> Self {
        Self::new(
            name,
            MemberKind::Method(MethodShape {
                generic_parameters: Vec::new(),
                parameters: parameters.into_iter().collect(),
                return_type,
            }),
        )
    }

    pub fn property(name: impl Into<String>, property_type: TypeRef, accessors: Accessors) -> Self {
        Self::new(
            name,
            MemberKind::Property(PropertyShape {
                property_type,
                index_parameters: ParameterList::new(),
                accessors,
            }),
        )
    }

    pub fn indexer(
        name: impl Into<String>,
        index_parameters: Vec<Parameter>,
        property_type: TypeRef,
        accessors: Accessors,
    ) -> Self {
        Self::new(
            name,
            MemberKind::Property(PropertyShape {
                property_type,
                index_parameters: index_parameters.into_iter().collect(),
                accessors,
            }),
        )
    }

    pub fn field(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self::new(
            name,
            MemberKind::Field(FieldShape {
                field_type,
                is_readonly: false,
            }),
        )
    }

    pub fn event(name: impl Into<String>, handler_type: TypeRef) -> Self {
        Self::new(name, MemberKind::Event(EventShape { handler_type }))
    }

    pub fn constructor(parameters: Vec<Parameter>) -> Self {
        Self::new(
            ".ctor",
            MemberKind::Constructor(ConstructorShape {
                parameters: parameters.into_iter().collect(),
            }),
        )
    }

    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: u32) -> Self {
        self.metadata_token = Some(token);
        self
    }

    /// Declare method-level generic parameters. No-op on other kinds.
    #[must_use]
    pub fn with_method_generics(mut self, names: &[&str]) -> Self {
        if let MemberKind::Method(shape) = &mut self.kind {
            shape.generic_parameters = names
                .iter()
                .enumerate()
                .map(|(i, name)| GenericParameter::new(*name, i as u32))
                .collect();
        }
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: MemberOrigin, source: Option<TypeStableId>) -> Self {
        self.origin = origin;
        self.source_ancestor = source;
        self
    }

    /// Mark omitted, keeping the first recorded reason.
    #[must_use]
    pub fn omitted(mut self, reason: OmitReason) -> Self {
        self.emit_scope = EmitScope::Omitted;
        if self.omit_reason.is_none() {
            self.omit_reason = Some(reason);
        }
        self
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method(_))
    }

    pub fn is_property(&self) -> bool {
        matches!(self.kind, MemberKind::Property(_))
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, MemberKind::Constructor(_))
    }

    pub fn is_indexer(&self) -> bool {
        matches!(&self.kind, MemberKind::Property(p) if !p.index_parameters.is_empty())
    }

    /// Explicit interface implementations carry a qualified CLR name
    /// (`System.IDisposable.Dispose`).
    pub fn is_explicit_implementation(&self) -> bool {
        !self.is_constructor() && self.name.contains('.')
    }

    /// Method-level generic parameter names; empty for other kinds.
    pub fn own_generic_params(&self) -> &[GenericParameter] {
        match &self.kind {
            MemberKind::Method(shape) => &shape.generic_parameters,
            _ => &[],
        }
    }

    /// Every type reference in the member's signature.
    pub fn signature_types(&self) -> Vec<&TypeRef> {
        match &self.kind {
            MemberKind::Method(shape) => shape
                .parameters
                .iter()
                .map(|p| &p.ty)
                .chain(std::iter::once(&shape.return_type))
                .collect(),
            MemberKind::Property(shape) => shape
                .index_parameters
                .iter()
                .map(|p| &p.ty)
                .chain(std::iter::once(&shape.property_type))
                .collect(),
            MemberKind::Field(shape) => vec![&shape.field_type],
            MemberKind::Event(shape) => vec![&shape.handler_type],
            MemberKind::Constructor(shape) => shape.parameters.iter().map(|p| &p.ty).collect(),
        }
    }

    /// Names of type-level generic parameters the signature mentions.
    pub fn type_level_params(&self) -> Vec<String> {
        let mut names = Vec::new();
        for ty in self.signature_types() {
            ty.for_each_generic_param(&mut |param| {
                if param.owner == GenericOwner::Type && !names.contains(&param.name) {
                    names.push(param.name.clone());
                }
            });
        }
        names
    }
}
