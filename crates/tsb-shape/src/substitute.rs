//! Generic Substitution
//!
//! Maps a generic definition's parameters to the arguments of a closed
//! reference and rewrites type references through that map.
//!
//! A method's own generic parameters are never substituted, even when they
//! share a name with a parameter of the enclosing type: the member-level
//! helpers filter the map by the method's parameter names first.

use rustc_hash::{FxHashMap, FxHashSet};
use tsb_model::{
    GenericParameter, MemberKind, MemberSymbol, NamedTypeRef, NestedTypeRef, Parameter, TypeRef,
};

/// Parameter name → replacement type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubstitutionMap {
    entries: FxHashMap<String, TypeRef>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `open_params` with the arguments of `closed` by position.
    ///
    /// On an arity mismatch the map is empty: callers must read "map does not
    /// cover the parameter list" as cannot-reconcile rather than use a
    /// truncated pairing.
    pub fn build(closed: &TypeRef, open_params: &[GenericParameter]) -> Self {
        let args = closed.type_args();
        if args.len() != open_params.len() {
            tracing::trace!(
                reference = %closed,
                args = args.len(),
                params = open_params.len(),
                "arity mismatch, no substitution"
            );
            return Self::new();
        }
        let mut ordered: Vec<&GenericParameter> = open_params.iter().collect();
        ordered.sort_by_key(|p| p.position);
        let entries = ordered
            .into_iter()
            .zip(args)
            .map(|(param, arg)| (param.name.clone(), arg.clone()))
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, name: impl Into<String>, replacement: TypeRef) {
        self.entries.insert(name.into(), replacement);
    }

    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether every parameter in `params` has a replacement.
    pub fn covers(&self, params: &[GenericParameter]) -> bool {
        params.iter().all(|p| self.entries.contains_key(&p.name))
    }

    /// Whether substituting would leave every reference unchanged.
    pub fn is_identity(&self) -> bool {
        self.entries.iter().all(|(name, ty)| {
            matches!(ty, TypeRef::GenericParameter(param) if &param.name == name)
        })
    }

    /// Copy of the map without `names` (shadowed parameters).
    #[must_use]
    pub fn without<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        let shadowed: FxHashSet<&str> = names.into_iter().collect();
        if shadowed.is_empty() {
            return self.clone();
        }
        let entries = self
            .entries
            .iter()
            .filter(|(name, _)| !shadowed.contains(name.as_str()))
            .map(|(name, ty)| (name.clone(), ty.clone()))
            .collect();
        Self { entries }
    }
}

/// Whether the arguments of `reference` pair with every parameter in
/// `params`. A raw or wrongly-sized reference cannot be reconciled with its
/// definition.
pub fn reference_covers(reference: &TypeRef, params: &[GenericParameter]) -> bool {
    SubstitutionMap::build(reference, params).covers(params)
}

/// Rewrite every generic parameter reference named in `map`.
pub fn substitute(ty: &TypeRef, map: &SubstitutionMap) -> TypeRef {
    if map.is_empty() {
        return ty.clone();
    }
    match ty {
        TypeRef::GenericParameter(param) => match map.get(&param.name) {
            Some(replacement) => replacement.clone(),
            None => ty.clone(),
        },
        TypeRef::Named(named) => TypeRef::Named(NamedTypeRef {
            assembly: named.assembly.clone(),
            full_name: named.full_name.clone(),
            type_args: substitute_all(&named.type_args, map),
        }),
        TypeRef::Nested(nested) => TypeRef::Nested(NestedTypeRef {
            assembly: nested.assembly.clone(),
            declaring: Box::new(substitute(&nested.declaring, map)),
            name: nested.name.clone(),
            full_name: nested.full_name.clone(),
            type_args: substitute_all(&nested.type_args, map),
        }),
        TypeRef::Array { element, rank } => TypeRef::Array {
            element: Box::new(substitute(element, map)),
            rank: *rank,
        },
        TypeRef::Pointer { pointee } => TypeRef::Pointer {
            pointee: Box::new(substitute(pointee, map)),
        },
        TypeRef::ByRef { referent } => TypeRef::ByRef {
            referent: Box::new(substitute(referent, map)),
        },
    }
}

fn substitute_all(types: &[TypeRef], map: &SubstitutionMap) -> Vec<TypeRef> {
    types.iter().map(|ty| substitute(ty, map)).collect()
}

fn substitute_parameter(param: &Parameter, map: &SubstitutionMap) -> Parameter {
    Parameter {
        ty: substitute(&param.ty, map),
        ..param.clone()
    }
}

/// Substitute a member's signature, leaving its own generic parameters alone.
pub fn substitute_member(member: &MemberSymbol, map: &SubstitutionMap) -> MemberSymbol {
    if map.is_empty() {
        return member.clone();
    }
    let map = map.without(member.own_generic_params().iter().map(|p| p.name.as_str()));
    let mut out = member.clone();
    match &mut out.kind {
        MemberKind::Method(shape) => {
            for param in shape.parameters.iter_mut() {
                *param = substitute_parameter(param, &map);
            }
            shape.return_type = substitute(&shape.return_type, &map);
            for generic in &mut shape.generic_parameters {
                generic.constraints = substitute_all(&generic.constraints, &map);
            }
        }
        MemberKind::Property(shape) => {
            for param in shape.index_parameters.iter_mut() {
                *param = substitute_parameter(param, &map);
            }
            shape.property_type = substitute(&shape.property_type, &map);
        }
        MemberKind::Field(shape) => {
            shape.field_type = substitute(&shape.field_type, &map);
        }
        MemberKind::Event(shape) => {
            shape.handler_type = substitute(&shape.handler_type, &map);
        }
        MemberKind::Constructor(shape) => {
            for param in shape.parameters.iter_mut() {
                *param = substitute_parameter(param, &map);
            }
        }
    }
    out
}

/// Generic parameter names in the member's signature that are neither in
/// `in_scope` nor declared by the member itself. Sorted, deduplicated.
pub fn out_of_scope_params<'a>(
    member: &MemberSymbol,
    in_scope: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut allowed: FxHashSet<&str> = in_scope.into_iter().collect();
    allowed.extend(member.own_generic_params().iter().map(|p| p.name.as_str()));

    let mut missing = Vec::new();
    for ty in member.signature_types() {
        ty.for_each_generic_param(&mut |param| {
            if !allowed.contains(param.name.as_str()) {
                missing.push(param.name.clone());
            }
        });
    }
    missing.sort();
    missing.dedup();
    missing
}

#[cfg(test)]
#[path = "tests/substitute_tests.rs"]
mod substitute_tests;
