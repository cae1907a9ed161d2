//! Member classification.
//!
//! Assigns the initial emit scope of every declared member:
//! - static members go to the static surface;
//! - explicit interface implementations are omitted (they are reachable only
//!   through the interface, which a later pass may turn into a view);
//! - static members of a generic type that mention the type's own generic
//!   parameters are omitted, since a static side has no type arguments.

use crate::pass::{PassOutput, ShapeOptions, ShapePass, map_types_with};
use tsb_common::{Diagnostic, diagnostic_codes};
use tsb_model::{EmitScope, MemberOrigin, MemberSymbol, OmitReason, SymbolGraph, TypeSymbol};

pub struct ClassifyPass;

impl ShapePass for ClassifyPass {
    fn name(&self) -> &'static str {
        "classify"
    }

    fn run(&self, graph: &SymbolGraph, options: &ShapeOptions) -> PassOutput {
        map_types_with(graph, options.parallel, classify_type)
    }
}

pub fn classify_type(ty: &TypeSymbol, diagnostics: &mut Vec<Diagnostic>) -> TypeSymbol {
    let mut out = ty.clone();
    out.members = ty
        .members
        .iter()
        .map(|member| classify_member(ty, member, diagnostics))
        .collect();
    out
}

fn classify_member(
    ty: &TypeSymbol,
    member: &MemberSymbol,
    diagnostics: &mut Vec<Diagnostic>,
) -> MemberSymbol {
    if member.origin != MemberOrigin::Declared || member.emit_scope == EmitScope::Omitted {
        return member.clone();
    }

    if member.is_explicit_implementation() {
        diagnostics.push(Diagnostic::from_code(
            diagnostic_codes::EXPLICIT_IMPLEMENTATION_OMITTED,
            &ty.id,
            &[&member.name],
        ));
        return member.clone().omitted(OmitReason::ExplicitImplementation);
    }

    if !member.is_static {
        let mut out = member.clone();
        out.emit_scope = EmitScope::ClassSurface;
        return out;
    }

    if !ty.generic_parameters.is_empty() && !member.type_level_params().is_empty() {
        diagnostics.push(Diagnostic::from_code(
            diagnostic_codes::GENERIC_STATIC_MEMBER_OMITTED,
            &ty.id,
            &[&member.name],
        ));
        return member.clone().omitted(OmitReason::GenericStaticMember);
    }

    let mut out = member.clone();
    out.emit_scope = EmitScope::StaticSurface;
    out
}

#[cfg(test)]
#[path = "tests/classify_tests.rs"]
mod classify_tests;
