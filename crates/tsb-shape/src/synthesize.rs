//! Structural Synthesis
//!
//! Fills in interface members a concrete type never declares. For each
//! retained interface, every member whose name is absent from the type's
//! main surface (own declarations plus everything inherited from the base
//! chain) is substituted into the interface reference's arguments and added
//! to the class surface.
//!
//! Names that are present with a different shape are left alone: those are
//! conflicts the partitioner has already turned into views. A member whose
//! substituted signature still mentions a generic parameter the type does
//! not declare is recorded as omitted instead, and so is every member reached
//! through a reference whose arguments do not cover the interface's
//! parameter list.

use crate::closure::{ClosureScope, SurfaceIndex, is_surface_member};
use crate::pass::{PassOutput, ShapeOptions, ShapePass, adopt_member, map_types_with};
use crate::substitute::{out_of_scope_params, reference_covers};
use rustc_hash::FxHashSet;
use tsb_common::{Diagnostic, diagnostic_codes};
use tsb_model::{EmitScope, MemberOrigin, OmitReason, SymbolGraph, TypeSymbol};

pub struct SynthesizePass;

impl ShapePass for SynthesizePass {
    fn name(&self) -> &'static str {
        "synthesize"
    }

    fn run(&self, graph: &SymbolGraph, options: &ShapeOptions) -> PassOutput {
        let index = SurfaceIndex::new(graph);
        map_types_with(graph, options.parallel, |ty, diagnostics| {
            synthesize_type(&index, ty, diagnostics)
        })
    }
}

pub fn synthesize_type(
    index: &SurfaceIndex<'_>,
    ty: &TypeSymbol,
    diagnostics: &mut Vec<Diagnostic>,
) -> TypeSymbol {
    if !ty.kind.is_concrete() || ty.interfaces.is_empty() {
        return ty.clone();
    }

    let mut present: FxHashSet<String> = ty
        .members
        .iter()
        .filter(|m| is_surface_member(m))
        .map(|m| m.name.clone())
        .collect();
    if let Some(base) = &ty.base_type {
        present.extend(
            index
                .surface(base, ClosureScope::Full)
                .names()
                .map(str::to_string),
        );
    }

    let in_scope: Vec<&str> = ty.generic_param_names().collect();
    let mut synthesized_signatures: FxHashSet<String> = FxHashSet::default();
    let mut added = Vec::new();

    for reference in &ty.interfaces {
        let Some(source) = reference.stable_id() else {
            continue;
        };
        // Parameters the reference leaves unbound, for raw or wrongly-sized
        // references.
        let unbound: Vec<String> = match index.graph().resolve(reference) {
            Some(definition) if !reference_covers(reference, &definition.generic_parameters) => {
                definition.generic_param_names().map(str::to_string).collect()
            }
            _ => Vec::new(),
        };
        let surface = index.surface(reference, ClosureScope::Interfaces);
        for entry in surface.iter() {
            if present.contains(&entry.member.name)
                || !synthesized_signatures.insert(entry.signature.clone())
            {
                continue;
            }
            let member = adopt_member(
                &entry.member,
                MemberOrigin::Synthesized,
                &source,
                EmitScope::ClassSurface,
            );
            let missing = if unbound.is_empty() {
                out_of_scope_params(&member, in_scope.iter().copied())
            } else {
                unbound.clone()
            };
            if missing.is_empty() {
                added.push(member);
                continue;
            }
            diagnostics.push(Diagnostic::from_code(
                diagnostic_codes::INCOMPLETE_SUBSTITUTION,
                &ty.id,
                &[&entry.signature, &reference.to_string(), &missing.join(", ")],
            ));
            added.push(member.omitted(OmitReason::IncompleteSubstitution {
                parameters: missing,
            }));
        }
    }

    if added.is_empty() {
        return ty.clone();
    }
    tracing::debug!(ty = %ty.id, count = added.len(), "interface members synthesized");
    let mut out = ty.clone();
    out.members.extend(added);
    out
}

#[cfg(test)]
#[path = "tests/synthesize_tests.rs"]
mod synthesize_tests;
