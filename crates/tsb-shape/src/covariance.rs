//! Covariance Conflict Partitioning
//!
//! A concrete type may expose a shape its ancestors cannot accept on one
//! surface:
//!
//! - **Base conflicts.** A declaration that keeps a base member's parameter
//!   list but changes its return type (a covariant override) is suppressed;
//!   the base shape is inherited instead. When the type redeclares a name
//!   with a different parameter list, the base shapes it lacks are re-added
//!   as overloads so the overload set stays assignable to the base's.
//! - **Interface conflicts.** An interface requiring a name the concrete
//!   surface already provides with an incompatible shape is removed from the
//!   implemented list and demoted to a view: its whole surface is re-emitted
//!   as view-only members reached through an accessor on the type. When the
//!   reference's arguments do not cover the interface's parameter list, the
//!   view's members are recorded as omitted instead.
//!
//! Interfaces and other non-concrete kinds pass through unchanged.

use crate::closure::{ClosureScope, InterfaceSurface, SurfaceIndex, is_surface_member};
use crate::normalize::{normalize, normalize_parameters};
use crate::pass::{PassOutput, ShapeOptions, ShapePass, adopt_member, map_types_with};
use crate::substitute::reference_covers;
use rustc_hash::{FxHashMap, FxHashSet};
use tsb_common::{Diagnostic, diagnostic_codes};
use tsb_model::{
    EmitScope, MemberOrigin, MemberSymbol, OmitReason, SymbolGraph, TypeRef, TypeStableId,
    TypeSymbol,
};

pub struct CovariancePass;

impl ShapePass for CovariancePass {
    fn name(&self) -> &'static str {
        "covariance"
    }

    fn run(&self, graph: &SymbolGraph, options: &ShapeOptions) -> PassOutput {
        let index = SurfaceIndex::new(graph);
        map_types_with(graph, options.parallel, |ty, diagnostics| {
            partition_type(&index, ty, diagnostics)
        })
    }
}

pub fn partition_type(
    index: &SurfaceIndex<'_>,
    ty: &TypeSymbol,
    diagnostics: &mut Vec<Diagnostic>,
) -> TypeSymbol {
    if !ty.kind.is_concrete() {
        return ty.clone();
    }
    let mut out = ty.clone();
    let base_surface = match &ty.base_type {
        Some(base) => index.surface(base, ClosureScope::Full),
        None => InterfaceSurface::default(),
    };
    if let Some(base_id) = ty.base_type.as_ref().and_then(TypeRef::stable_id) {
        reconcile_base(&mut out, &base_id, &base_surface, diagnostics);
    }
    demote_conflicting_interfaces(index, &mut out, &base_surface, diagnostics);
    out
}

// =============================================================================
// Base conflicts
// =============================================================================

fn reconcile_base(
    ty: &mut TypeSymbol,
    base_id: &TypeStableId,
    base: &InterfaceSurface,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut suppressed: FxHashMap<usize, String> = FxHashMap::default();
    let mut overloads: Vec<MemberSymbol> = Vec::new();

    for name in base.names() {
        let own: Vec<usize> = ty
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| m.name == name && is_surface_member(m))
            .map(|(i, _)| i)
            .collect();
        if own.is_empty() {
            continue;
        }
        let own_signatures: Vec<String> = own.iter().map(|&i| normalize(&ty.members[i])).collect();

        for entry in base.members_named(name) {
            if own_signatures.contains(&entry.signature) {
                continue;
            }
            let targets: Vec<usize> = if entry.member.is_method() {
                let params = normalize_parameters(&entry.member);
                own.iter()
                    .copied()
                    .filter(|&i| {
                        let member = &ty.members[i];
                        !member.is_method() || normalize_parameters(member) == params
                    })
                    .collect()
            } else {
                own.clone()
            };
            for i in targets {
                suppressed
                    .entry(i)
                    .or_insert_with(|| entry.signature.clone());
            }
        }

        // Whatever the type still declares for the name must carry every
        // base method shape.
        let remaining: FxHashSet<&str> = own
            .iter()
            .zip(&own_signatures)
            .filter(|(i, _)| !suppressed.contains_key(*i))
            .map(|(_, signature)| signature.as_str())
            .collect();
        if remaining.is_empty() {
            continue;
        }
        for entry in base.methods.get(name).into_iter().flatten() {
            let already = remaining.contains(entry.signature.as_str())
                || overloads.iter().any(|m| normalize(m) == entry.signature);
            if already {
                continue;
            }
            diagnostics.push(Diagnostic::from_code(
                diagnostic_codes::BASE_OVERLOAD_ADDED,
                &ty.id,
                &[&entry.signature, &base_id.to_string()],
            ));
            overloads.push(adopt_member(
                &entry.member,
                MemberOrigin::BaseOverload,
                base_id,
                EmitScope::ClassSurface,
            ));
        }
    }

    let mut positions: Vec<usize> = suppressed.keys().copied().collect();
    positions.sort_unstable();
    for i in positions {
        let Some(base_signature) = suppressed.remove(&i) else {
            continue;
        };
        let declared = normalize(&ty.members[i]);
        tracing::debug!(ty = %ty.id, %declared, %base_signature, "covariant override suppressed");
        diagnostics.push(Diagnostic::from_code(
            diagnostic_codes::COVARIANT_OVERRIDE_SUPPRESSED,
            &ty.id,
            &[&declared, &base_signature],
        ));
        ty.members[i] = ty.members[i]
            .clone()
            .omitted(OmitReason::CovariantOverride { base_signature });
    }
    ty.members.extend(overloads);
}

// =============================================================================
// Interface conflicts
// =============================================================================

/// Signatures per name on the type's main instance surface, own and
/// inherited.
fn concrete_signatures(
    ty: &TypeSymbol,
    base: &InterfaceSurface,
) -> FxHashMap<String, FxHashSet<String>> {
    let mut signatures: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
    for member in ty.members.iter().filter(|m| is_surface_member(m)) {
        signatures
            .entry(member.name.clone())
            .or_default()
            .insert(normalize(member));
    }
    for entry in base.iter() {
        signatures
            .entry(entry.member.name.clone())
            .or_default()
            .insert(entry.signature.clone());
    }
    signatures
}

fn demote_conflicting_interfaces(
    index: &SurfaceIndex<'_>,
    ty: &mut TypeSymbol,
    base: &InterfaceSurface,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let concrete = concrete_signatures(ty, base);
    let mut retained = Vec::with_capacity(ty.interfaces.len());
    let mut view_members = Vec::new();

    for reference in std::mem::take(&mut ty.interfaces) {
        let (Some(definition), Some(id)) = (index.graph().resolve(&reference), reference.stable_id())
        else {
            retained.push(reference);
            continue;
        };
        let surface = index.surface(&reference, ClosureScope::Interfaces);
        let conflict = surface.iter().find(|entry| {
            concrete
                .get(&entry.member.name)
                .is_some_and(|set| !set.contains(&entry.signature))
        });
        let Some(conflict) = conflict else {
            retained.push(reference);
            continue;
        };

        diagnostics.push(Diagnostic::from_code(
            diagnostic_codes::INTERFACE_DEMOTED_TO_VIEW,
            &ty.id,
            &[&reference.to_string(), &conflict.signature],
        ));
        tracing::debug!(ty = %ty.id, view = %reference, "interface demoted to view");
        let unbound: Vec<String> = if reference_covers(&reference, &definition.generic_parameters) {
            Vec::new()
        } else {
            definition.generic_param_names().map(str::to_string).collect()
        };
        for entry in surface.iter() {
            let member = adopt_member(
                &entry.member,
                MemberOrigin::Synthesized,
                &id,
                EmitScope::ViewOnly,
            );
            if unbound.is_empty() {
                view_members.push(member);
                continue;
            }
            diagnostics.push(Diagnostic::from_code(
                diagnostic_codes::INCOMPLETE_SUBSTITUTION,
                &ty.id,
                &[&entry.signature, &reference.to_string(), &unbound.join(", ")],
            ));
            view_members.push(member.omitted(OmitReason::IncompleteSubstitution {
                parameters: unbound.clone(),
            }));
        }
        if !ty.views.contains(&reference) {
            ty.views.push(reference);
        }
    }

    ty.interfaces = retained;
    ty.members.extend(view_members);
}

#[cfg(test)]
#[path = "tests/covariance_tests.rs"]
mod covariance_tests;
