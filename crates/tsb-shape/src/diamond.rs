//! Diamond / Conflict Resolution
//!
//! A type that inherits the same member name through several interfaces must
//! see one consistent shape for it, or the emitted `extends` / `implements`
//! list is rejected. For each type this pass decides, per interface, whether
//! it stays in the declared list or is *flattened*: removed from the list
//! with its members inlined onto the type.
//!
//! Decision order:
//! 1. Interfaces named in the flatten exception table are flattened.
//! 2. (interfaces only) An ancestor whose property disagrees with a property
//!    the interface declares itself is flattened.
//! 3. For each name reached through two or more retained interfaces with
//!    differing shape sets:
//!    - if the contributors are related (one reaches the other, or both
//!      inherit the name from a common declarer), or the name is a property,
//!      the contributor whose set covers all others is kept and the rest are
//!      flattened; without a covering contributor the first one is kept;
//!    - otherwise the union of shapes is added to the type as overloads.
//! 4. (interfaces only) Method shapes a retained ancestor requires but the
//!    interface narrows away are added back as overloads.
//! 5. Flattened interfaces are inlined. A member whose signature is already
//!    provided is skipped; one whose name a retained interface (or a
//!    property) already provides with a different shape is recorded as
//!    omitted.
//!
//! A reference that does not resolve, or whose arguments do not cover the
//! interface's parameter list, is opaque: it stays in the list and takes no
//! part in the comparison.
//!
//! The base class is never a contributor and never flattened: disagreements
//! between a class, its base and its interfaces belong to the covariance
//! partitioner.

use crate::closure::{ClosureScope, InterfaceSurface, SurfaceIndex, is_surface_member};
use crate::flatten_exceptions::{FlattenException, find_exception};
use crate::normalize::normalize;
use crate::pass::{PassOutput, ShapeOptions, ShapePass, adopt_member, map_types_with};
use crate::substitute::reference_covers;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use tsb_common::{Diagnostic, diagnostic_codes};
use tsb_model::{
    EmitScope, MemberOrigin, MemberSymbol, OmitReason, SymbolGraph, TypeRef, TypeStableId,
    TypeSymbol,
};

pub struct DiamondPass;

impl ShapePass for DiamondPass {
    fn name(&self) -> &'static str {
        "diamond"
    }

    fn run(&self, graph: &SymbolGraph, options: &ShapeOptions) -> PassOutput {
        let index = SurfaceIndex::new(graph);
        map_types_with(graph, options.parallel, |ty, diagnostics| {
            resolve_type(&index, ty, &options.flatten_exceptions, diagnostics)
        })
    }
}

// =============================================================================
// Per-type state
// =============================================================================

#[derive(Clone, Debug)]
enum FlattenCause {
    Exception,
    Conflict(String),
}

struct Contributor<'a> {
    reference: &'a TypeRef,
    id: TypeStableId,
    surface: InterfaceSurface,
    flatten: Option<FlattenCause>,
}

impl Contributor<'_> {
    fn retained(&self) -> bool {
        self.flatten.is_none()
    }

    fn is_related(&self, other: &Contributor<'_>, name: &str) -> bool {
        if self.surface.ancestors.contains(&other.id) || other.surface.ancestors.contains(&self.id) {
            return true;
        }
        let mine = self.surface.declarers_of(name);
        other
            .surface
            .declarers_of(name)
            .iter()
            .any(|declarer| mine.contains(declarer))
    }
}

/// Shapes already present on the type's own surface, per name.
#[derive(Default)]
struct OwnSurface {
    signatures: IndexMap<String, BTreeSet<String>>,
    property_names: FxHashSet<String>,
}

impl OwnSurface {
    fn of(ty: &TypeSymbol) -> Self {
        let mut own = Self::default();
        for member in ty.members.iter().filter(|m| is_surface_member(m)) {
            own.record(member);
        }
        own
    }

    fn record(&mut self, member: &MemberSymbol) {
        if member.is_property() {
            self.property_names.insert(member.name.clone());
        }
        self.signatures
            .entry(member.name.clone())
            .or_default()
            .insert(normalize(member));
    }

    fn has_name(&self, name: &str) -> bool {
        self.signatures.contains_key(name)
    }

    fn has_signature(&self, name: &str, signature: &str) -> bool {
        self.signatures
            .get(name)
            .is_some_and(|set| set.contains(signature))
    }

    fn is_property(&self, name: &str) -> bool {
        self.property_names.contains(name)
    }
}

// =============================================================================
// Resolution
// =============================================================================

pub fn resolve_type(
    index: &SurfaceIndex<'_>,
    ty: &TypeSymbol,
    exceptions: &[FlattenException],
    diagnostics: &mut Vec<Diagnostic>,
) -> TypeSymbol {
    let graph = index.graph();
    let mut contributors = Vec::with_capacity(ty.interfaces.len());
    let mut opaque: Vec<&TypeRef> = Vec::new();

    if let Some(base) = &ty.base_type
        && graph.resolve(base).is_none()
    {
        report_unresolved(ty, base, diagnostics);
    }
    for reference in &ty.interfaces {
        let (Some(definition), Some(id)) = (graph.resolve(reference), reference.stable_id()) else {
            report_unresolved(ty, reference, diagnostics);
            opaque.push(reference);
            continue;
        };
        if !reference_covers(reference, &definition.generic_parameters) {
            tracing::debug!(ty = %ty.id, reference = %reference, "uncovered reference kept opaque");
            opaque.push(reference);
            continue;
        }
        let surface = index.surface(reference, ClosureScope::Interfaces);
        if let Some(cycle) = surface.cycles.first() {
            diagnostics.push(Diagnostic::from_code(
                diagnostic_codes::ANCESTOR_CYCLE,
                &ty.id,
                &[&cycle.to_string()],
            ));
        }
        contributors.push(Contributor {
            reference,
            id,
            surface,
            flatten: None,
        });
    }

    let mut own = OwnSurface::of(ty);
    let mut added: Vec<MemberSymbol> = Vec::new();

    apply_exceptions(ty, exceptions, &mut contributors, diagnostics);
    if ty.is_interface() {
        flatten_property_conflicts(&own, &mut contributors);
    }
    let overload_names = flatten_related_conflicts(&mut contributors);
    add_diamond_overloads(ty, &overload_names, &contributors, &mut own, &mut added, diagnostics);
    if ty.is_interface() {
        restore_narrowed_overloads(ty, &contributors, &mut own, &mut added, diagnostics);
    }
    inline_flattened(ty, &contributors, &mut own, &mut added, diagnostics);

    if contributors.iter().all(Contributor::retained) && added.is_empty() {
        return ty.clone();
    }

    let mut out = ty.clone();
    out.interfaces = ty
        .interfaces
        .iter()
        .filter(|reference| {
            opaque.contains(reference)
                || contributors
                    .iter()
                    .any(|c| c.retained() && c.reference == *reference)
        })
        .cloned()
        .collect();
    out.flattened.extend(
        contributors
            .iter()
            .filter(|c| !c.retained())
            .map(|c| c.reference.clone()),
    );
    out.members.extend(added);
    tracing::debug!(
        ty = %ty.id,
        retained = out.interfaces.len(),
        flattened = out.flattened.len(),
        "diamond resolution"
    );
    out
}

fn report_unresolved(ty: &TypeSymbol, reference: &TypeRef, diagnostics: &mut Vec<Diagnostic>) {
    diagnostics.push(Diagnostic::from_code(
        diagnostic_codes::UNRESOLVED_ANCESTOR,
        &ty.id,
        &[&reference.to_string()],
    ));
}

fn apply_exceptions(
    ty: &TypeSymbol,
    exceptions: &[FlattenException],
    contributors: &mut [Contributor<'_>],
    diagnostics: &mut Vec<Diagnostic>,
) {
    for contributor in contributors.iter_mut() {
        let Some(entry) = find_exception(exceptions, ty, contributor.reference) else {
            continue;
        };
        diagnostics.push(Diagnostic::from_code(
            diagnostic_codes::FLATTEN_EXCEPTION_APPLIED,
            &ty.id,
            &[&contributor.reference.to_string(), &entry.reason],
        ));
        contributor.flatten = Some(FlattenCause::Exception);
    }
}

/// Interface-only: an ancestor disagreeing on a name where either side is a
/// property cannot be reconciled with overloads.
fn flatten_property_conflicts(own: &OwnSurface, contributors: &mut [Contributor<'_>]) {
    for contributor in contributors.iter_mut().filter(|c| c.retained()) {
        let conflict = contributor.surface.names().find(|name| {
            if !own.has_name(name) {
                return false;
            }
            let involves_property = own.is_property(name)
                || contributor.surface.properties.contains_key(*name);
            involves_property
                && contributor
                    .surface
                    .signatures_for(name)
                    .iter()
                    .any(|sig| !own.has_signature(name, sig))
        });
        if let Some(name) = conflict {
            contributor.flatten = Some(FlattenCause::Conflict(name.to_string()));
        }
    }
}

/// Flatten contributors in related conflicts; return names left for the
/// unrelated-overload rule.
fn flatten_related_conflicts(contributors: &mut [Contributor<'_>]) -> Vec<String> {
    let mut names: IndexSet<String> = IndexSet::new();
    for contributor in contributors.iter().filter(|c| c.retained()) {
        names.extend(contributor.surface.names().map(str::to_string));
    }

    let mut overload_names = Vec::new();
    for name in &names {
        let group: Vec<usize> = contributors
            .iter()
            .enumerate()
            .filter(|(_, c)| c.retained() && c.surface.contains_name(name))
            .map(|(i, _)| i)
            .collect();
        if group.len() < 2 {
            continue;
        }
        let sets: Vec<BTreeSet<&str>> = group
            .iter()
            .map(|&i| contributors[i].surface.signatures_for(name))
            .collect();
        if sets.windows(2).all(|pair| pair[0] == pair[1]) {
            continue;
        }

        let all_methods = group
            .iter()
            .all(|&i| !contributors[i].surface.properties.contains_key(name));
        let related = group.iter().enumerate().any(|(a, &i)| {
            group[a + 1..]
                .iter()
                .any(|&j| contributors[i].is_related(&contributors[j], name))
        });
        if all_methods && !related {
            overload_names.push(name.clone());
            continue;
        }

        let union: BTreeSet<&str> = sets.iter().flatten().copied().collect();
        let keep = sets.iter().position(|set| set.is_superset(&union)).unwrap_or(0);
        let to_flatten: Vec<usize> = group
            .iter()
            .zip(&sets)
            .filter(|(_, set)| **set != sets[keep])
            .map(|(&i, _)| i)
            .collect();
        for i in to_flatten {
            contributors[i].flatten = Some(FlattenCause::Conflict(name.clone()));
        }
    }
    overload_names
}

fn add_diamond_overloads(
    ty: &TypeSymbol,
    names: &[String],
    contributors: &[Contributor<'_>],
    own: &mut OwnSurface,
    added: &mut Vec<MemberSymbol>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for name in names {
        let group: Vec<&Contributor<'_>> = contributors
            .iter()
            .filter(|c| c.retained() && c.surface.contains_name(name))
            .collect();
        if group.len() < 2 {
            continue;
        }
        let mut count = 0usize;
        for contributor in group {
            for entry in contributor.surface.members_named(name) {
                if own.has_signature(name, &entry.signature) {
                    continue;
                }
                let overload = adopt_member(
                    &entry.member,
                    MemberOrigin::DiamondOverload,
                    &contributor.id,
                    EmitScope::ClassSurface,
                );
                own.record(&overload);
                added.push(overload);
                count += 1;
            }
        }
        if count > 0 {
            diagnostics.push(Diagnostic::from_code(
                diagnostic_codes::DIAMOND_OVERLOADS_ADDED,
                &ty.id,
                &[&count.to_string(), name],
            ));
        }
    }
}

/// Interface-only: keep every method shape a retained ancestor requires for a
/// name the interface redeclares.
fn restore_narrowed_overloads(
    ty: &TypeSymbol,
    contributors: &[Contributor<'_>],
    own: &mut OwnSurface,
    added: &mut Vec<MemberSymbol>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for contributor in contributors.iter().filter(|c| c.retained()) {
        for (name, entries) in &contributor.surface.methods {
            if !own.has_name(name) || own.is_property(name) {
                continue;
            }
            for entry in entries {
                if own.has_signature(name, &entry.signature) {
                    continue;
                }
                let overload = adopt_member(
                    &entry.member,
                    MemberOrigin::DiamondOverload,
                    &contributor.id,
                    EmitScope::ClassSurface,
                );
                own.record(&overload);
                added.push(overload);
                *counts.entry(name.clone()).or_default() += 1;
            }
        }
    }
    for (name, count) in counts {
        diagnostics.push(Diagnostic::from_code(
            diagnostic_codes::DIAMOND_OVERLOADS_ADDED,
            &ty.id,
            &[&count.to_string(), &name],
        ));
    }
}

fn inline_flattened(
    ty: &TypeSymbol,
    contributors: &[Contributor<'_>],
    own: &mut OwnSurface,
    added: &mut Vec<MemberSymbol>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let retained: Vec<&Contributor<'_>> = contributors.iter().filter(|c| c.retained()).collect();

    for contributor in contributors.iter().filter(|c| !c.retained()) {
        if let Some(FlattenCause::Conflict(name)) = &contributor.flatten {
            diagnostics.push(Diagnostic::from_code(
                diagnostic_codes::ANCESTOR_FLATTENED,
                &ty.id,
                &[&contributor.reference.to_string(), name],
            ));
        }

        for entry in contributor.surface.iter() {
            let name = entry.member.name.as_str();
            let provided = own.has_signature(name, &entry.signature)
                || retained
                    .iter()
                    .any(|r| r.surface.contains_signature(name, &entry.signature));
            if provided {
                continue;
            }

            // Methods may overload what the type already has; a retained
            // ancestor's name or a property cannot take another shape.
            let own_clash =
                own.has_name(name) && (own.is_property(name) || entry.member.is_property());
            if own_clash || retained.iter().any(|r| r.surface.contains_name(name)) {
                diagnostics.push(Diagnostic::from_code(
                    diagnostic_codes::DIAMOND_MEMBER_OMITTED,
                    &ty.id,
                    &[&entry.signature, &contributor.reference.to_string()],
                ));
                added.push(
                    adopt_member(
                        &entry.member,
                        MemberOrigin::Flattened,
                        &contributor.id,
                        EmitScope::ClassSurface,
                    )
                    .omitted(OmitReason::DiamondConflict {
                        ancestor: contributor.id.clr_full_name.clone(),
                    }),
                );
                continue;
            }

            let inlined = adopt_member(
                &entry.member,
                MemberOrigin::Flattened,
                &contributor.id,
                EmitScope::ClassSurface,
            );
            own.record(&inlined);
            added.push(inlined);
        }
    }
}

#[cfg(test)]
#[path = "tests/diamond_tests.rs"]
mod diamond_tests;
