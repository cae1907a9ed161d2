//! Surface deduplication.
//!
//! Earlier passes add members from several sources, and two of them can land
//! on the same normalized signature. Per surface (the main surface, and each
//! view separately) this pass keeps one member per signature, preferring
//! declared members, then indexer accessors, base overloads, diamond
//! overloads, synthesized and finally flattened members. Ties keep the
//! earlier member.
//!
//! Two *declared* members that normalize to the same signature cannot be
//! told apart by any later stage and are reported as an ERROR.
//!
//! Properties cannot overload: when several printed properties share a name
//! on one side of a surface, only the preferred one stays.

use crate::normalize::{member_stable_id, normalize};
use crate::pass::{PassOutput, ShapeOptions, ShapePass, map_types_with};
use indexmap::IndexMap;
use tsb_common::{Diagnostic, diagnostic_codes};
use tsb_model::{
    EmitScope, MemberOrigin, MemberSymbol, OmitReason, SymbolGraph, TypeStableId, TypeSymbol,
};

pub struct DedupPass;

impl ShapePass for DedupPass {
    fn name(&self) -> &'static str {
        "dedup"
    }

    fn run(&self, graph: &SymbolGraph, options: &ShapeOptions) -> PassOutput {
        map_types_with(graph, options.parallel, dedup_type)
    }
}

/// The surface a printed member belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum SurfaceKey {
    Main,
    View(Option<TypeStableId>),
}

fn surface_key(member: &MemberSymbol) -> SurfaceKey {
    match member.emit_scope {
        EmitScope::ViewOnly => SurfaceKey::View(member.source_ancestor.clone()),
        _ => SurfaceKey::Main,
    }
}

/// Position of the member to keep: lowest origin rank, then earliest.
fn preferred(members: &[MemberSymbol], group: &[usize]) -> usize {
    group
        .iter()
        .copied()
        .min_by_key(|&i| (members[i].origin.rank(), i))
        .unwrap_or(group[0])
}

pub fn dedup_type(ty: &TypeSymbol, diagnostics: &mut Vec<Diagnostic>) -> TypeSymbol {
    let mut out = ty.clone();
    omit_duplicate_signatures(&mut out, diagnostics);
    omit_property_overloads(&mut out, diagnostics);
    out
}

fn omit_duplicate_signatures(ty: &mut TypeSymbol, diagnostics: &mut Vec<Diagnostic>) {
    let mut groups: IndexMap<(SurfaceKey, String), Vec<usize>> = IndexMap::new();
    for (i, member) in ty.members.iter().enumerate() {
        if member.emit_scope.is_printed() {
            groups
                .entry((surface_key(member), normalize(member)))
                .or_default()
                .push(i);
        }
    }

    for ((_, signature), group) in groups {
        if group.len() < 2 {
            continue;
        }
        let keep = preferred(&ty.members, &group);
        let declared: Vec<usize> = group
            .iter()
            .copied()
            .filter(|&i| ty.members[i].origin == MemberOrigin::Declared)
            .collect();
        if let &[first, second, ..] = declared.as_slice() {
            diagnostics.push(Diagnostic::from_code(
                diagnostic_codes::DUPLICATE_OWN_SIGNATURE,
                &ty.id,
                &[
                    &member_stable_id(&ty.id, &ty.members[first]).to_string(),
                    &member_stable_id(&ty.id, &ty.members[second]).to_string(),
                ],
            ));
        }
        for i in group.into_iter().filter(|&i| i != keep) {
            diagnostics.push(Diagnostic::from_code(
                diagnostic_codes::DUPLICATE_SURFACE_SIGNATURE,
                &ty.id,
                &[&ty.members[i].name, &signature],
            ));
            ty.members[i] = ty.members[i].clone().omitted(OmitReason::DuplicateSignature {
                kept: signature.clone(),
            });
        }
    }
}

fn omit_property_overloads(ty: &mut TypeSymbol, diagnostics: &mut Vec<Diagnostic>) {
    let mut groups: IndexMap<(SurfaceKey, bool, String), Vec<usize>> = IndexMap::new();
    for (i, member) in ty.members.iter().enumerate() {
        if member.is_property() && member.emit_scope.is_printed() {
            groups
                .entry((surface_key(member), member.is_static, member.name.clone()))
                .or_default()
                .push(i);
        }
    }

    for ((_, _, name), group) in groups {
        if group.len() < 2 {
            continue;
        }
        let keep = preferred(&ty.members, &group);
        for i in group.into_iter().filter(|&i| i != keep) {
            diagnostics.push(Diagnostic::from_code(
                diagnostic_codes::PROPERTY_OVERLOAD_OMITTED,
                &ty.id,
                &[&name],
            ));
            ty.members[i] = ty.members[i].clone().omitted(OmitReason::PropertyOverload);
        }
    }
}

#[cfg(test)]
#[path = "tests/dedup_tests.rs"]
mod dedup_tests;
