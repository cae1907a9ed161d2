//! Identity uniqueness check.
//!
//! Every declared type and member must map to a distinct identity key before
//! any pass runs; two declarations collapsing onto one key would make every
//! later decision keyed on identity ambiguous.

use crate::normalize::member_stable_id;
use rustc_hash::FxHashSet;
use tsb_common::{Diagnostic, diagnostic_codes};
use tsb_model::{MemberOrigin, MemberStableId, SymbolGraph, TypeStableId};

/// ERROR diagnostics for every duplicated type or declared-member identity.
pub fn check_identities(graph: &SymbolGraph) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut types: FxHashSet<&TypeStableId> = FxHashSet::default();

    for ty in graph.types() {
        if !types.insert(&ty.id) {
            diagnostics.push(Diagnostic::from_code(
                diagnostic_codes::DUPLICATE_IDENTITY,
                &ty.id,
                &[&ty.id.to_string()],
            ));
        }

        let mut members: FxHashSet<MemberStableId> = FxHashSet::default();
        for member in ty
            .members
            .iter()
            .filter(|m| m.origin == MemberOrigin::Declared)
        {
            let id = member_stable_id(&ty.id, member);
            if members.contains(&id) {
                diagnostics.push(Diagnostic::from_code(
                    diagnostic_codes::DUPLICATE_IDENTITY,
                    &ty.id,
                    &[&id.to_string()],
                ));
            } else {
                members.insert(id);
            }
        }
    }
    diagnostics
}

#[cfg(test)]
#[path = "tests/identity_tests.rs"]
mod identity_tests;
