//! Post-naming validation gate.
//!
//! Runs after reservation over the final graph and the filled ledger. Every
//! check is a read: types are checked on the rayon pool and their findings
//! concatenated in traversal order, so the report does not depend on
//! scheduling. Any finding is an ERROR that blocks planning and emission.

use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tsb_common::{Diagnostic, diagnostic_codes};
use tsb_model::{
    EmitScope, MemberStableId, NameScope, StableId, SymbolGraph, TypeStableId, TypeSymbol,
};
use tsb_names::{NameLedger, member_scope};
use tsb_shape::{member_stable_id, normalize};

/// Check `graph` against `ledger`.
pub fn validate(graph: &SymbolGraph, ledger: &NameLedger, parallel: bool) -> Vec<Diagnostic> {
    let _span = tracing::debug_span!("validate").entered();

    let check = |ty: &TypeSymbol| check_type(ty, ledger);
    let per_type: Vec<Vec<Diagnostic>> = if parallel {
        let types: Vec<&TypeSymbol> = graph.types().collect();
        types.into_par_iter().map(check).collect()
    } else {
        graph.types().map(check).collect()
    };

    let mut diagnostics: Vec<Diagnostic> = per_type.into_iter().flatten().collect();
    diagnostics.extend(check_scope_uniqueness(ledger));
    tracing::debug!(findings = diagnostics.len(), "validation finished");
    diagnostics
}

fn missing_name(id: &StableId, scope: &NameScope) -> Diagnostic {
    Diagnostic::from_code(
        diagnostic_codes::MISSING_FINAL_NAME,
        id,
        &[&id.to_string(), &scope.to_string()],
    )
}

fn check_type(ty: &TypeSymbol, ledger: &NameLedger) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let type_id = StableId::from(ty.id.clone());
    let namespace = NameScope::namespace(&ty.namespace);
    if !ledger.is_reserved(&type_id, &namespace, false) {
        diagnostics.push(missing_name(&type_id, &namespace));
    }

    let views: Vec<TypeStableId> = ty.views.iter().filter_map(|v| v.stable_id()).collect();
    let mut main_signatures = FxHashSet::default();

    for member in &ty.members {
        if member.emit_scope == EmitScope::ViewOnly {
            let declared = member
                .source_ancestor
                .as_ref()
                .is_some_and(|ancestor| views.contains(ancestor));
            if !declared {
                let id = member_stable_id(&ty.id, member);
                let ancestor = member
                    .source_ancestor
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                diagnostics.push(Diagnostic::from_code(
                    diagnostic_codes::VIEW_MEMBER_WITHOUT_VIEW,
                    &id,
                    &[&id.to_string(), &ancestor],
                ));
                continue;
            }
        }

        if member.emit_scope.is_main_surface() {
            let signature = normalize(member);
            if !main_signatures.insert(signature.clone()) {
                diagnostics.push(Diagnostic::from_code(
                    diagnostic_codes::DUPLICATE_CLASS_SURFACE_SIGNATURE,
                    &ty.id,
                    &[&signature],
                ));
            }
        }

        let Some(scope) = member_scope(&ty.id, member) else {
            continue;
        };
        let id = StableId::from(member_stable_id(&ty.id, member));
        if !ledger.is_reserved(&id, &scope, scope.is_static()) {
            diagnostics.push(missing_name(&id, &scope));
        }
    }

    let instance = NameScope::instance(&ty.id);
    for ancestor in &views {
        let id = StableId::from(MemberStableId::view(&ty.id, ancestor));
        if !ledger.is_reserved(&id, &instance, false) {
            diagnostics.push(missing_name(&id, &instance));
        }
    }

    diagnostics
}

/// Two identities sharing a final name in one scope must be members of one
/// overload family.
fn check_scope_uniqueness(ledger: &NameLedger) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for scope in ledger.scopes() {
        let mut holders: IndexMap<&str, Vec<&StableId>> = IndexMap::new();
        for (id, entry) in ledger.entries(scope) {
            holders.entry(entry.final_name.as_str()).or_default().push(id);
        }
        for (final_name, ids) in holders {
            if ids.len() > 1 && !is_one_family(&ids) {
                diagnostics.push(Diagnostic::from_code(
                    diagnostic_codes::DUPLICATE_FINAL_NAME,
                    ids[1],
                    &[final_name, &scope.to_string()],
                ));
            }
        }
    }
    diagnostics
}

fn overload_family(id: &StableId) -> Option<(&str, &str)> {
    id.as_member()
        .filter(|member| !member.is_view())
        .map(|member| (member.declaring_type.as_str(), member.member_name.as_str()))
}

fn is_one_family(ids: &[&StableId]) -> bool {
    match overload_family(ids[0]) {
        Some(first) => ids[1..].iter().all(|id| overload_family(id) == Some(first)),
        None => false,
    }
}

#[cfg(test)]
#[path = "tests/validate_tests.rs"]
mod validate_tests;
