//! Reservation pass: names every printed declaration through the ledger.
//!
//! This is the only place the ledger is written. The walk follows the graph's
//! fixed order (namespaces by name, types by CLR full name, members in
//! declaration order), so the first-come collision policy yields the same
//! names on every run.
//!
//! Per type:
//! 1. the type name, in its namespace scope;
//! 2. every printed member, in the instance, static or view scope its emit
//!    scope selects (methods and constructors through their overload family);
//! 3. one accessor per view, in the instance scope, after the members so that
//!    declared names win.

use crate::ledger::{NameError, NameLedger};
use crate::policy::{MemberNaming, type_name, view_accessor_name};
use tsb_common::Diagnostic;
use tsb_model::{
    EmitScope, MemberStableId, MemberSymbol, NameScope, SymbolGraph, TypeStableId, TypeSymbol,
};
use tsb_shape::member_stable_id;

/// Requested name of every constructor; constructors form one family.
pub const CONSTRUCTOR_NAME: &str = "constructor";

#[derive(Clone, Debug)]
pub struct NamingOptions {
    pub member_naming: MemberNaming,
    /// Prefix of view accessor names (`As_` gives `As_IComparer_1`).
    pub view_prefix: String,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            member_naming: MemberNaming::None,
            view_prefix: "As_".to_string(),
        }
    }
}

/// Scope a printed member is named in, or `None` for members that are not
/// printed or whose view has no source ancestor.
pub fn member_scope(owner: &TypeStableId, member: &MemberSymbol) -> Option<NameScope> {
    match member.emit_scope {
        EmitScope::ClassSurface => Some(NameScope::instance(owner).effective(member.is_static)),
        EmitScope::StaticSurface => Some(NameScope::static_of(owner)),
        EmitScope::ViewOnly => member
            .source_ancestor
            .as_ref()
            .map(|ancestor| NameScope::view(owner, ancestor, member.is_static)),
        EmitScope::Omitted => None,
    }
}

/// Requested name of a member after the configured transform.
pub fn requested_member_name(member: &MemberSymbol, naming: MemberNaming) -> String {
    if member.is_constructor() {
        CONSTRUCTOR_NAME.to_string()
    } else {
        naming.apply(&member.name)
    }
}

/// Reserve a name for every type, printed member and view of `graph`.
///
/// Stops at the first exhausted suffix search; the returned diagnostics then
/// hold that ERROR.
pub fn reserve_graph(
    graph: &SymbolGraph,
    ledger: &mut NameLedger,
    options: &NamingOptions,
) -> Vec<Diagnostic> {
    let _span = tracing::debug_span!("reservation").entered();
    let mut diagnostics = Vec::new();
    for ns in graph.namespaces() {
        let scope = NameScope::namespace(&ns.name);
        for ty in &ns.types {
            if let Err(err) = reserve_type(ty, &scope, ledger, options) {
                tracing::debug!(ty = %ty.id, error = %err, "reservation stopped");
                diagnostics.push(err.to_diagnostic());
                return diagnostics;
            }
        }
    }
    tracing::debug!(names = ledger.len(), "reservation finished");
    diagnostics
}

fn reserve_type(
    ty: &TypeSymbol,
    namespace: &NameScope,
    ledger: &mut NameLedger,
    options: &NamingOptions,
) -> Result<(), NameError> {
    ledger.reserve(ty.id.clone(), &type_name(ty), namespace, false)?;

    for member in &ty.members {
        let Some(scope) = member_scope(&ty.id, member) else {
            continue;
        };
        let id = member_stable_id(&ty.id, member);
        let requested = requested_member_name(member, options.member_naming);
        // The scope already carries the static flag.
        let is_static = scope.is_static();
        if member.is_method() || member.is_constructor() {
            ledger.reserve_overload(id, &member.name, &requested, &scope, is_static)?;
        } else {
            ledger.reserve(id, &requested, &scope, is_static)?;
        }
    }

    let instance = NameScope::instance(&ty.id);
    for view in &ty.views {
        let (Some(ancestor), Some(requested)) =
            (view.stable_id(), view_accessor_name(&options.view_prefix, view))
        else {
            continue;
        };
        ledger.reserve(
            MemberStableId::view(&ty.id, &ancestor),
            &requested,
            &instance,
            false,
        )?;
    }
    Ok(())
}

/// Reserve type names for one consumer's import set.
///
/// Types are taken in the graph's traversal order whatever order `imported`
/// lists them in, so two types requesting the same name always resolve the
/// same way. Identities missing from the graph are skipped.
pub fn reserve_import_set<'a>(
    graph: &SymbolGraph,
    ledger: &mut NameLedger,
    consumer: &str,
    imported: impl IntoIterator<Item = &'a TypeStableId>,
) -> Vec<Diagnostic> {
    let mut located: Vec<_> = imported
        .into_iter()
        .filter_map(|id| graph.location_of(id).map(|loc| (loc, id)))
        .collect();
    located.sort_by_key(|&(loc, _)| (loc.namespace, loc.index));
    located.dedup_by_key(|&mut (loc, _)| (loc.namespace, loc.index));

    let scope = NameScope::import(consumer);
    let mut diagnostics = Vec::new();
    for (_, id) in located {
        let Some(ty) = graph.find(id) else {
            continue;
        };
        if let Err(err) = ledger.reserve(id.clone(), &type_name(ty), &scope, false) {
            diagnostics.push(err.to_diagnostic());
            break;
        }
    }
    diagnostics
}

#[cfg(test)]
#[path = "tests/reservation_tests.rs"]
mod reservation_tests;
