//! Surface report: the downstream view of a finished run.
//!
//! Every name in the report is read back from the ledger; nothing is derived
//! from CLR names here. Type references are rendered in normalized form.
//! Namespaces, types and members keep the graph's traversal order, so two
//! runs over the same input serialize to the same bytes.

use serde::Serialize;
use tsb_model::{
    EmitScope, MemberOrigin, MemberStableId, NameScope, OmitReason, StableId, SymbolGraph,
    TypeKind, TypeSymbol,
};
use tsb_names::{NameLedger, member_scope};
use tsb_shape::{member_stable_id, normalize, normalize_type};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceReport {
    pub namespaces: Vec<NamespaceReport>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceReport {
    pub name: String,
    pub types: Vec<TypeReport>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeReport {
    pub clr_name: String,
    pub name: Option<String>,
    pub kind: TypeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<ViewReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flattened: Vec<String>,
    pub members: Vec<MemberReport>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewReport {
    pub ancestor: String,
    pub accessor: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberReport {
    pub clr_name: String,
    /// `None` for omitted members.
    pub name: Option<String>,
    pub scope: EmitScope,
    pub is_static: bool,
    pub origin: MemberOrigin,
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ancestor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omit_reason: Option<OmitReason>,
}

impl SurfaceReport {
    pub fn build(graph: &SymbolGraph, ledger: &NameLedger) -> Self {
        let namespaces = graph
            .namespaces()
            .iter()
            .map(|ns| NamespaceReport {
                name: ns.name.clone(),
                types: ns.types.iter().map(|ty| type_report(ty, ledger)).collect(),
            })
            .collect();
        Self { namespaces }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn find_type(&self, clr_name: &str) -> Option<&TypeReport> {
        self.namespaces
            .iter()
            .flat_map(|ns| &ns.types)
            .find(|ty| ty.clr_name == clr_name)
    }
}

impl TypeReport {
    /// Printed members on the class or static surface.
    pub fn main_surface(&self) -> impl Iterator<Item = &MemberReport> {
        self.members.iter().filter(|m| m.scope.is_main_surface())
    }

    pub fn member_names(&self, clr_name: &str) -> Vec<Option<&str>> {
        self.members
            .iter()
            .filter(|m| m.clr_name == clr_name)
            .map(|m| m.name.as_deref())
            .collect()
    }
}

fn lookup(ledger: &NameLedger, id: impl Into<StableId>, scope: &NameScope) -> Option<String> {
    ledger
        .final_name(&id.into(), scope, scope.is_static())
        .ok()
        .map(str::to_string)
}

fn type_report(ty: &TypeSymbol, ledger: &NameLedger) -> TypeReport {
    let instance = NameScope::instance(&ty.id);
    let views = ty
        .views
        .iter()
        .map(|view| ViewReport {
            ancestor: normalize_type(view),
            accessor: view.stable_id().and_then(|ancestor| {
                lookup(ledger, MemberStableId::view(&ty.id, &ancestor), &instance)
            }),
        })
        .collect();

    let members = ty
        .members
        .iter()
        .map(|member| MemberReport {
            clr_name: member.name.clone(),
            name: member_scope(&ty.id, member)
                .and_then(|scope| lookup(ledger, member_stable_id(&ty.id, member), &scope)),
            scope: member.emit_scope,
            is_static: member.is_static,
            origin: member.origin,
            signature: normalize(member),
            source_ancestor: member.source_ancestor.as_ref().map(ToString::to_string),
            omit_reason: member.omit_reason.clone(),
        })
        .collect();

    TypeReport {
        clr_name: ty.full_name().to_string(),
        name: lookup(ledger, ty.id.clone(), &NameScope::namespace(&ty.namespace)),
        kind: ty.kind,
        extends: ty.base_type.as_ref().map(normalize_type),
        implements: ty.interfaces.iter().map(normalize_type).collect(),
        views,
        flattened: ty.flattened.iter().map(normalize_type).collect(),
        members,
    }
}

#[cfg(test)]
#[path = "tests/surface_tests.rs"]
mod surface_tests;
