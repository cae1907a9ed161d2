//! Pass plumbing shared by the structural passes.
//!
//! Every pass reads one immutable graph snapshot and produces the next one
//! plus the diagnostics it raised. Work is split by namespace: with
//! `parallel` set, namespaces are processed on the rayon pool and reassembled
//! in their original order, so the result is identical to a sequential run.

use crate::flatten_exceptions::FlattenException;
use rayon::prelude::*;
use tsb_common::Diagnostic;
use tsb_model::{
    EmitScope, MemberOrigin, MemberSymbol, NamespaceSymbol, SymbolGraph, TypeStableId, TypeSymbol,
};

/// Options the structural passes read.
#[derive(Clone, Debug, Default)]
pub struct ShapeOptions {
    /// Process namespaces on the rayon pool.
    pub parallel: bool,
    /// Consulted by the diamond resolver before any shape analysis.
    pub flatten_exceptions: Vec<FlattenException>,
}

impl ShapeOptions {
    /// Options with the built-in exception table.
    pub fn with_builtin_exceptions() -> Self {
        Self {
            parallel: false,
            flatten_exceptions: FlattenException::builtin(),
        }
    }
}

/// Snapshot produced by one pass.
#[derive(Clone, Debug)]
pub struct PassOutput {
    pub graph: SymbolGraph,
    pub diagnostics: Vec<Diagnostic>,
}

/// A structural pass over one graph snapshot.
pub trait ShapePass: Sync {
    fn name(&self) -> &'static str;

    fn run(&self, graph: &SymbolGraph, options: &ShapeOptions) -> PassOutput;
}

/// Map every type of `graph` through `f`, namespace by namespace.
///
/// Diagnostics are concatenated in traversal order regardless of `parallel`.
pub fn map_types_with<F>(graph: &SymbolGraph, parallel: bool, f: F) -> PassOutput
where
    F: Fn(&TypeSymbol, &mut Vec<Diagnostic>) -> TypeSymbol + Sync,
{
    let process = |ns: &NamespaceSymbol| {
        let mut diagnostics = Vec::new();
        let types = ns
            .types
            .iter()
            .map(|ty| f(ty, &mut diagnostics))
            .collect();
        (NamespaceSymbol::new(ns.name.clone(), types), diagnostics)
    };

    let results: Vec<(NamespaceSymbol, Vec<Diagnostic>)> = if parallel {
        graph.namespaces().par_iter().map(process).collect()
    } else {
        graph.namespaces().iter().map(process).collect()
    };

    let mut namespaces = Vec::with_capacity(results.len());
    let mut diagnostics = Vec::new();
    for (ns, diags) in results {
        namespaces.push(ns);
        diagnostics.extend(diags);
    }
    PassOutput {
        graph: SymbolGraph::from_sorted(namespaces),
        diagnostics,
    }
}

/// Copy of an inherited member re-homed onto the type being processed.
///
/// The copy carries no metadata token: it is a new surface entry, not the
/// ancestor's declaration.
pub(crate) fn adopt_member(
    member: &MemberSymbol,
    origin: MemberOrigin,
    source: &TypeStableId,
    scope: EmitScope,
) -> MemberSymbol {
    let mut adopted = member.clone().with_origin(origin, Some(source.clone()));
    adopted.metadata_token = None;
    adopted.emit_scope = scope;
    adopted.omit_reason = None;
    adopted
}
