//! Structural conformance passes for tsb.
//!
//! Given a symbol graph, these passes make every type's declaration surface
//! internally consistent with the surfaces of its ancestors:
//! - Signature normalization and generic substitution primitives
//! - Interface surface closure (memoized, cycle-guarded)
//! - Member classification and indexer conversion
//! - Diamond resolution (flattening or diamond overloads)
//! - Covariance partitioning (suppressed overrides, base overloads, views)
//! - Structural synthesis of missing interface members
//! - Surface deduplication
//!
//! Each pass maps one immutable snapshot to the next; see [`run_passes`] for
//! the order they run in.

pub mod classify;
pub mod closure;
pub mod covariance;
pub mod dedup;
pub mod diamond;
pub mod flatten_exceptions;
pub mod identity;
pub mod indexers;
pub mod normalize;
pub mod pass;
pub mod substitute;
pub mod synthesize;

pub use classify::ClassifyPass;
pub use closure::{ClosureScope, InterfaceSurface, SurfaceIndex, SurfaceMember};
pub use covariance::CovariancePass;
pub use dedup::DedupPass;
pub use diamond::DiamondPass;
pub use flatten_exceptions::FlattenException;
pub use identity::check_identities;
pub use indexers::IndexerPass;
pub use normalize::{member_stable_id, normalize, normalize_parameters, normalize_type};
pub use pass::{PassOutput, ShapeOptions, ShapePass};
pub use substitute::{
    SubstitutionMap, out_of_scope_params, reference_covers, substitute, substitute_member,
};
pub use synthesize::SynthesizePass;

use tsb_model::SymbolGraph;

/// The structural passes in execution order.
pub static STRUCTURAL_PASSES: &[&dyn ShapePass] = &[
    &ClassifyPass,
    &DiamondPass,
    &CovariancePass,
    &SynthesizePass,
    &IndexerPass,
    &DedupPass,
];

/// Run the identity check and every structural pass over `graph`.
///
/// Diagnostics are returned in pass order. ERROR diagnostics do not stop the
/// run; callers decide whether to block on them.
pub fn run_passes(graph: &SymbolGraph, options: &ShapeOptions) -> PassOutput {
    let mut diagnostics = check_identities(graph);
    let mut current = graph.clone();
    for pass in STRUCTURAL_PASSES {
        let _span = tracing::debug_span!("pass", name = pass.name()).entered();
        let output = pass.run(&current, options);
        tracing::debug!(diagnostics = output.diagnostics.len(), "pass finished");
        diagnostics.extend(output.diagnostics);
        current = output.graph;
    }
    PassOutput {
        graph: current,
        diagnostics,
    }
}

#[cfg(test)]
#[path = "tests/fixtures.rs"]
pub(crate) mod test_fixtures;
