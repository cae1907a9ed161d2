//! Interface Surface Closure
//!
//! Computes the full set of instance members a type exposes through its own
//! declarations and its ancestors, with every inherited member substituted
//! into the generic arguments of the reference that reached it.
//!
//! ## Caching
//!
//! The open surface of a type (closed over its own parameters) depends only
//! on the type and the traversal scope, so it is memoized per
//! `(TypeStableId, ClosureScope)` in a concurrent map shared by all worker
//! threads. Closing a reference substitutes the open surface on the way out.
//!
//! ## Cycles
//!
//! The walk carries a visiting set. Re-entering a type on the current path
//! cuts the edge, records the cycle, and marks every surface on the path as
//! partial. Partial surfaces inside the walk are never memoized; the surface
//! of the type the walk started from is complete once the walk returns, and
//! is memoized like any other.
//!
//! The memo stops growing at [`MAX_SURFACE_CACHE_ENTRIES`]; later surfaces
//! are recomputed on demand.

use crate::normalize::normalize;
use crate::substitute::{SubstitutionMap, substitute_member};
use dashmap::DashMap;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::sync::Arc;
use tsb_common::limits::{MAX_ANCESTOR_DEPTH, MAX_SURFACE_CACHE_ENTRIES};
use tsb_model::{EmitScope, MemberSymbol, SymbolGraph, TypeRef, TypeStableId, TypeSymbol};

/// Which ancestor edges a closure follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClosureScope {
    /// Interface list only.
    Interfaces,
    /// Base class and interfaces.
    Full,
}

/// A member reachable on a surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceMember {
    /// The member, substituted into the requesting reference's arguments.
    pub member: MemberSymbol,
    pub signature: String,
    /// The type whose own member list declares it.
    pub declared_by: TypeStableId,
}

impl SurfaceMember {
    fn new(member: MemberSymbol, declared_by: TypeStableId) -> Self {
        let signature = normalize(&member);
        Self {
            member,
            signature,
            declared_by,
        }
    }

    fn substituted(&self, map: &SubstitutionMap) -> Self {
        if map.is_empty() {
            return self.clone();
        }
        Self::new(substitute_member(&self.member, map), self.declared_by.clone())
    }
}

/// Methods and properties of a surface grouped by CLR name, in first-seen
/// order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InterfaceSurface {
    pub methods: IndexMap<String, Vec<SurfaceMember>>,
    pub properties: IndexMap<String, Vec<SurfaceMember>>,
    /// Every ancestor type reached, nearest first.
    pub ancestors: IndexSet<TypeStableId>,
    /// Ancestor references that did not resolve; their members are unknown.
    pub unresolved: Vec<TypeRef>,
    /// Types at which an ancestor cycle was cut.
    pub cycles: Vec<TypeStableId>,
}

impl InterfaceSurface {
    fn insert(&mut self, entry: SurfaceMember) {
        let bucket = if entry.member.is_method() {
            &mut self.methods
        } else {
            &mut self.properties
        };
        let slot = bucket.entry(entry.member.name.clone()).or_default();
        let duplicate = slot
            .iter()
            .any(|m| m.signature == entry.signature && m.declared_by == entry.declared_by);
        if !duplicate {
            slot.push(entry);
        }
    }

    fn absorb(&mut self, ancestor: &TypeStableId, inner: &InterfaceSurface, map: &SubstitutionMap) {
        self.ancestors.insert(ancestor.clone());
        self.ancestors.extend(inner.ancestors.iter().cloned());
        for reference in &inner.unresolved {
            if !self.unresolved.contains(reference) {
                self.unresolved.push(reference.clone());
            }
        }
        for id in &inner.cycles {
            if !self.cycles.contains(id) {
                self.cycles.push(id.clone());
            }
        }
        for entry in inner.iter() {
            self.insert(entry.substituted(map));
        }
    }

    /// Every member: methods first, then properties, each in name order of
    /// first appearance.
    pub fn iter(&self) -> impl Iterator<Item = &SurfaceMember> {
        self.methods
            .values()
            .chain(self.properties.values())
            .flatten()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods
            .keys()
            .chain(self.properties.keys())
            .map(String::as_str)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.methods.contains_key(name) || self.properties.contains_key(name)
    }

    pub fn members_named(&self, name: &str) -> impl Iterator<Item = &SurfaceMember> {
        self.methods
            .get(name)
            .into_iter()
            .chain(self.properties.get(name))
            .flatten()
    }

    /// Distinct normalized shapes required for `name`.
    pub fn signatures_for(&self, name: &str) -> BTreeSet<&str> {
        self.members_named(name)
            .map(|m| m.signature.as_str())
            .collect()
    }

    pub fn contains_signature(&self, name: &str, signature: &str) -> bool {
        self.members_named(name).any(|m| m.signature == signature)
    }

    /// Types declaring `name` somewhere on this surface.
    pub fn declarers_of(&self, name: &str) -> FxHashSet<&TypeStableId> {
        self.members_named(name).map(|m| &m.declared_by).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.properties.is_empty()
    }

    /// Copy with every member substituted through `map`.
    #[must_use]
    pub fn substituted(&self, map: &SubstitutionMap) -> InterfaceSurface {
        if map.is_empty() || map.is_identity() {
            return self.clone();
        }
        let mut out = InterfaceSurface {
            ancestors: self.ancestors.clone(),
            unresolved: self.unresolved.clone(),
            cycles: self.cycles.clone(),
            ..InterfaceSurface::default()
        };
        for entry in self.iter() {
            out.insert(entry.substituted(map));
        }
        out
    }
}

/// Whether a member participates in the instance surface a closure exposes.
pub fn is_surface_member(member: &MemberSymbol) -> bool {
    member.emit_scope == EmitScope::ClassSurface
        && !member.is_static
        && !member.is_explicit_implementation()
        && (member.is_method() || member.is_property())
}

// =============================================================================
// Index
// =============================================================================

/// Memoized closure computation over one graph snapshot.
pub struct SurfaceIndex<'g> {
    graph: &'g SymbolGraph,
    memo: DashMap<(TypeStableId, ClosureScope), Arc<InterfaceSurface>>,
    cache_limit: usize,
}

impl<'g> SurfaceIndex<'g> {
    pub fn new(graph: &'g SymbolGraph) -> Self {
        Self::with_cache_limit(graph, MAX_SURFACE_CACHE_ENTRIES)
    }

    /// Index whose memo holds at most `cache_limit` surfaces.
    pub fn with_cache_limit(graph: &'g SymbolGraph, cache_limit: usize) -> Self {
        Self {
            graph,
            memo: DashMap::new(),
            cache_limit,
        }
    }

    pub fn graph(&self) -> &'g SymbolGraph {
        self.graph
    }

    pub fn cached_len(&self) -> usize {
        self.memo.len()
    }

    /// Surface of `ty` closed over its own generic parameters.
    pub fn open_surface(&self, ty: &TypeSymbol, scope: ClosureScope) -> Arc<InterfaceSurface> {
        let mut visiting = FxHashSet::default();
        self.compute(ty, scope, &mut visiting).0
    }

    /// Surface reached through `reference`, substituted into its arguments.
    ///
    /// An unresolved reference yields an empty surface listing it as
    /// unresolved. When the reference's arguments do not cover the
    /// definition's parameters the open surface is returned unsubstituted;
    /// its members then mention out-of-scope parameters, which later passes
    /// detect.
    pub fn surface(&self, reference: &TypeRef, scope: ClosureScope) -> InterfaceSurface {
        let Some(ty) = self.graph.resolve(reference) else {
            return InterfaceSurface {
                unresolved: vec![reference.clone()],
                ..InterfaceSurface::default()
            };
        };
        let open = self.open_surface(ty, scope);
        let map = SubstitutionMap::build(reference, &ty.generic_parameters);
        if !map.covers(&ty.generic_parameters) {
            tracing::debug!(
                reference = %reference,
                "substitution does not cover the definition's parameters"
            );
        }
        open.substituted(&map)
    }

    /// Whether `ancestor` is reachable from `ty` through any edge.
    pub fn reaches(&self, ty: &TypeSymbol, ancestor: &TypeStableId) -> bool {
        self.open_surface(ty, ClosureScope::Full)
            .ancestors
            .contains(ancestor)
    }

    fn compute(
        &self,
        ty: &TypeSymbol,
        scope: ClosureScope,
        visiting: &mut FxHashSet<TypeStableId>,
    ) -> (Arc<InterfaceSurface>, bool) {
        let key = (ty.id.clone(), scope);
        if let Some(hit) = self.memo.get(&key) {
            return (Arc::clone(hit.value()), false);
        }
        if visiting.len() >= MAX_ANCESTOR_DEPTH as usize || !visiting.insert(ty.id.clone()) {
            tracing::debug!(ty = %ty.id, "ancestor cycle cut");
            let cut = InterfaceSurface {
                cycles: vec![ty.id.clone()],
                ..InterfaceSurface::default()
            };
            return (Arc::new(cut), true);
        }

        let mut surface = InterfaceSurface::default();
        let mut partial = false;

        for member in ty.members.iter().filter(|m| is_surface_member(m)) {
            surface.insert(SurfaceMember::new(member.clone(), ty.id.clone()));
        }

        let base = match scope {
            ClosureScope::Full => ty.base_type.as_ref(),
            ClosureScope::Interfaces => None,
        };
        for reference in base.into_iter().chain(ty.interfaces.iter()) {
            let Some(ancestor) = self.graph.resolve(reference) else {
                if !surface.unresolved.contains(reference) {
                    surface.unresolved.push(reference.clone());
                }
                continue;
            };
            let (inner, inner_partial) = self.compute(ancestor, scope, visiting);
            partial |= inner_partial;
            let map = SubstitutionMap::build(reference, &ancestor.generic_parameters);
            surface.absorb(&ancestor.id, &inner, &map);
        }

        visiting.remove(&ty.id);
        // Back at the start of the walk, every cut edge pointed into this
        // surface, so nothing is missing from it.
        if partial && visiting.is_empty() {
            partial = false;
        }
        let surface = Arc::new(surface);
        if !partial {
            self.remember(key, &surface);
        }
        (surface, partial)
    }

    fn remember(&self, key: (TypeStableId, ClosureScope), surface: &Arc<InterfaceSurface>) {
        if self.memo.len() >= self.cache_limit {
            tracing::trace!(ty = %key.0, "surface cache full");
            return;
        }
        self.memo.insert(key, Arc::clone(surface));
    }
}

#[cfg(test)]
#[path = "tests/closure_tests.rs"]
mod closure_tests;
