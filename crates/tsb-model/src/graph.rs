//! Namespace-partitioned symbol graph.
//!
//! The graph owns every type symbol through its namespace. Ancestor edges
//! are plain [`TypeRef`] data resolved through an index by CLR full name, so
//! cyclic ancestor relationships never become cyclic ownership.
//!
//! Namespaces are kept sorted by name and types sorted by CLR full name. That
//! order is the fixed traversal order every pass and the name reservation
//! walk follow.

use crate::identity::TypeStableId;
use crate::symbols::TypeSymbol;
use crate::type_ref::TypeRef;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamespaceSymbol {
    pub name: String,
    pub types: Vec<TypeSymbol>,
}

impl NamespaceSymbol {
    pub fn new(name: impl Into<String>, types: Vec<TypeSymbol>) -> Self {
        Self {
            name: name.into(),
            types,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeLocation {
    pub namespace: usize,
    pub index: usize,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<NamespaceSymbol>", into = "Vec<NamespaceSymbol>")]
pub struct SymbolGraph {
    namespaces: Vec<NamespaceSymbol>,
    index: FxHashMap<String, TypeLocation>,
}

impl SymbolGraph {
    /// Build a graph, sorting namespaces and types into traversal order.
    ///
    /// Types are ordered by CLR full name, then by assembly.
    ///
    /// Namespaces that share a name are merged. When two types share a CLR
    /// full name the first one wins the index slot; upstream aggregation is
    /// expected to have removed such duplicates already.
    pub fn new(namespaces: Vec<NamespaceSymbol>) -> Self {
        let mut merged: FxHashMap<String, Vec<TypeSymbol>> = FxHashMap::default();
        for ns in namespaces {
            merged.entry(ns.name).or_default().extend(ns.types);
        }
        let mut namespaces: Vec<NamespaceSymbol> = merged
            .into_iter()
            .map(|(name, mut types)| {
                types.sort_by(|a, b| {
                    a.id.clr_full_name
                        .cmp(&b.id.clr_full_name)
                        .then_with(|| a.id.assembly.cmp(&b.id.assembly))
                });
                NamespaceSymbol { name, types }
            })
            .collect();
        namespaces.sort_by(|a, b| a.name.cmp(&b.name));
        Self::from_sorted(namespaces)
    }

    /// Group loose types by their namespace.
    pub fn from_types(types: impl IntoIterator<Item = TypeSymbol>) -> Self {
        let namespaces = types
            .into_iter()
            .map(|ty| NamespaceSymbol::new(ty.namespace.clone(), vec![ty]))
            .collect();
        Self::new(namespaces)
    }

    /// Rebuild from namespaces that are already in traversal order.
    ///
    /// Passes use this to assemble their output snapshot; they map types one
    /// to one, so the order of the input snapshot is preserved.
    pub fn from_sorted(namespaces: Vec<NamespaceSymbol>) -> Self {
        let mut index = FxHashMap::default();
        for (ns_idx, ns) in namespaces.iter().enumerate() {
            for (ty_idx, ty) in ns.types.iter().enumerate() {
                index
                    .entry(ty.id.clr_full_name.clone())
                    .or_insert(TypeLocation {
                        namespace: ns_idx,
                        index: ty_idx,
                    });
            }
        }
        Self { namespaces, index }
    }

    pub fn namespaces(&self) -> &[NamespaceSymbol] {
        &self.namespaces
    }

    pub fn into_namespaces(self) -> Vec<NamespaceSymbol> {
        self.namespaces
    }

    /// All types in traversal order.
    pub fn types(&self) -> impl Iterator<Item = &TypeSymbol> {
        self.namespaces.iter().flat_map(|ns| ns.types.iter())
    }

    pub fn type_count(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.types.len()).sum()
    }

    pub fn find_by_name(&self, clr_full_name: &str) -> Option<&TypeSymbol> {
        let loc = self.index.get(clr_full_name)?;
        self.namespaces
            .get(loc.namespace)
            .and_then(|ns| ns.types.get(loc.index))
    }

    pub fn find(&self, id: &TypeStableId) -> Option<&TypeSymbol> {
        self.find_by_name(&id.clr_full_name)
    }

    /// Resolve a named or nested reference. Other reference kinds never
    /// resolve to a symbol.
    pub fn resolve(&self, reference: &TypeRef) -> Option<&TypeSymbol> {
        reference
            .resolution_key()
            .and_then(|key| self.find_by_name(key))
    }

    pub fn location_of(&self, id: &TypeStableId) -> Option<TypeLocation> {
        self.index.get(&id.clr_full_name).copied()
    }

    /// Produce a new snapshot by mapping every type, namespace by namespace,
    /// preserving order.
    #[must_use]
    pub fn map_types(&self, mut f: impl FnMut(&TypeSymbol) -> TypeSymbol) -> SymbolGraph {
        let namespaces = self
            .namespaces
            .iter()
            .map(|ns| NamespaceSymbol {
                name: ns.name.clone(),
                types: ns.types.iter().map(&mut f).collect(),
            })
            .collect();
        SymbolGraph::from_sorted(namespaces)
    }
}

impl PartialEq for SymbolGraph {
    fn eq(&self, other: &Self) -> bool {
        self.namespaces == other.namespaces
    }
}

impl From<Vec<NamespaceSymbol>> for SymbolGraph {
    fn from(namespaces: Vec<NamespaceSymbol>) -> Self {
        SymbolGraph::new(namespaces)
    }
}

impl From<SymbolGraph> for Vec<NamespaceSymbol> {
    fn from(graph: SymbolGraph) -> Self {
        graph.namespaces
    }
}
