//! Indexer conversion.
//!
//! A declaration surface can carry at most one index signature per side. When
//! a type's main surface holds more than one indexer on the same side, every
//! one of them is omitted and replaced by explicit accessor methods
//! (`get_Item(index)` / `set_Item(index, value)`), which overload freely.

use crate::pass::{PassOutput, ShapeOptions, ShapePass, map_types_with};
use tsb_common::{Diagnostic, diagnostic_codes};
use tsb_model::{
    Accessors, EmitScope, MemberKind, MemberOrigin, MemberSymbol, OmitReason, Parameter,
    SymbolGraph, TypeRef, TypeSymbol,
};

pub struct IndexerPass;

impl ShapePass for IndexerPass {
    fn name(&self) -> &'static str {
        "indexers"
    }

    fn run(&self, graph: &SymbolGraph, options: &ShapeOptions) -> PassOutput {
        map_types_with(graph, options.parallel, convert_indexers)
    }
}

pub fn convert_indexers(ty: &TypeSymbol, diagnostics: &mut Vec<Diagnostic>) -> TypeSymbol {
    let mut out = ty.clone();
    for is_static in [false, true] {
        let positions: Vec<usize> = out
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_indexer() && m.is_static == is_static && m.emit_scope.is_main_surface())
            .map(|(i, _)| i)
            .collect();
        if positions.len() < 2 {
            continue;
        }

        let mut accessors = Vec::new();
        for &i in &positions {
            accessors.extend(accessor_methods(&out.members[i]));
            out.members[i] = out.members[i].clone().omitted(OmitReason::IndexerOverload);
        }
        tracing::debug!(ty = %ty.id, count = positions.len(), "indexers converted to accessors");
        diagnostics.push(Diagnostic::from_code(
            diagnostic_codes::INDEXER_OVERLOADS_CONVERTED,
            &ty.id,
            &[&positions.len().to_string()],
        ));
        out.members.extend(accessors);
    }
    out
}

/// `get_<name>` and `set_<name>` methods matching an indexer's accessors.
fn accessor_methods(indexer: &MemberSymbol) -> Vec<MemberSymbol> {
    let MemberKind::Property(shape) = &indexer.kind else {
        return Vec::new();
    };
    let params: Vec<Parameter> = shape.index_parameters.iter().cloned().collect();
    let finish = |method: MemberSymbol| {
        let mut method = method
            .with_static(indexer.is_static)
            .with_origin(MemberOrigin::IndexerAccessor, indexer.source_ancestor.clone());
        method.emit_scope = if indexer.is_static {
            EmitScope::StaticSurface
        } else {
            EmitScope::ClassSurface
        };
        method
    };

    let mut methods = Vec::with_capacity(2);
    if matches!(shape.accessors, Accessors::Get | Accessors::GetSet) {
        methods.push(finish(MemberSymbol::method(
            format!("get_{}", indexer.name),
            params.clone(),
            shape.property_type.clone(),
        )));
    }
    if matches!(shape.accessors, Accessors::Set | Accessors::GetSet) {
        let mut set_params = params;
        set_params.push(Parameter::new("value", shape.property_type.clone()));
        methods.push(finish(MemberSymbol::method(
            format!("set_{}", indexer.name),
            set_params,
            TypeRef::void(),
        )));
    }
    methods
}

#[cfg(test)]
#[path = "tests/indexers_tests.rs"]
mod indexers_tests;
