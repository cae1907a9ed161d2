//! The pipeline driver.
//!
//! One run takes the aggregated graph through the structural passes, fills
//! a fresh name ledger, reserves every requested import set and finally runs
//! the validation gate. Diagnostics from all stages land in one collector in
//! stage order.

use crate::config::PipelineOptions;
use crate::surface::SurfaceReport;
use crate::validate::validate;
use tracing::info;
use tsb_common::{DiagnosticCollector, DiagnosticSeverity};
use tsb_model::{SymbolGraph, TypeStableId};
use tsb_names::{NameLedger, reserve_graph, reserve_import_set};
use tsb_shape::run_passes;

/// The types one consumer imports together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSet {
    pub consumer: String,
    pub types: Vec<TypeStableId>,
}

impl ImportSet {
    pub fn new(consumer: impl Into<String>, types: impl IntoIterator<Item = TypeStableId>) -> Self {
        Self {
            consumer: consumer.into(),
            types: types.into_iter().collect(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    options: PipelineOptions,
    import_sets: Vec<ImportSet>,
}

#[derive(Debug)]
pub struct PipelineOutput {
    /// The shaped graph handed to planning.
    pub graph: SymbolGraph,
    pub ledger: NameLedger,
    pub diagnostics: DiagnosticCollector,
}

impl PipelineOutput {
    /// Whether planning and emission must be blocked.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn report(&self) -> SurfaceReport {
        SurfaceReport::build(&self.graph, &self.ledger)
    }
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            import_sets: Vec::new(),
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    #[must_use]
    pub fn with_import_set(mut self, import_set: ImportSet) -> Self {
        self.import_sets.push(import_set);
        self
    }

    pub fn run(&self, graph: &SymbolGraph) -> PipelineOutput {
        let _span = tracing::info_span!("pipeline", types = graph.type_count()).entered();
        let mut diagnostics = DiagnosticCollector::new();

        let shaped = run_passes(graph, &self.options.shape_options());
        diagnostics.extend(shaped.diagnostics);
        let graph = shaped.graph;

        let mut ledger = NameLedger::with_options(self.options.ledger_options());
        let naming = self.options.naming_options();
        let mut naming_failed = false;

        let reserved = reserve_graph(&graph, &mut ledger, &naming);
        naming_failed |= !reserved.is_empty();
        diagnostics.extend(reserved);

        for import_set in &self.import_sets {
            let reserved =
                reserve_import_set(&graph, &mut ledger, &import_set.consumer, &import_set.types);
            naming_failed |= !reserved.is_empty();
            diagnostics.extend(reserved);
        }

        // A stopped reservation leaves holes the gate would only repeat.
        if !naming_failed {
            diagnostics.extend(validate(&graph, &ledger, self.options.parallel));
        }

        info!(
            names = ledger.len(),
            errors = diagnostics.count(DiagnosticSeverity::Error),
            warnings = diagnostics.count(DiagnosticSeverity::Warning),
            "pipeline finished"
        );

        PipelineOutput {
            graph,
            ledger,
            diagnostics,
        }
    }
}
