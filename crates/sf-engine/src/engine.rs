//! Dependency-ordered extraction.
//!
//! Windows are processed strictly in increasing order; completing a window
//! settles its values into the dependency table, which later windows only
//! read. Inside a window, features are evaluated level by level (all
//! same-window dependencies of a level live in earlier levels), and each
//! level may fan out across the rayon pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use sf_ir::{EventStream, IntermediateRepresentation, NoteSummary};
use slotmap::SecondaryMap;
use tracing::{info, info_span, trace, warn};

use crate::catalog::{check_dimensions, Catalog, FeatureKey};
use crate::dependency::{DependencyTable, DependencyValues, WindowValues};
use crate::error::{CatalogError, ExtractionError, FeatureComputationError};
use crate::extractor::extract_guarded;
use crate::matrix::{FeatureEntry, FeatureMatrix, FeatureOutcome, FeatureValues};
use crate::value::FeatureValue;

/// Shared flag a host can set to stop a run at the next window boundary.
pub type CancellationFlag = Arc<AtomicBool>;

type ComputeResult = Result<FeatureValue, FeatureComputationError>;

/// Drives a catalog over one input.
pub struct ExtractionEngine {
    catalog: Arc<Catalog>,
    parallel: bool,
    cancellation: Option<CancellationFlag>,
}

impl ExtractionEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            parallel: true,
            cancellation: None,
        }
    }

    /// Evaluate independent features of a window on the rayon pool.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Extract every catalog feature.
    ///
    /// Sequential features are evaluated once per window of
    /// `representation` (a single window when it is absent); the others
    /// once over the whole piece. A feature whose extractor fails is
    /// recorded as failed and the run carries on. Only malformed catalogs
    /// and cancellation abort the run.
    pub fn run(
        &self,
        sequence: &EventStream,
        representation: Option<&IntermediateRepresentation>,
    ) -> Result<FeatureMatrix, ExtractionError> {
        let catalog = &*self.catalog;
        let span = info_span!("extract", features = catalog.len());
        let _enter = span.enter();

        let (sequential, whole_piece): (Vec<FeatureKey>, Vec<FeatureKey>) = catalog
            .declared()
            .iter()
            .copied()
            .partition(|&key| catalog.entry(key).definition().is_sequential());

        let mut failures: SecondaryMap<FeatureKey, FeatureComputationError> = SecondaryMap::new();
        let mut windowed: SecondaryMap<FeatureKey, Vec<FeatureValue>> = SecondaryMap::new();
        let mut single: SecondaryMap<FeatureKey, FeatureValue> = SecondaryMap::new();
        let mut window_count = 0;

        if !sequential.is_empty() {
            let levels = catalog.levels_for(&catalog.closure(sequential.iter().copied()));
            let slices: Vec<Option<&NoteSummary>> = match representation {
                Some(rep) => rep.windows.iter().map(|w| Some(&w.summary)).collect(),
                None => vec![None],
            };
            window_count = slices.len();
            for &key in &sequential {
                windowed.insert(key, Vec::with_capacity(window_count));
            }

            // Lookback past the first window can never resolve
            let mut table = DependencyTable::new(catalog.max_lookback().min(window_count));
            for (index, summary) in slices.into_iter().enumerate() {
                self.check_cancelled(index)?;
                let (values, errors) =
                    self.evaluate_window(&levels, sequence, summary, Some(index), &table)?;

                for (key, err) in errors {
                    let sequential = catalog.entry(key).definition().is_sequential();
                    if sequential && !failures.contains_key(key) {
                        failures.insert(key, err);
                    }
                }
                for &key in &sequential {
                    let value = values.get(key).cloned().unwrap_or(FeatureValue::Unavailable);
                    if let Some(series) = windowed.get_mut(key) {
                        series.push(value);
                    }
                }
                table.settle(values);
                trace!(window = index, settled = table.settled_windows(), "window complete");
            }
        }

        if !whole_piece.is_empty() {
            self.check_cancelled(window_count)?;
            let levels = catalog.levels_for(&catalog.closure(whole_piece.iter().copied()));
            let table = DependencyTable::new(0);
            let summary = representation.map(|rep| &rep.whole);
            let (values, errors) = self.evaluate_window(&levels, sequence, summary, None, &table)?;

            for (key, err) in errors {
                if !catalog.entry(key).definition().is_sequential() {
                    failures.insert(key, err);
                }
            }
            for &key in &whole_piece {
                let value = values.get(key).cloned().unwrap_or(FeatureValue::Unavailable);
                single.insert(key, value);
            }
        }

        let entries: Vec<FeatureEntry> = catalog
            .declared()
            .iter()
            .map(|&key| {
                let definition = catalog.entry(key).definition().clone();
                let outcome = match failures.remove(key) {
                    Some(err) => FeatureOutcome::Failed(err),
                    None if definition.is_sequential() => FeatureOutcome::Computed(
                        FeatureValues::Windowed(windowed.remove(key).unwrap_or_default()),
                    ),
                    None => FeatureOutcome::Computed(FeatureValues::Single(
                        single.remove(key).unwrap_or(FeatureValue::Unavailable),
                    )),
                };
                FeatureEntry {
                    definition,
                    outcome,
                }
            })
            .collect();

        let matrix = FeatureMatrix::new(entries, window_count);
        info!(
            windows = window_count,
            computed = matrix.computed().count(),
            failed = matrix.failed().count(),
            "extraction finished"
        );
        Ok(matrix)
    }

    fn check_cancelled(&self, window: usize) -> Result<(), ExtractionError> {
        match &self.cancellation {
            Some(flag) if flag.load(Ordering::Relaxed) => {
                Err(ExtractionError::Cancelled { window })
            }
            _ => Ok(()),
        }
    }

    /// Evaluate `levels` against one slice. Failed features leave no value,
    /// so their dependents see them as unavailable.
    fn evaluate_window(
        &self,
        levels: &[Vec<FeatureKey>],
        sequence: &EventStream,
        summary: Option<&NoteSummary>,
        window: Option<usize>,
        table: &DependencyTable,
    ) -> Result<(WindowValues, Vec<(FeatureKey, FeatureComputationError)>), CatalogError> {
        let mut current = WindowValues::new();
        let mut errors = Vec::new();

        for level in levels {
            let compute = |&key: &FeatureKey| {
                (key, self.compute(key, sequence, summary, table, &current))
            };
            let results: Vec<(FeatureKey, ComputeResult)> = if self.parallel && level.len() > 1 {
                level.par_iter().map(compute).collect()
            } else {
                level.iter().map(compute).collect()
            };

            for (key, result) in results {
                let definition = self.catalog.entry(key).definition();
                match result {
                    Ok(value) => {
                        check_dimensions(definition, &value)?;
                        current.insert(key, value);
                    }
                    Err(err) => {
                        warn!(
                            feature = definition.name(),
                            ?window,
                            error = %err,
                            "feature computation failed"
                        );
                        errors.push((key, err.in_window(window)));
                    }
                }
            }
        }
        Ok((current, errors))
    }

    fn compute(
        &self,
        key: FeatureKey,
        sequence: &EventStream,
        summary: Option<&NoteSummary>,
        table: &DependencyTable,
        current: &WindowValues,
    ) -> ComputeResult {
        let entry = self.catalog.entry(key);
        let deps = DependencyValues::new(
            entry
                .dependencies
                .iter()
                .map(|&(dep, offset)| table.resolve(current, dep, offset))
                .collect(),
        );
        trace!(feature = entry.definition().name(), "extracting");
        extract_guarded(entry.extractor.as_ref(), sequence, summary, &deps)
    }
}
