//! Extraction results.

use crate::definition::FeatureDefinition;
use crate::error::FeatureComputationError;
use crate::value::{FeatureValue, SENTINEL};

/// Values of one feature.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureValues {
    /// Non-sequential feature, computed once for the whole piece
    Single(FeatureValue),
    /// Sequential feature, one value per window
    Windowed(Vec<FeatureValue>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum FeatureOutcome {
    Computed(FeatureValues),
    /// The first error the feature hit; its values are discarded
    Failed(FeatureComputationError),
}

/// One row of the matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureEntry {
    pub definition: FeatureDefinition,
    pub outcome: FeatureOutcome,
}

impl FeatureEntry {
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn is_computed(&self) -> bool {
        matches!(self.outcome, FeatureOutcome::Computed(_))
    }

    pub fn values(&self) -> Option<&FeatureValues> {
        match &self.outcome {
            FeatureOutcome::Computed(values) => Some(values),
            FeatureOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FeatureComputationError> {
        match &self.outcome {
            FeatureOutcome::Failed(err) => Some(err),
            FeatureOutcome::Computed(_) => None,
        }
    }

    /// Whole-piece value of a non-sequential feature.
    pub fn single(&self) -> Option<&FeatureValue> {
        match self.values()? {
            FeatureValues::Single(value) => Some(value),
            FeatureValues::Windowed(_) => None,
        }
    }

    /// Per-window values of a sequential feature.
    pub fn windows(&self) -> Option<&[FeatureValue]> {
        match self.values()? {
            FeatureValues::Windowed(values) => Some(values),
            FeatureValues::Single(_) => None,
        }
    }
}

/// Legacy numeric export of one feature: a single row for whole-piece
/// features, one row per window otherwise. Unavailable values and failed
/// features are filled with [`SENTINEL`].
#[derive(Clone, Debug, PartialEq)]
pub struct LegacyRows {
    pub name: String,
    pub rows: Vec<Vec<f64>>,
}

/// Every feature of one extraction run, in catalog registration order.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    entries: Vec<FeatureEntry>,
    window_count: usize,
}

impl FeatureMatrix {
    pub(crate) fn new(entries: Vec<FeatureEntry>, window_count: usize) -> Self {
        Self {
            entries,
            window_count,
        }
    }

    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&FeatureEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Number of windows sequential features were extracted over
    /// (0 if the catalog had none).
    pub fn window_count(&self) -> usize {
        self.window_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn computed(&self) -> impl Iterator<Item = &FeatureEntry> {
        self.entries.iter().filter(|e| e.is_computed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FeatureEntry> {
        self.entries.iter().filter(|e| !e.is_computed())
    }

    pub fn errors(&self) -> Vec<&FeatureComputationError> {
        self.entries.iter().filter_map(FeatureEntry::error).collect()
    }

    /// True if no feature failed.
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(FeatureEntry::is_computed)
    }

    /// Element-wise mean over the available windows of a feature. For a
    /// whole-piece feature this is its single value.
    pub fn overall_average(&self, name: &str) -> Option<FeatureValue> {
        match self.get(name)?.values()? {
            FeatureValues::Single(value) => Some(value.clone()),
            FeatureValues::Windowed(values) => Some(
                window_moments(values).map_or(FeatureValue::Unavailable, |(mean, _)| {
                    FeatureValue::Available(mean)
                }),
            ),
        }
    }

    /// Element-wise population standard deviation over the available
    /// windows of a feature; zero for a whole-piece feature.
    pub fn overall_std_dev(&self, name: &str) -> Option<FeatureValue> {
        match self.get(name)?.values()? {
            FeatureValues::Single(FeatureValue::Available(v)) => {
                Some(FeatureValue::Available(vec![0.0; v.len()]))
            }
            FeatureValues::Single(FeatureValue::Unavailable) => Some(FeatureValue::Unavailable),
            FeatureValues::Windowed(values) => Some(
                window_moments(values).map_or(FeatureValue::Unavailable, |(_, std_dev)| {
                    FeatureValue::Available(std_dev)
                }),
            ),
        }
    }

    /// Project the matrix onto the legacy `-1.0` convention.
    pub fn to_legacy(&self) -> Vec<LegacyRows> {
        self.entries
            .iter()
            .map(|entry| {
                let dims = entry.definition.dimensions();
                let rows = match &entry.outcome {
                    FeatureOutcome::Computed(FeatureValues::Single(value)) => {
                        vec![value.to_legacy(dims)]
                    }
                    FeatureOutcome::Computed(FeatureValues::Windowed(values)) => {
                        values.iter().map(|v| v.to_legacy(dims)).collect()
                    }
                    FeatureOutcome::Failed(_) => {
                        let count = if entry.definition.is_sequential() {
                            self.window_count
                        } else {
                            1
                        };
                        vec![vec![SENTINEL; dims.legacy_len()]; count]
                    }
                };
                LegacyRows {
                    name: entry.name().to_string(),
                    rows,
                }
            })
            .collect()
    }
}

/// Mean and population standard deviation of the available windows whose
/// width matches the first available one.
fn window_moments(values: &[FeatureValue]) -> Option<(Vec<f64>, Vec<f64>)> {
    let mut available = values.iter().filter_map(FeatureValue::values);
    let first = available.next()?;
    let width = first.len();
    let rows: Vec<&[f64]> = std::iter::once(first)
        .chain(available.filter(|v| v.len() == width))
        .collect();
    let n = rows.len() as f64;

    let mean: Vec<f64> = (0..width)
        .map(|i| rows.iter().map(|r| r[i]).sum::<f64>() / n)
        .collect();
    let std_dev = (0..width)
        .map(|i| {
            let var = rows.iter().map(|r| (r[i] - mean[i]).powi(2)).sum::<f64>() / n;
            var.sqrt()
        })
        .collect();
    Some((mean, std_dev))
}
