//! Pitch histograms.

use sf_engine::{
    DependencyValues, Dimensions, FeatureComputationError, FeatureDefinition, FeatureExtractor,
    FeatureValue,
};
use sf_ir::{EventStream, NoteSummary, PITCH_CLASS_COUNT, PITCH_COUNT};

pub const BASIC_PITCH_HISTOGRAM: &str = "Basic Pitch Histogram";
pub const PITCH_CLASS_DISTRIBUTION: &str = "Pitch Class Distribution";

/// Scale counts so they sum to one. A slice with no notes stays all zero.
fn normalize(counts: &[f64]) -> Vec<f64> {
    let total: f64 = counts.iter().sum();
    if total > 0.0 {
        counts.iter().map(|c| c / total).collect()
    } else {
        counts.to_vec()
    }
}

/// Fraction of notes on each of the 128 MIDI pitches.
pub struct BasicPitchHistogram {
    definition: FeatureDefinition,
}

impl BasicPitchHistogram {
    pub fn new() -> Self {
        Self {
            definition: FeatureDefinition::new(
                BASIC_PITCH_HISTOGRAM,
                "Fraction of notes with each MIDI pitch.",
                true,
                Dimensions::Fixed(PITCH_COUNT),
            ),
        }
    }
}

impl Default for BasicPitchHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for BasicPitchHistogram {
    fn definition(&self) -> &FeatureDefinition {
        &self.definition
    }

    fn extract(
        &self,
        _sequence: &EventStream,
        representation: Option<&NoteSummary>,
        _dependencies: &DependencyValues<'_>,
    ) -> Result<FeatureValue, FeatureComputationError> {
        Ok(representation.map_or(FeatureValue::Unavailable, |r| {
            FeatureValue::Available(normalize(&r.basic_pitch_histogram))
        }))
    }
}

/// Fraction of notes in each pitch class, C first.
pub struct PitchClassDistribution {
    definition: FeatureDefinition,
}

impl PitchClassDistribution {
    pub fn new() -> Self {
        Self {
            definition: FeatureDefinition::new(
                PITCH_CLASS_DISTRIBUTION,
                "Fraction of notes in each pitch class, starting at C.",
                true,
                Dimensions::Fixed(PITCH_CLASS_COUNT),
            ),
        }
    }
}

impl Default for PitchClassDistribution {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for PitchClassDistribution {
    fn definition(&self) -> &FeatureDefinition {
        &self.definition
    }

    fn extract(
        &self,
        _sequence: &EventStream,
        representation: Option<&NoteSummary>,
        _dependencies: &DependencyValues<'_>,
    ) -> Result<FeatureValue, FeatureComputationError> {
        Ok(representation.map_or(FeatureValue::Unavailable, |r| {
            FeatureValue::Available(normalize(&r.pitch_class_histogram))
        }))
    }
}
