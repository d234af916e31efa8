//! Pitch range and its change between windows.

use sf_engine::{
    DependencyValues, Dimensions, FeatureComputationError, FeatureDefinition, FeatureExtractor,
    FeatureValue,
};
use sf_ir::{EventStream, NoteSummary};

pub const RANGE: &str = "Range";
pub const RANGE_CHANGE: &str = "Range Change";

/// Histogram bins at or below this count are treated as empty.
const OCCUPIED_THRESHOLD: f64 = 0.00001;

/// Semitones between the highest and lowest pitch.
///
/// With no occupied bin the lowest pitch stays 127 and the highest 0, so a
/// silent slice yields -127.
fn range_of(histogram: &[f64]) -> f64 {
    let occupied = |count: &f64| *count > OCCUPIED_THRESHOLD;
    let lowest = histogram.iter().position(occupied).unwrap_or(127);
    let highest = histogram.iter().rposition(occupied).unwrap_or(0);
    highest as f64 - lowest as f64
}

/// Semitones between the highest and lowest pitch in the slice.
pub struct Range {
    definition: FeatureDefinition,
}

impl Range {
    pub fn new() -> Self {
        Self {
            definition: FeatureDefinition::new(
                RANGE,
                "Difference in semitones between the highest and lowest pitches.",
                true,
                Dimensions::Fixed(1),
            ),
        }
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for Range {
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
            FeatureValue::scalar(range_of(&r.basic_pitch_histogram))
        }))
    }
}

/// Range of this window minus range of the previous one.
pub struct RangeChange {
    definition: FeatureDefinition,
}

impl RangeChange {
    pub fn new() -> Self {
        Self {
            definition: FeatureDefinition::new(
                RANGE_CHANGE,
                "Change in range since the previous window.",
                true,
                Dimensions::Fixed(1),
            )
            .with_dependency(RANGE, 0)
            .with_dependency(RANGE, -1),
        }
    }
}

impl Default for RangeChange {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for RangeChange {
    fn definition(&self) -> &FeatureDefinition {
        &self.definition
    }

    fn extract(
        &self,
        _sequence: &EventStream,
        representation: Option<&NoteSummary>,
        dependencies: &DependencyValues<'_>,
    ) -> Result<FeatureValue, FeatureComputationError> {
        if representation.is_none() {
            return Ok(FeatureValue::Unavailable);
        }
        Ok(match (dependencies.get(0).first(), dependencies.get(1).first()) {
            (Some(current), Some(previous)) => FeatureValue::scalar(current - previous),
            _ => FeatureValue::Unavailable,
        })
    }
}
