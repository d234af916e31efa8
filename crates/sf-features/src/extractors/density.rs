//! Note density.

use sf_engine::{
    DependencyValues, Dimensions, FeatureComputationError, FeatureDefinition, FeatureExtractor,
    FeatureValue,
};
use sf_ir::{EventStream, NoteSummary};

pub const NOTE_DENSITY: &str = "Note Density";

/// Notes starting per second of the slice.
pub struct NoteDensity {
    definition: FeatureDefinition,
}

impl NoteDensity {
    pub fn new() -> Self {
        Self {
            definition: FeatureDefinition::new(
                NOTE_DENSITY,
                "Average number of notes per second.",
                true,
                Dimensions::Fixed(1),
            ),
        }
    }
}

impl Default for NoteDensity {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for NoteDensity {
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
            let duration = r.duration_seconds();
            let density = if duration > 0.0 {
                r.note_count() as f64 / duration
            } else {
                0.0
            };
            FeatureValue::scalar(density)
        }))
    }
}
