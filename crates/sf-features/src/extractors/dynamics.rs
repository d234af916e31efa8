//! Loudness movement between consecutive notes.

use sf_engine::{
    DependencyValues, Dimensions, FeatureComputationError, FeatureDefinition, FeatureExtractor,
    FeatureValue,
};
use sf_ir::{EventStream, NoteSummary};

pub const AVERAGE_NOTE_TO_NOTE_DYNAMICS_CHANGE: &str = "Average Note To Note Dynamics Change";

/// Mean absolute velocity change between successive notes on the same
/// channel, pooled over every channel.
pub struct AverageNoteToNoteDynamicsChange {
    definition: FeatureDefinition,
}

impl AverageNoteToNoteDynamicsChange {
    pub fn new() -> Self {
        Self {
            definition: FeatureDefinition::new(
                AVERAGE_NOTE_TO_NOTE_DYNAMICS_CHANGE,
                "Average change of loudness from one note to the next note in the same channel.",
                true,
                Dimensions::Fixed(1),
            ),
        }
    }
}

impl Default for AverageNoteToNoteDynamicsChange {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for AverageNoteToNoteDynamicsChange {
    fn definition(&self) -> &FeatureDefinition {
        &self.definition
    }

    fn extract(
        &self,
        _sequence: &EventStream,
        representation: Option<&NoteSummary>,
        _dependencies: &DependencyValues<'_>,
    ) -> Result<FeatureValue, FeatureComputationError> {
        let Some(summary) = representation else {
            return Ok(FeatureValue::Unavailable);
        };

        let (total, count) = summary
            .note_loudnesses
            .values()
            .flat_map(|velocities| velocities.windows(2))
            .map(|pair| (pair[1] as f64 - pair[0] as f64).abs())
            .fold((0.0, 0usize), |(sum, n), change| (sum + change, n + 1));

        let mean = if count == 0 { 0.0 } else { total / count as f64 };
        Ok(FeatureValue::scalar(mean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::test_support::{extract, summary};

    #[test]
    fn averages_successive_changes() {
        // |70 - 60| and |50 - 70|
        let s = summary(&[(0, 60, 60), (0, 62, 70), (0, 64, 50)]);
        let ext = AverageNoteToNoteDynamicsChange::new();
        assert_eq!(extract(&ext, Some(&s)), FeatureValue::scalar(15.0));
    }

    #[test]
    fn pools_channels_and_skips_lone_notes() {
        let s = summary(&[(0, 60, 60), (0, 62, 70), (1, 40, 100), (2, 50, 20), (2, 52, 50)]);
        let ext = AverageNoteToNoteDynamicsChange::new();
        // Channel 1 has a single note and contributes nothing: (10 + 30) / 2
        assert_eq!(extract(&ext, Some(&s)), FeatureValue::scalar(20.0));
    }

    #[test]
    fn empty_pool_is_zero() {
        let s = summary(&[(0, 60, 60), (1, 62, 70)]);
        let ext = AverageNoteToNoteDynamicsChange::new();
        assert_eq!(extract(&ext, Some(&s)), FeatureValue::scalar(0.0));
        assert_eq!(extract(&ext, Some(&summary(&[]))), FeatureValue::scalar(0.0));
    }

    #[test]
    fn absent_representation_projects_to_sentinel() {
        let ext = AverageNoteToNoteDynamicsChange::new();
        let value = extract(&ext, None);
        assert_eq!(value.to_legacy(ext.definition().dimensions()), vec![-1.0]);
    }
}
