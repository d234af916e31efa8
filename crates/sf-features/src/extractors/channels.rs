//! Whole-piece channel usage.

use sf_engine::{
    DependencyValues, Dimensions, FeatureComputationError, FeatureDefinition, FeatureExtractor,
    FeatureValue,
};
use sf_ir::{EventStream, NoteSummary};

pub const CHANNEL_LOUDNESS_AVERAGES: &str = "Channel Loudness Averages";
pub const NUMBER_OF_ACTIVE_CHANNELS: &str = "Number Of Active Channels";

/// Mean note velocity of every active channel, in ascending channel order.
pub struct ChannelLoudnessAverages {
    definition: FeatureDefinition,
}

impl ChannelLoudnessAverages {
    pub fn new() -> Self {
        Self {
            definition: FeatureDefinition::new(
                CHANNEL_LOUDNESS_AVERAGES,
                "Average note velocity of each channel that contains notes.",
                false,
                Dimensions::Variable,
            ),
        }
    }
}

impl Default for ChannelLoudnessAverages {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for ChannelLoudnessAverages {
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
            let averages = r
                .note_loudnesses
                .values()
                .filter(|velocities| !velocities.is_empty())
                .map(|velocities| {
                    let total: f64 = velocities.iter().map(|&v| v as f64).sum();
                    total / velocities.len() as f64
                })
                .collect();
            FeatureValue::Available(averages)
        }))
    }
}

/// Number of channels with at least one note.
pub struct NumberOfActiveChannels {
    definition: FeatureDefinition,
}

impl NumberOfActiveChannels {
    pub fn new() -> Self {
        Self {
            definition: FeatureDefinition::new(
                NUMBER_OF_ACTIVE_CHANNELS,
                "Number of MIDI channels that contain at least one note.",
                false,
                Dimensions::Fixed(1),
            ),
        }
    }
}

impl Default for NumberOfActiveChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for NumberOfActiveChannels {
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
            let active = r.note_loudnesses.values().filter(|v| !v.is_empty()).count();
            FeatureValue::scalar(active as f64)
        }))
    }
}
