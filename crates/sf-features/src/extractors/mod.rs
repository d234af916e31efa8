//! Built-in feature extractors.

mod channels;
mod density;
mod dynamics;
mod pitch;
mod range;

use sf_engine::FeatureExtractor;

pub use channels::{
    ChannelLoudnessAverages, NumberOfActiveChannels, CHANNEL_LOUDNESS_AVERAGES,
    NUMBER_OF_ACTIVE_CHANNELS,
};
pub use density::{NoteDensity, NOTE_DENSITY};
pub use dynamics::{AverageNoteToNoteDynamicsChange, AVERAGE_NOTE_TO_NOTE_DYNAMICS_CHANGE};
pub use pitch::{
    BasicPitchHistogram, PitchClassDistribution, BASIC_PITCH_HISTOGRAM, PITCH_CLASS_DISTRIBUTION,
};
pub use range::{Range, RangeChange, RANGE, RANGE_CHANGE};

/// Names of every built-in feature, in standard catalog order.
pub const STANDARD_FEATURES: &[&str] = &[
    BASIC_PITCH_HISTOGRAM,
    PITCH_CLASS_DISTRIBUTION,
    RANGE,
    RANGE_CHANGE,
    AVERAGE_NOTE_TO_NOTE_DYNAMICS_CHANGE,
    NOTE_DENSITY,
    CHANNEL_LOUDNESS_AVERAGES,
    NUMBER_OF_ACTIVE_CHANNELS,
];

/// Create a built-in extractor by feature name.
pub fn create_extractor(name: &str) -> Option<Box<dyn FeatureExtractor>> {
    Some(match name {
        BASIC_PITCH_HISTOGRAM => Box::new(BasicPitchHistogram::new()),
        PITCH_CLASS_DISTRIBUTION => Box::new(PitchClassDistribution::new()),
        RANGE => Box::new(Range::new()),
        RANGE_CHANGE => Box::new(RangeChange::new()),
        AVERAGE_NOTE_TO_NOTE_DYNAMICS_CHANGE => Box::new(AverageNoteToNoteDynamicsChange::new()),
        NOTE_DENSITY => Box::new(NoteDensity::new()),
        CHANNEL_LOUDNESS_AVERAGES => Box::new(ChannelLoudnessAverages::new()),
        NUMBER_OF_ACTIVE_CHANNELS => Box::new(NumberOfActiveChannels::new()),
        _ => return None,
    })
}
