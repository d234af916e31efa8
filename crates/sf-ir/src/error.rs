//! Errors raised while building the intermediate representation.

use thiserror::Error;

/// The event stream is structurally invalid.
///
/// Fatal for the whole extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInputError {
    #[error("ticks per beat must be non-zero")]
    ZeroTicksPerBeat,

    #[error("event {index} has negative timestamp {tick}")]
    NegativeTimestamp { index: usize, tick: i64 },

    #[error("event {index} at tick {tick} precedes the previous event at tick {previous}")]
    OutOfOrder { index: usize, tick: i64, previous: i64 },

    #[error("event {index} uses channel {channel}, expected 0-15")]
    InvalidChannel { index: usize, channel: u8 },

    #[error("event {index} has pitch {pitch}, expected 0-127")]
    InvalidPitch { index: usize, pitch: u8 },

    #[error("event {index} has velocity {velocity}, expected 0-127")]
    InvalidVelocity { index: usize, velocity: u8 },

    #[error("event {index} sets a zero tempo")]
    InvalidTempo { index: usize },

    #[error("{count} notes never terminated (tolerance {tolerance})")]
    UnterminatedNotes { count: usize, tolerance: usize },

    #[error("window layout needs {windows} windows, more than the limit of {limit}")]
    TooManyWindows { windows: u64, limit: usize },
}
