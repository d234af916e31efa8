//! Core IR types for symfeat.
//!
//! This crate defines the event stream handed over by a score/MIDI parser
//! and the intermediate representation derived from it. The representation
//! is built once per input and shared read-only by every feature extractor.

mod builder;
mod error;
mod event;
mod representation;
mod timestamp;
mod window;

pub use builder::{build, BuildOptions, DEFAULT_UNTERMINATED_NOTE_TOLERANCE};
pub use error::MalformedInputError;
pub use event::{Event, EventPayload, EventStream};
pub use representation::{
    IntermediateRepresentation, NoteSpan, NoteSummary, WindowSlice, PITCH_CLASS_COUNT,
    PITCH_COUNT,
};
pub use timestamp::{TempoMap, Timestamp, DEFAULT_MICROS_PER_BEAT};
pub use window::{Window, WindowConfig, WindowConfigError, MAX_WINDOW_COUNT};
