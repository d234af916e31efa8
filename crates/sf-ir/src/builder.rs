//! Event stream → intermediate representation.
//!
//! Walks the stream once, pairing note-ons with note-offs per
//! `(channel, pitch)`, converting ticks to seconds through the tempo map,
//! and then slices the resulting notes into analysis windows.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::debug;

use crate::error::MalformedInputError;
use crate::event::{Event, EventPayload, EventStream};
use crate::representation::{IntermediateRepresentation, NoteSpan, NoteSummary, WindowSlice};
use crate::timestamp::TempoMap;
use crate::window::{WindowConfig, MAX_WINDOW_COUNT};

/// Notes left open at the end of a stream before it counts as malformed.
pub const DEFAULT_UNTERMINATED_NOTE_TOLERANCE: usize = 16;

const MAX_CHANNEL: u8 = 15;
const MAX_DATA_BYTE: u8 = 127;

/// Knobs for [`build`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildOptions {
    pub window: WindowConfig,
    /// Notes still sounding at the end of the stream are closed at the last
    /// event; more than this many is an error.
    pub unterminated_note_tolerance: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            unterminated_note_tolerance: DEFAULT_UNTERMINATED_NOTE_TOLERANCE,
        }
    }
}

struct OpenNote {
    /// Index of the note-on event, used to restore start order
    order: usize,
    start_seconds: f64,
    velocity: u8,
}

/// Build the intermediate representation for `stream`.
///
/// Returns `Ok(None)` when the stream has no events at all. A stream with
/// events but no notes yields a representation whose slices are empty.
pub fn build(
    stream: &EventStream,
    options: &BuildOptions,
) -> Result<Option<IntermediateRepresentation>, MalformedInputError> {
    if stream.ticks_per_beat == 0 {
        return Err(MalformedInputError::ZeroTicksPerBeat);
    }
    if stream.is_empty() {
        return Ok(None);
    }

    let mut tempo = TempoMap::new(stream.ticks_per_beat);
    let mut open: BTreeMap<(u8, u8), VecDeque<OpenNote>> = BTreeMap::new();
    let mut paired: Vec<(usize, NoteSpan)> = Vec::new();
    let mut end_seconds = 0.0;

    for (index, event) in stream.events.iter().enumerate() {
        let previous = index.checked_sub(1).map(|i| &stream.events[i]);
        validate_event(index, event, previous)?;

        let seconds = tempo.seconds_at(event.time);
        end_seconds = seconds;
        let channel = event.channel;

        match event.payload {
            EventPayload::Tempo { micros_per_beat } => tempo.push(event.time, micros_per_beat),
            EventPayload::NoteOn { pitch, velocity } if velocity > 0 => {
                open.entry((channel, pitch)).or_default().push_back(OpenNote {
                    order: index,
                    start_seconds: seconds,
                    velocity,
                });
            }
            EventPayload::NoteOn { pitch, .. } | EventPayload::NoteOff { pitch } => {
                match open.get_mut(&(channel, pitch)).and_then(VecDeque::pop_front) {
                    Some(note) => paired.push((
                        note.order,
                        NoteSpan {
                            channel,
                            pitch,
                            velocity: note.velocity,
                            start_seconds: note.start_seconds,
                            end_seconds: seconds,
                        },
                    )),
                    None => debug!(index, channel, pitch, "ignoring note-off with no open note"),
                }
            }
            EventPayload::Meta => {}
        }
    }

    let unterminated: usize = open.values().map(VecDeque::len).sum();
    if unterminated > options.unterminated_note_tolerance {
        return Err(MalformedInputError::UnterminatedNotes {
            count: unterminated,
            tolerance: options.unterminated_note_tolerance,
        });
    }
    if unterminated > 0 {
        debug!(count = unterminated, "closing unterminated notes at end of stream");
        for ((channel, pitch), notes) in open {
            for note in notes {
                paired.push((
                    note.order,
                    NoteSpan {
                        channel,
                        pitch,
                        velocity: note.velocity,
                        start_seconds: note.start_seconds,
                        end_seconds,
                    },
                ));
            }
        }
    }

    paired.sort_by_key(|(order, _)| *order);
    let notes: Vec<NoteSpan> = paired.into_iter().map(|(_, note)| note).collect();
    let channels: Vec<u8> = notes
        .iter()
        .map(|n| n.channel)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let window_count = options.window.window_count(end_seconds);
    if window_count > MAX_WINDOW_COUNT as u64 {
        return Err(MalformedInputError::TooManyWindows {
            windows: window_count,
            limit: MAX_WINDOW_COUNT,
        });
    }
    let layout = options.window.windows(end_seconds);
    let last = layout.len().saturating_sub(1);
    let windows: Vec<WindowSlice> = layout
        .into_iter()
        .map(|window| {
            // The last window also owns notes starting exactly at its end
            let in_window = notes
                .iter()
                .filter(|n| {
                    window.contains(n.start_seconds)
                        || (window.index == last && n.start_seconds >= window.start_seconds)
                })
                .copied()
                .collect();
            WindowSlice {
                summary: NoteSummary::from_notes(
                    window.start_seconds,
                    window.end_seconds,
                    &channels,
                    in_window,
                ),
                window,
            }
        })
        .collect();

    debug!(
        notes = notes.len(),
        channels = channels.len(),
        windows = windows.len(),
        duration_seconds = end_seconds,
        "built intermediate representation"
    );

    Ok(Some(IntermediateRepresentation {
        duration_seconds: end_seconds,
        whole: NoteSummary::from_notes(0.0, end_seconds, &channels, notes),
        channels,
        windows,
    }))
}

fn validate_event(
    index: usize,
    event: &Event,
    previous: Option<&Event>,
) -> Result<(), MalformedInputError> {
    let tick = event.time.tick;
    if event.time.is_negative() {
        return Err(MalformedInputError::NegativeTimestamp { index, tick });
    }
    if let Some(prev) = previous {
        if tick < prev.time.tick {
            return Err(MalformedInputError::OutOfOrder {
                index,
                tick,
                previous: prev.time.tick,
            });
        }
    }

    match event.payload {
        EventPayload::NoteOn { pitch, velocity } => {
            check_note(index, event.channel, pitch)?;
            if velocity > MAX_DATA_BYTE {
                return Err(MalformedInputError::InvalidVelocity { index, velocity });
            }
        }
        EventPayload::NoteOff { pitch } => check_note(index, event.channel, pitch)?,
        EventPayload::Tempo { micros_per_beat: 0 } => {
            return Err(MalformedInputError::InvalidTempo { index })
        }
        EventPayload::Tempo { .. } | EventPayload::Meta => {}
    }
    Ok(())
}

fn check_note(index: usize, channel: u8, pitch: u8) -> Result<(), MalformedInputError> {
    if channel > MAX_CHANNEL {
        return Err(MalformedInputError::InvalidChannel { index, channel });
    }
    if pitch > MAX_DATA_BYTE {
        return Err(MalformedInputError::InvalidPitch { index, pitch });
    }
    Ok(())
}
