//! Parsed event stream consumed by the representation builder.

use crate::timestamp::Timestamp;

/// A single timed event.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// When the event fires
    pub time: Timestamp,
    /// MIDI channel (0-15); ignored for tempo and meta events
    pub channel: u8,
    /// What the event does
    pub payload: EventPayload,
}

impl Event {
    /// Create a new event.
    pub fn new(time: Timestamp, channel: u8, payload: EventPayload) -> Self {
        Self {
            time,
            channel,
            payload,
        }
    }

    pub fn note_on(tick: i64, channel: u8, pitch: u8, velocity: u8) -> Self {
        Self::new(
            Timestamp::from_ticks(tick),
            channel,
            EventPayload::NoteOn { pitch, velocity },
        )
    }

    pub fn note_off(tick: i64, channel: u8, pitch: u8) -> Self {
        Self::new(
            Timestamp::from_ticks(tick),
            channel,
            EventPayload::NoteOff { pitch },
        )
    }

    pub fn tempo(tick: i64, micros_per_beat: u32) -> Self {
        Self::new(
            Timestamp::from_ticks(tick),
            0,
            EventPayload::Tempo { micros_per_beat },
        )
    }
}

/// What an event does.
#[derive(Clone, Debug, PartialEq)]
pub enum EventPayload {
    /// Start a note. A velocity of 0 is treated as a note-off.
    NoteOn { pitch: u8, velocity: u8 },
    /// Release a note
    NoteOff { pitch: u8 },
    /// Set tempo in microseconds per beat
    Tempo { micros_per_beat: u32 },
    /// Any other meta event; carried through, never interpreted
    Meta,
}

impl EventPayload {
    /// True for note-on and note-off events.
    pub fn is_note(&self) -> bool {
        matches!(self, Self::NoteOn { .. } | Self::NoteOff { .. })
    }
}

/// An ordered stream of events, as produced by a MIDI parser.
#[derive(Clone, Debug, PartialEq)]
pub struct EventStream {
    /// Timing resolution (ticks per quarter note)
    pub ticks_per_beat: u16,
    /// Events in non-decreasing time order
    pub events: Vec<Event>,
}

impl EventStream {
    /// Create an empty stream.
    pub fn new(ticks_per_beat: u16) -> Self {
        Self {
            ticks_per_beat,
            events: Vec::new(),
        }
    }

    /// Append an event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if any note event is present.
    pub fn has_notes(&self) -> bool {
        self.events.iter().any(|e| e.payload.is_note())
    }
}

impl Extend<Event> for EventStream {
    fn extend<I: IntoIterator<Item = Event>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}
