//! Intermediate representation shared by every feature extractor.
//!
//! Built once per input by [`crate::build`] and never mutated afterwards,
//! so it can be read from any number of threads without synchronization.

use std::collections::BTreeMap;

use crate::window::Window;

/// Number of MIDI pitches (0-127).
pub const PITCH_COUNT: usize = 128;

/// Number of pitch classes in an octave.
pub const PITCH_CLASS_COUNT: usize = 12;

/// A paired note-on/note-off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteSpan {
    pub channel: u8,
    pub pitch: u8,
    pub velocity: u8,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl NoteSpan {
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Derived arrays for one time slice (the whole piece or one window).
#[derive(Clone, Debug, PartialEq)]
pub struct NoteSummary {
    pub start_seconds: f64,
    pub end_seconds: f64,
    /// Note counts per MIDI pitch
    pub basic_pitch_histogram: [f64; PITCH_COUNT],
    /// Note counts per pitch class (C = 0)
    pub pitch_class_histogram: [f64; PITCH_CLASS_COUNT],
    /// Velocities per channel in note start order.
    ///
    /// Every channel active anywhere in the piece has an entry, possibly
    /// empty for this slice.
    pub note_loudnesses: BTreeMap<u8, Vec<u8>>,
    /// Notes starting in this slice, ordered by start time
    pub notes: Vec<NoteSpan>,
}

impl NoteSummary {
    /// A slice with no notes.
    pub fn empty(start_seconds: f64, end_seconds: f64, channels: &[u8]) -> Self {
        Self {
            start_seconds,
            end_seconds,
            basic_pitch_histogram: [0.0; PITCH_COUNT],
            pitch_class_histogram: [0.0; PITCH_CLASS_COUNT],
            note_loudnesses: channels.iter().map(|&ch| (ch, Vec::new())).collect(),
            notes: Vec::new(),
        }
    }

    /// Summarize `notes`, which must already be ordered by start time.
    pub fn from_notes(
        start_seconds: f64,
        end_seconds: f64,
        channels: &[u8],
        notes: Vec<NoteSpan>,
    ) -> Self {
        let mut summary = Self::empty(start_seconds, end_seconds, channels);
        for note in &notes {
            summary.basic_pitch_histogram[note.pitch as usize] += 1.0;
            summary.pitch_class_histogram[note.pitch as usize % PITCH_CLASS_COUNT] += 1.0;
            summary
                .note_loudnesses
                .entry(note.channel)
                .or_default()
                .push(note.velocity);
        }
        summary.notes = notes;
        summary
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn is_silent(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// One analysis window and its slice of the piece.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowSlice {
    pub window: Window,
    pub summary: NoteSummary,
}

/// Everything derived from one event stream.
#[derive(Clone, Debug, PartialEq)]
pub struct IntermediateRepresentation {
    /// Time of the last event
    pub duration_seconds: f64,
    /// Channels with at least one note, ascending
    pub channels: Vec<u8>,
    /// The whole piece as a single slice
    pub whole: NoteSummary,
    /// Per-window slices in window order
    pub windows: Vec<WindowSlice>,
}

impl IntermediateRepresentation {
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn window(&self, index: usize) -> Option<&NoteSummary> {
        self.windows.get(index).map(|w| &w.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(channel: u8, pitch: u8, velocity: u8, start: f64) -> NoteSpan {
        NoteSpan {
            channel,
            pitch,
            velocity,
            start_seconds: start,
            end_seconds: start + 0.5,
        }
    }

    #[test]
    fn empty_summary_keeps_channel_entries() {
        let s = NoteSummary::empty(0.0, 10.0, &[0, 9]);
        assert!(s.is_silent());
        assert_eq!(s.note_loudnesses.len(), 2);
        assert!(s.note_loudnesses[&9].is_empty());
        assert!(s.basic_pitch_histogram.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn from_notes_fills_histograms_and_loudness() {
        let notes = vec![
            note(0, 60, 80, 0.0),
            note(1, 72, 90, 0.5),
            note(0, 64, 70, 1.0),
        ];
        let s = NoteSummary::from_notes(0.0, 2.0, &[0, 1], notes);

        assert_eq!(s.note_count(), 3);
        assert_eq!(s.basic_pitch_histogram[60], 1.0);
        assert_eq!(s.basic_pitch_histogram[72], 1.0);
        // 60 and 72 are both C
        assert_eq!(s.pitch_class_histogram[0], 2.0);
        assert_eq!(s.pitch_class_histogram[4], 1.0);
        assert_eq!(s.note_loudnesses[&0], vec![80, 70]);
        assert_eq!(s.note_loudnesses[&1], vec![90]);
        assert_eq!(s.duration_seconds(), 2.0);
    }
}
