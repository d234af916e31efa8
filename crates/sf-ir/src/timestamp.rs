//! Tick positions and tempo-aware conversion to seconds.

/// Tempo assumed until the first tempo event (120 BPM).
pub const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;

/// Position in the sequence, in ticks from the start.
///
/// Signed so that a parser can hand over whatever it read; the builder
/// rejects negative positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Absolute tick from sequence start
    pub tick: i64,
}

impl Timestamp {
    /// Create a timestamp at an exact tick.
    pub const fn from_ticks(tick: i64) -> Self {
        Self { tick }
    }

    /// Add ticks to this timestamp.
    pub const fn add_ticks(self, ticks: i64) -> Self {
        Self {
            tick: self.tick + ticks,
        }
    }

    pub const fn is_negative(self) -> bool {
        self.tick < 0
    }
}

#[derive(Clone, Copy, Debug)]
struct TempoChange {
    tick: i64,
    micros_per_beat: u32,
    /// Seconds elapsed at `tick`
    seconds: f64,
}

/// Piecewise-constant tempo map.
///
/// Changes must be pushed in non-decreasing tick order, which is how the
/// builder walks the event stream.
#[derive(Clone, Debug)]
pub struct TempoMap {
    ticks_per_beat: u16,
    changes: Vec<TempoChange>,
}

impl TempoMap {
    /// Create a map at the default tempo.
    pub fn new(ticks_per_beat: u16) -> Self {
        Self {
            ticks_per_beat,
            changes: vec![TempoChange {
                tick: 0,
                micros_per_beat: DEFAULT_MICROS_PER_BEAT,
                seconds: 0.0,
            }],
        }
    }

    /// Record a tempo change at `time`.
    pub fn push(&mut self, time: Timestamp, micros_per_beat: u32) {
        let seconds = self.seconds_at(time);
        match self.changes.last_mut() {
            Some(last) if last.tick == time.tick => last.micros_per_beat = micros_per_beat,
            _ => self.changes.push(TempoChange {
                tick: time.tick,
                micros_per_beat,
                seconds,
            }),
        }
    }

    /// Convert a tick position to seconds from the start.
    pub fn seconds_at(&self, time: Timestamp) -> f64 {
        let idx = self
            .changes
            .partition_point(|c| c.tick <= time.tick)
            .saturating_sub(1);
        let change = &self.changes[idx];
        let beats = (time.tick - change.tick) as f64 / self.ticks_per_beat.max(1) as f64;
        change.seconds + beats * change.micros_per_beat as f64 / 1_000_000.0
    }
}
