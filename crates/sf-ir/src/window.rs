//! Analysis window layout.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Most windows a single piece may be split into.
pub const MAX_WINDOW_COUNT: usize = 100_000;

/// Invalid window layout parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WindowConfigError {
    #[error("window size must be positive and finite, got {0}")]
    InvalidSize(f64),
    #[error("window overlap must be in [0, 1), got {0}")]
    InvalidOverlap(f64),
}

/// Fixed-size windows with fractional overlap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window length in seconds
    pub size_seconds: f64,
    /// Fraction of each window shared with the next, in [0, 1)
    pub overlap: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size_seconds: 10.0,
            overlap: 0.0,
        }
    }
}

impl WindowConfig {
    pub fn new(size_seconds: f64, overlap: f64) -> Self {
        Self {
            size_seconds,
            overlap,
        }
    }

    /// Distance between consecutive window starts.
    pub fn step_seconds(&self) -> f64 {
        self.size_seconds * (1.0 - self.overlap)
    }

    pub fn validate(&self) -> Result<(), WindowConfigError> {
        if !(self.size_seconds.is_finite() && self.size_seconds > 0.0) {
            return Err(WindowConfigError::InvalidSize(self.size_seconds));
        }
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(WindowConfigError::InvalidOverlap(self.overlap));
        }
        Ok(())
    }

    /// Number of windows [`WindowConfig::windows`] lays out over a piece of
    /// `duration` seconds, saturating at `u64::MAX`.
    pub fn window_count(&self, duration: f64) -> u64 {
        if self.validate().is_err() || !(duration > 0.0) {
            return 1;
        }
        (duration / self.step_seconds()).ceil() as u64
    }

    /// Lay out windows over a piece of `duration` seconds.
    ///
    /// Windows start at 0 and continue while their start precedes the end of
    /// the piece. A zero-length piece (or an invalid layout) gets a single
    /// window.
    pub fn windows(&self, duration: f64) -> Vec<Window> {
        let step = self.step_seconds();
        if self.validate().is_err() || !(duration > 0.0) {
            let end = if self.size_seconds.is_finite() && self.size_seconds > 0.0 {
                self.size_seconds.max(duration)
            } else {
                duration.max(0.0)
            };
            return vec![Window {
                index: 0,
                start_seconds: 0.0,
                end_seconds: end,
            }];
        }

        let mut windows = Vec::new();
        let mut index = 0usize;
        loop {
            // Multiply rather than accumulate so long pieces don't drift
            let start = index as f64 * step;
            if start >= duration {
                break;
            }
            windows.push(Window {
                index,
                start_seconds: start,
                end_seconds: start + self.size_seconds,
            });
            index += 1;
        }
        windows
    }
}

/// A half-open time span `[start, end)` of the piece.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub index: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl Window {
    pub fn contains(&self, seconds: f64) -> bool {
        seconds >= self.start_seconds && seconds < self.end_seconds
    }

    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_overlapping_windows_tile_the_piece() {
        let windows = WindowConfig::new(10.0, 0.0).windows(25.0);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[1].start_seconds, 10.0);
        assert_eq!(windows[2].end_seconds, 30.0);
        assert!(windows.iter().enumerate().all(|(i, w)| w.index == i));
    }

    #[test]
    fn overlap_shortens_step() {
        let cfg = WindowConfig::new(4.0, 0.5);
        assert_eq!(cfg.step_seconds(), 2.0);
        let windows = cfg.windows(8.0);
        let starts: Vec<f64> = windows.iter().map(|w| w.start_seconds).collect();
        assert_eq!(starts, vec![0.0, 2.0, 4.0, 6.0]);
        assert!(windows[0].contains(3.0) && windows[1].contains(3.0));
    }

    #[test]
    fn zero_duration_gets_one_window() {
        let windows = WindowConfig::default().windows(0.0);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].end_seconds, 10.0);
    }

    #[test]
    fn exact_multiple_does_not_add_empty_tail() {
        let windows = WindowConfig::new(5.0, 0.0).windows(10.0);
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn validate_rejects_bad_layouts() {
        assert_eq!(
            WindowConfig::new(0.0, 0.0).validate(),
            Err(WindowConfigError::InvalidSize(0.0))
        );
        assert_eq!(
            WindowConfig::new(1.0, 1.0).validate(),
            Err(WindowConfigError::InvalidOverlap(1.0))
        );
        assert!(WindowConfig::new(1.0, 0.75).validate().is_ok());
    }

    #[test]
    fn invalid_layout_falls_back_to_single_window() {
        let windows = WindowConfig::new(1.0, 1.0).windows(30.0);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].end_seconds, 30.0);
    }

    #[test]
    fn window_count_matches_layout() {
        let c = WindowConfig::new(10.0, 0.5);
        assert_eq!(c.window_count(25.0), c.windows(25.0).len() as u64);
        assert_eq!(c.window_count(0.0), 1);
        // 1/1024 s is exact in binary
        assert_eq!(WindowConfig::new(1.0 / 1024.0, 0.0).window_count(1000.0), 1_024_000);
    }
}
