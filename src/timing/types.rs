//! Timing type definitions
//!
//! This module defines the window and configuration types produced and consumed by the
//! timing engine.

use serde::{Deserialize, Serialize};

/// Default tempo in beats per minute
pub const DEFAULT_TEMPO: f64 = 100.0;

/// Default window half-width in beats
pub const DEFAULT_LENIENCE_BEATS: f64 = 0.1;

/// A time interval `[begin, end]` (seconds) within which a tap counts as accurate for one note
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TapWindow {
    pub begin: f64,
    pub end: f64,
}

impl TapWindow {
    pub fn new(begin: f64, end: f64) -> Self {
        Self { begin, end }
    }

    /// Window of `half_width` seconds on either side of `center`
    pub fn around(center: f64, half_width: f64) -> Self {
        Self {
            begin: center - half_width,
            end: center + half_width,
        }
    }

    pub fn center(&self) -> f64 {
        (self.begin + self.end) / 2.0
    }

    pub fn half_width(&self) -> f64 {
        (self.end - self.begin) / 2.0
    }

    /// Inclusive on both ends
    pub fn contains(&self, time: f64) -> bool {
        time >= self.begin && time <= self.end
    }
}

/// Where a tapped note lives in the flattened element sequence
///
/// - `element`: index into `Measure::flatten(measures)`
/// - `inner`: index inside the tuplet at `element`, if the note is in one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPosition {
    pub element: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner: Option<usize>,
}

impl ElementPosition {
    pub fn top_level(element: usize) -> Self {
        Self { element, inner: None }
    }

    pub fn in_tuplet(element: usize, inner: usize) -> Self {
        Self {
            element,
            inner: Some(inner),
        }
    }
}

/// A tap window together with the note that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTap {
    pub position: ElementPosition,
    pub window: TapWindow,
}

/// Tempo and tap tolerance for a level
///
/// - `tempo`: beats per minute, expected > 0 (a non-positive tempo only logs a warning)
/// - `lenience_beats`: half-width of every tap window, in beats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TimingConfig {
    pub tempo: f64,
    pub lenience_beats: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            lenience_beats: DEFAULT_LENIENCE_BEATS,
        }
    }
}

impl TimingConfig {
    pub fn new(tempo: f64, lenience_beats: f64) -> Self {
        Self {
            tempo,
            lenience_beats,
        }
    }

    /// Lenience converted to seconds at this tempo
    pub fn lenience_seconds(&self) -> f64 {
        self.lenience_beats * 60.0 / self.tempo
    }
}
