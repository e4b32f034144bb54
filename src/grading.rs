//! # Tap Grading
//!
//! Classify real-time taps against a list of tap windows and keep the accuracy tally.
//!
//! ## Purpose
//! The host loop owns a [`TapGrader`] for the length of a level:
//! - On every frame it calls [`TapGrader::advance`] with the current time
//! - On every player tap it calls [`TapGrader::tap`] and shows the returned [`TapOutcome`]
//! - When [`TapGrader::is_finished`] it reads [`TapGrader::summary`]
//!
//! ## Rules
//! - Only the current window (the first one whose end has not passed) can be hit
//! - A window accepts one accurate tap; a second tap inside it is inaccurate
//! - A window that closes without an accurate tap counts as a missed tap
//! - Accuracy is `accurate / (taps + missed)`, as a rounded percentage
//!
//! ## Example
//! ```rust
//! use tapnote::{TapGrader, TapOutcome, TapWindow};
//!
//! let mut grader = TapGrader::new(vec![TapWindow::around(1.0, 0.1), TapWindow::around(2.0, 0.1)]);
//!
//! assert_eq!(grader.tap(1.05), TapOutcome::Accurate);
//! grader.advance(2.5); // second window passes untapped
//!
//! assert!(grader.is_finished());
//! assert_eq!(grader.accuracy(), Some(50));
//! ```

use serde::Serialize;

use crate::timing::TapWindow;

/// Result of a single tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TapOutcome {
    Accurate,
    Inaccurate,
}

/// Final tally for a graded run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    /// Taps made by the player
    pub taps: usize,
    /// Taps that landed inside an untapped current window
    pub accurate: usize,
    /// Windows that closed without an accurate tap
    pub missed: usize,
    /// Rounded percentage, `None` when nothing was counted
    pub accuracy: Option<u32>,
}

/// Walks a window list by index as time advances
#[derive(Debug, Clone)]
pub struct TapGrader {
    windows: Vec<TapWindow>,
    index: usize,
    current_tapped: bool,
    taps: usize,
    accurate: usize,
    missed: usize,
}

impl TapGrader {
    pub fn new(windows: Vec<TapWindow>) -> Self {
        Self {
            windows,
            index: 0,
            current_tapped: false,
            taps: 0,
            accurate: 0,
            missed: 0,
        }
    }

    /// Move past every window whose end is before `now`.
    ///
    /// Returns how many windows closed during this call.
    pub fn advance(&mut self, now: f64) -> usize {
        let mut closed = 0;

        while let Some(window) = self.windows.get(self.index) {
            if now <= window.end {
                break;
            }
            if !self.current_tapped {
                log::debug!("Window {} closed without a tap", self.index);
                self.missed += 1;
            }
            self.index += 1;
            self.current_tapped = false;
            closed += 1;
        }

        closed
    }

    /// Grade a tap made at `now`
    pub fn tap(&mut self, now: f64) -> TapOutcome {
        self.advance(now);
        self.taps += 1;

        match self.windows.get(self.index) {
            Some(window) if window.contains(now) && !self.current_tapped => {
                self.current_tapped = true;
                self.accurate += 1;
                TapOutcome::Accurate
            }
            _ => TapOutcome::Inaccurate,
        }
    }

    /// The window the next tap is graded against
    pub fn current_window(&self) -> Option<&TapWindow> {
        self.windows.get(self.index)
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn windows(&self) -> &[TapWindow] {
        &self.windows
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.windows.len()
    }

    pub fn accuracy(&self) -> Option<u32> {
        let counted = self.taps + self.missed;
        if counted == 0 {
            return None;
        }
        Some((self.accurate as f64 / counted as f64 * 100.0).round() as u32)
    }

    pub fn summary(&self) -> GradeSummary {
        GradeSummary {
            taps: self.taps,
            accurate: self.accurate,
            missed: self.missed,
            accuracy: self.accuracy(),
        }
    }
}
