//! # Timing Module
//!
//! Turn parsed measures into the tap windows used to grade player input.
//!
//! ## Purpose
//! The gameplay loop asks this module once per level start for an ordered list of windows,
//! then compares each real-time tap against the window at the current index:
//! 1. **Tap windows** - `[begin, end]` around each audible note, in seconds
//! 2. **Positions** - which (flattened) element produced each window, for highlighting
//!
//! ## Sub-modules
//! - `types` - TapWindow, ScheduledTap, ElementPosition, TimingConfig
//! - `engine` - The walk over flattened elements
//!
//! ## Entry Points
//! - [`tap_windows()`] - Windows only
//! - [`schedule()`] - Windows paired with element positions
//! - [`last_audible()`] - Position of the final tapped note
//!
//! ## Example
//! ```rust
//! use tapnote::parse;
//! use tapnote::timing::{tap_windows, TimingConfig};
//!
//! let measures = parse("4/4: 1 1 1 1").unwrap();
//! let windows = tap_windows(&measures, &TimingConfig::new(120.0, 0.1), 0.0);
//!
//! assert_eq!(windows.len(), 4);
//! assert!((windows[0].center() - 0.05).abs() < 1e-9);
//! assert!((windows[1].center() - 0.55).abs() < 1e-9);
//! ```
//!
//! ## Window Placement
//!
//! ### Lenience
//! - Configured in beats so it scales with tempo: `lenience_seconds = lenience_beats * 60 / tempo`
//! - Every window has half-width `lenience_seconds`
//! - The first window is centered at `start_time + lenience_seconds`, so it never opens before
//!   `start_time`
//!
//! ### Rests
//! - Advance time, emit nothing
//!
//! ### Ties
//! - A tied pair is one sound and one tap: the second note emits no window but still advances
//!   time by its duration
//! - Ties are followed inside tuplets and across tuplet boundaries in both directions
//!
//! ### Tuplets
//! - Inner elements advance time by their real (scaled) durations
//!
//! Windows never overlap as long as the lenience is under half the shortest gap between taps;
//! that is up to the caller's configuration.
//!
//! ## Related Modules
//! - `measure` - `Measure::flatten` supplies the element sequence
//! - `ast` - `is_tie` decides which notes are skipped
//! - `grading` - Consumes the windows

mod types;
mod engine;

#[cfg(test)]
mod tests;

pub use types::{ElementPosition, ScheduledTap, TapWindow, TimingConfig};
pub use engine::{audible_count, last_audible, schedule, tap_windows};
