//! # Level Files
//!
//! A level is a notation body with an optional YAML front matter block carrying its number, name,
//! description, tempo and tap lenience.
//!
//! ## Format
//! ```text
//! ---
//! level-number: 3
//! level-name: Syncopation
//! description: Off-beat eighths
//! tempo: 90
//! lenience-beats: 0.1
//! ---
//! 4/4: 0.5/R 0.5 0.5/R 0.5 1 1
//! ```
//!
//! The block may sit at the top or the bottom of the file. Every key is optional:
//! - `level-number` defaults to 1
//! - `tempo` and `lenience-beats` default to [`TimingConfig::default`]
//! - An empty body plays a single 4/4 click-track measure
//!
//! ## Validation
//! - `lenience-beats` must be finite and non-negative (`MetadataError` otherwise)
//! - A non-positive `tempo` is accepted with a warning, like everywhere else
//! - The body is parsed lazily by [`Level::measures`] so a level with broken notation can still
//!   be listed by name
//!
//! ## Example
//! ```rust
//! use tapnote::Level;
//!
//! let source = "---\nlevel-name: Warm up\ntempo: 120\n---\n4/4: 1 1 1 1";
//! let level = Level::from_source(source).unwrap();
//! assert_eq!(level.name(), Some("Warm up"));
//!
//! let windows = level.tap_windows(0.0).unwrap();
//! assert_eq!(windows.len(), 4);
//! ```

use serde::Deserialize;

use crate::ast::{warn_on_tempo, TimeSignature};
use crate::error::NotationError;
use crate::measure::Measure;
use crate::parser::parse;
use crate::timing::{schedule, tap_windows, ScheduledTap, TapWindow, TimingConfig};

/// Line delimiting the front matter block
const FRONT_MATTER_MARKER: &str = "---";

/// Raw front matter for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawLevel {
    level_number: Option<u32>,
    level_name: Option<String>,
    description: Option<String>,
    tempo: Option<f64>,
    lenience_beats: Option<f64>,
}

/// A playable level: metadata plus unparsed notation
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    number: u32,
    name: Option<String>,
    description: Option<String>,
    timing: TimingConfig,
    notation: String,
}

impl Default for Level {
    fn default() -> Self {
        Self {
            number: 1,
            name: None,
            description: None,
            timing: TimingConfig::default(),
            notation: String::new(),
        }
    }
}

impl Level {
    /// Read a level file.
    ///
    /// # Errors
    /// `MetadataError` when the front matter block is unterminated, repeated or sits in the
    /// middle of the notation, is not valid YAML, has unknown keys, or carries an unusable
    /// lenience. The notation body is not checked here.
    pub fn from_source(source: &str) -> Result<Self, NotationError> {
        let (metadata, notation) = split_front_matter(source)?;

        let raw = match metadata {
            Some(content) if !content.trim().is_empty() => {
                serde_yaml::from_str::<RawLevel>(&content)
                    .map_err(|e| NotationError::MetadataError(e.to_string()))?
            }
            _ => RawLevel::default(),
        };

        let defaults = TimingConfig::default();
        let timing = TimingConfig {
            tempo: raw.tempo.unwrap_or(defaults.tempo),
            lenience_beats: raw.lenience_beats.unwrap_or(defaults.lenience_beats),
        };

        if !timing.lenience_beats.is_finite() || timing.lenience_beats < 0.0 {
            return Err(NotationError::MetadataError(format!(
                "Invalid lenience-beats: {} (expected a non-negative number)",
                timing.lenience_beats
            )));
        }
        warn_on_tempo(timing.tempo);

        Ok(Self {
            number: raw.level_number.unwrap_or(1),
            name: raw.level_name,
            description: raw.description,
            timing,
            notation: notation.trim().to_string(),
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Notation body with the front matter removed
    pub fn notation(&self) -> &str {
        &self.notation
    }

    pub fn timing_config(&self) -> TimingConfig {
        self.timing
    }

    /// Parse the body. An empty body yields one 4/4 click-track measure.
    pub fn measures(&self) -> Result<Vec<Measure>, NotationError> {
        if self.notation.is_empty() {
            return Ok(vec![Measure::click_track(TimeSignature::default())?]);
        }
        parse(&self.notation)
    }

    pub fn schedule(&self, start_time: f64) -> Result<Vec<ScheduledTap>, NotationError> {
        Ok(schedule(&self.measures()?, &self.timing, start_time))
    }

    pub fn tap_windows(&self, start_time: f64) -> Result<Vec<TapWindow>, NotationError> {
        Ok(tap_windows(&self.measures()?, &self.timing, start_time))
    }
}

/// Split a level source into its front matter (the lines between a pair of `---` markers)
/// and its notation body.
///
/// The block must close, must be the only one, and must sit above or below the whole body.
fn split_front_matter(source: &str) -> Result<(Option<String>, String), NotationError> {
    let lines: Vec<&str> = source.lines().collect();
    let markers: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim() == FRONT_MATTER_MARKER)
        .map(|(i, _)| i)
        .collect();

    let (open, close) = match markers.as_slice() {
        [] => return Ok((None, source.to_string())),
        [open] => {
            return Err(NotationError::MetadataError(format!(
                "Front matter opened on line {} is never closed with '{}'",
                open + 1,
                FRONT_MATTER_MARKER
            )))
        }
        [open, close] => (*open, *close),
        [_, _, extra, ..] => {
            return Err(NotationError::MetadataError(format!(
                "Unexpected '{}' on line {}: a level has a single front matter block",
                FRONT_MATTER_MARKER,
                extra + 1
            )))
        }
    };

    let is_blank = |line: &&str| line.trim().is_empty();
    let above = &lines[..open];
    let below = &lines[close + 1..];
    if !above.iter().all(is_blank) && !below.iter().all(is_blank) {
        return Err(NotationError::MetadataError(
            "Front matter must come before or after the notation, not in the middle".to_string(),
        ));
    }

    let body = if above.iter().all(is_blank) { below } else { above };
    Ok((Some(lines[open + 1..close].join("\n")), body.join("\n")))
}
