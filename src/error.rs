//! # Error Types
//!
//! This module defines all error types for the tapnote engine.
//!
//! Errors raised while reading notation carry the 1-indexed source line so a host can point
//! the level author at the offending measure.
//!
//! ## Error Types
//! - `FormatError` - The text does not match the notation grammar
//! - `InvalidArgument` - A constructor was handed values that break an invariant
//! - `InvalidMeasure` - An invariant broke while the parser was building a measure
//! - `MetadataError` - Invalid YAML front matter in a level file
//!
//! ## Usage
//! ```rust
//! use tapnote::{parse, NotationError};
//!
//! match parse("4/4: 1 1 1 1 1") {
//!     Ok(measures) => println!("{} measures", measures.len()),
//!     Err(NotationError::InvalidMeasure { line, message }) => {
//!         eprintln!("Measure on line {} is invalid: {}", line, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotationError {
    /// Grammar error with location information.
    ///
    /// # Example
    /// ```
    /// # use tapnote::NotationError;
    /// let err = NotationError::FormatError {
    ///     line: 2,
    ///     token: "1/Cx4".to_string(),
    ///     message: "Unknown accidental 'x'".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Format error at line 2, token '1/Cx4': Unknown accidental 'x'"
    /// );
    /// ```
    #[error("Format error at line {line}, token '{token}': {message}")]
    FormatError {
        line: usize,
        token: String,
        message: String,
    },

    /// A constructor rejected its arguments (zero duration, nested tuplet, overflowing measure).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An invariant violation found while building the measure on `line`.
    ///
    /// # Example
    /// ```
    /// # use tapnote::NotationError;
    /// let err = NotationError::InvalidMeasure {
    ///     line: 3,
    ///     message: "Elements take 5 beats but the 4/4 measure only holds 4".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Invalid measure at line 3: Elements take 5 beats but the 4/4 measure only holds 4"
    /// );
    /// ```
    #[error("Invalid measure at line {line}: {message}")]
    InvalidMeasure { line: usize, message: String },

    /// Invalid level metadata.
    #[error("Invalid metadata: {0}")]
    MetadataError(String),
}

impl NotationError {
    /// Attach a source line to a constructor error raised during parsing.
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            NotationError::InvalidArgument(message) => {
                NotationError::InvalidMeasure { line, message }
            }
            other => other,
        }
    }
}
