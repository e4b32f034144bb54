pub mod ast;
pub mod error;
pub mod grading;
pub mod level;
pub mod measure;
pub mod notation;
pub mod parser;
pub mod timing;

pub use ast::*;
pub use error::*;
pub use grading::{GradeSummary, TapGrader, TapOutcome};
pub use level::Level;
pub use measure::Measure;
pub use notation::to_notation;
pub use parser::parse;
pub use timing::{
    audible_count, last_audible, schedule, tap_windows, ElementPosition, ScheduledTap, TapWindow,
    TimingConfig,
};

/// Parse a level file and generate its tap windows.
/// This is the main entry point for the library.
pub fn level_windows(source: &str, start_time: f64) -> Result<Vec<TapWindow>, NotationError> {
    Level::from_source(source)?.tap_windows(start_time)
}

/// Parse bare notation (no front matter) and generate tap windows with the given timing
pub fn notation_windows(
    notation: &str,
    config: &TimingConfig,
    start_time: f64,
) -> Result<Vec<TapWindow>, NotationError> {
    let measures = parse(notation)?;
    Ok(tap_windows(&measures, config, start_time))
}
