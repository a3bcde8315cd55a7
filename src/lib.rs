mod classify;
mod discover;
mod extract;
mod figures;
mod reader;
pub mod types;

use std::error::Error;
use std::path::Path;

// Re-export types
pub use types::*;

pub use classify::{classify_outcomes, ClassificationReport};
pub use discover::find_sessions;
pub use extract::{
    combine_summaries, compute_psth, extract_session, window_spikes, SessionSummary,
};
pub use figures::{render_psth, render_raster};

/// Default analysis window around the cue, in seconds.
pub const DEFAULT_WINDOW: Window = Window {
    start: -1.0,
    end: 2.0,
};

/// Default PSTH bin width, in seconds.
pub const DEFAULT_BIN_WIDTH: f64 = 0.05;

/// Default number of cross-validation folds.
pub const DEFAULT_CV_FOLDS: usize = 5;

/// Loads an NWB session file and returns a struct representation
///
/// Subject and session identifiers are parsed from the file name, which must
/// follow the `sub-<subject>_ses-<session>` convention.
///
/// # Examples
///
/// ```no_run
/// use nwb_spike_analysis::load;
///
/// let result = load("data/sub-mouse01/sub-mouse01_ses-01.nwb");
/// match result {
///     Ok(recording) => println!("Trials: {}", recording.trials.len()),
///     Err(e) => println!("Error loading file: {}", e),
/// }
/// ```
pub fn load<P: AsRef<Path>>(file_path: P) -> Result<SessionRecording, Box<dyn Error>> {
    reader::load_session(file_path)
}
