use ndarray::Array1;
use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// A recording file discovered under the data root.
///
/// One file corresponds to one subject/session pair. The identifiers are
/// parsed from the file name, which follows the `sub-<subject>_ses-<session>`
/// convention used by standardized NWB datasets.
#[derive(Debug, Clone)]
pub struct SessionFile {
    /// Full path to the `.nwb` file
    pub path: PathBuf,
    /// Subject identifier (e.g., "mouse01")
    pub subject: String,
    /// Session identifier (e.g., "20240117")
    pub session: String,
}

/// A single behavioral trial from the session's trial-interval table.
#[derive(Debug, Clone)]
pub struct Trial {
    /// Trial start time, in seconds on the session clock
    pub start_time: f64,
    /// Offset of the behavioral cue from trial start, in seconds
    pub cue_offset: f64,
    /// Raw outcome label as stored in the file (e.g., "correct")
    pub outcome_label: String,
}

impl Trial {
    /// Absolute time of the behavioral cue, in seconds on the session clock.
    pub fn cue_time(&self) -> f64 {
        self.start_time + self.cue_offset
    }
}

/// A single sorted unit and its spike train.
#[derive(Debug, Clone)]
pub struct Unit {
    /// Unit identifier from the file's unit table
    pub id: i64,
    /// Spike timestamps, in seconds on the session clock
    pub spike_times: Vec<f64>,
}

/// Everything this pipeline consumes from one recording file.
///
/// Either table may be empty: a session with no trial metadata or no sorted
/// units is a valid (if uninformative) recording and contributes no rows
/// downstream.
#[derive(Debug, Clone)]
pub struct SessionRecording {
    /// Subject identifier parsed from the file name
    pub subject: String,
    /// Session identifier parsed from the file name
    pub session: String,
    /// Behavioral trials, in table order
    pub trials: Vec<Trial>,
    /// Sorted units, in table order
    pub units: Vec<Unit>,
}

impl SessionRecording {
    /// Returns the total number of spikes across all units.
    pub fn num_spikes(&self) -> usize {
        self.units.iter().map(|u| u.spike_times.len()).sum()
    }

    /// True when the session can contribute no (trial, unit) rows.
    pub fn is_empty(&self) -> bool {
        self.trials.is_empty() || self.units.is_empty()
    }
}

/// Behavioral outcome of a trial, with its fixed numeric code.
///
/// The codes match the convention used throughout the downstream analysis:
/// incorrect = 0, correct = 1, early response = 2, no response = 3. Labels
/// outside the known set map to a missing value (`None`), never to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Wrong response after the cue (code 0)
    Incorrect,
    /// Correct response after the cue (code 1)
    Correct,
    /// Response before the cue (code 2)
    EarlyResponse,
    /// No response within the trial (code 3)
    NoResponse,
}

impl Outcome {
    /// Maps a raw outcome label to its outcome, or `None` if unrecognized.
    pub fn from_label(label: &str) -> Option<Outcome> {
        match label {
            "incorrect" => Some(Outcome::Incorrect),
            "correct" => Some(Outcome::Correct),
            "early" => Some(Outcome::EarlyResponse),
            "no_response" => Some(Outcome::NoResponse),
            _ => None,
        }
    }

    /// Fixed numeric code for this outcome.
    pub fn code(&self) -> u8 {
        match self {
            Outcome::Incorrect => 0,
            Outcome::Correct => 1,
            Outcome::EarlyResponse => 2,
            Outcome::NoResponse => 3,
        }
    }
}

/// One row of the combined trial table.
#[derive(Debug, Clone)]
pub struct TrialRecord {
    /// Subject identifier
    pub subject: String,
    /// Session identifier
    pub session: String,
    /// Zero-based trial index within the session
    pub trial_index: usize,
    /// Total spike count over all units within the analysis window
    pub spike_count: u64,
    /// Mapped outcome, `None` when the label was unrecognized
    pub outcome: Option<Outcome>,
}

/// Cue-aligned spike times for one (trial, unit) pair.
///
/// Times are relative to the trial's cue (0 = cue) and clipped to the
/// analysis window. A pair with no surviving spike still produces a row, so
/// the number of rows is always trials x units for each session.
#[derive(Debug, Clone)]
pub struct RasterRow {
    /// Zero-based trial index within its session
    pub trial_index: usize,
    /// Unit identifier
    pub unit_id: i64,
    /// Cue-relative spike times within the window, sorted ascending
    pub relative_times: Vec<f64>,
}

/// Analysis window around the cue, in seconds.
///
/// Both bounds are inclusive; a spike landing exactly on either edge is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// Left edge, relative to the cue (typically negative)
    pub start: f64,
    /// Right edge, relative to the cue
    pub end: f64,
}

impl Window {
    /// Creates a window; `start` must not exceed `end`.
    pub fn new(start: f64, end: f64) -> Result<Window, AnalysisError> {
        if start > end || !start.is_finite() || !end.is_finite() {
            return Err(AnalysisError::InvalidWindow { start, end });
        }
        Ok(Window { start, end })
    }

    /// True when `t` lies within the window, bounds inclusive.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }

    /// Window length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Peri-stimulus time histogram over all (trial, unit) rows.
#[derive(Debug, Clone)]
pub struct Psth {
    /// Center of each time bin, relative to the cue (s)
    pub bin_centers: Array1<f64>,
    /// Raw spike counts per bin, summed over all rows
    pub counts: Array1<u64>,
    /// Mean firing rate per bin (spikes/s), counts / (rows x bin width)
    pub rates: Array1<f64>,
    /// Bin width in seconds
    pub bin_width: f64,
    /// Number of (trial, unit) rows the histogram averages over
    pub num_rows: usize,
}

/// Custom error types for the analysis pipeline.
///
/// Represents conditions that make a file, a table, or a parameter unusable.
/// Per-file errors are caught at the pipeline level, logged, and the file is
/// skipped; they never abort the run.
#[derive(Debug)]
pub enum AnalysisError {
    /// File name does not follow the `sub-<subject>_ses-<session>` convention
    UnrecognizedSessionName(String),
    /// Trial table columns disagree on the number of trials
    TrialColumnMismatch,
    /// The ragged spike-time index is not monotonic or overruns the data
    SpikeIndexInvalid,
    /// Analysis window bounds are reversed or non-finite
    InvalidWindow { start: f64, end: f64 },
    /// An error reported by the HDF5 library
    Hdf5Error(hdf5::Error),
    /// An I/O error occurred while walking the data directory
    IoError(io::Error),
    /// A general error with a custom message
    Other(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalysisError::UnrecognizedSessionName(name) => {
                write!(f, "Unrecognized session file name: {}", name)
            }
            AnalysisError::TrialColumnMismatch => {
                write!(f, "Trial table columns have mismatched lengths")
            }
            AnalysisError::SpikeIndexInvalid => {
                write!(f, "Spike time index is inconsistent with spike data")
            }
            AnalysisError::InvalidWindow { start, end } => {
                write!(f, "Invalid analysis window [{}, {}]", start, end)
            }
            AnalysisError::Hdf5Error(e) => write!(f, "HDF5 error: {}", e),
            AnalysisError::IoError(e) => write!(f, "IO error: {}", e),
            AnalysisError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for AnalysisError {}

impl From<io::Error> for AnalysisError {
    fn from(error: io::Error) -> Self {
        AnalysisError::IoError(error)
    }
}

impl From<hdf5::Error> for AnalysisError {
    fn from(error: hdf5::Error) -> Self {
        AnalysisError::Hdf5Error(error)
    }
}
