use hdf5::types::VarLenUnicode;
use log::{info, warn};
use std::path::Path;

use crate::discover;
use crate::types::*;

// In-file locations of the two tables this pipeline consumes. NWB files are
// HDF5; these paths follow the NWB 2.x layout for trial intervals and sorted
// units.
const TRIALS_GROUP: &str = "intervals/trials";
const UNITS_GROUP: &str = "units";

// Trial table columns
const COL_START_TIME: &str = "start_time";
const COL_CUE_OFFSET: &str = "cue_offset";
const COL_OUTCOME: &str = "outcome";

// Unit table datasets: spike times are stored flat, with a cumulative index
// giving each unit's end offset into the flat array.
const DS_SPIKE_TIMES: &str = "spike_times";
const DS_SPIKE_INDEX: &str = "spike_times_index";
const DS_UNIT_IDS: &str = "id";

/// Loads one NWB session file and returns a strongly-typed representation.
///
/// Only the trial-interval table and the unit table are read; everything
/// else in the file is ignored. A file without one of those tables yields an
/// empty `trials` or `units` vector rather than an error.
///
/// # Arguments
///
/// * `file_path` - Path to the `.nwb` file to load
///
/// # Returns
///
/// A `Result` containing either the loaded `SessionRecording` or an error.
pub fn load_session<P: AsRef<Path>>(
    file_path: P,
) -> Result<SessionRecording, Box<dyn std::error::Error>> {
    let path = file_path.as_ref();
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let (subject, session) = discover::parse_session_name(stem)
        .ok_or_else(|| AnalysisError::UnrecognizedSessionName(stem.to_string()))?;

    info!("Reading NWB session file {}", path.display());

    let file = hdf5::File::open(path).map_err(AnalysisError::Hdf5Error)?;
    let trials = read_trials(&file)?;
    let units = read_units(&file)?;

    let recording = SessionRecording {
        subject,
        session,
        trials,
        units,
    };

    print_session_summary(&recording);

    Ok(recording)
}

/// Helper function to read the trial-interval table.
///
/// An absent table is an empty contribution, not an error; mismatched column
/// lengths are an error because the file can no longer be interpreted.
fn read_trials(file: &hdf5::File) -> Result<Vec<Trial>, AnalysisError> {
    if !file.link_exists(TRIALS_GROUP) {
        info!("File has no trial-interval table; session contributes no trials");
        return Ok(Vec::new());
    }

    let group = file.group(TRIALS_GROUP)?;
    let start_times: Vec<f64> = group.dataset(COL_START_TIME)?.read_raw()?;
    let cue_offsets: Vec<f64> = group.dataset(COL_CUE_OFFSET)?.read_raw()?;
    let labels = read_outcome_labels(&group, start_times.len());

    if cue_offsets.len() != start_times.len() || labels.len() != start_times.len() {
        return Err(AnalysisError::TrialColumnMismatch);
    }

    let trials = start_times
        .into_iter()
        .zip(cue_offsets)
        .zip(labels)
        .map(|((start_time, cue_offset), outcome_label)| Trial {
            start_time,
            cue_offset,
            outcome_label,
        })
        .collect();

    Ok(trials)
}

/// Helper function to read the outcome label column.
///
/// A missing or unreadable outcome column degrades to empty labels (which
/// map to a missing outcome code downstream) instead of failing the file.
fn read_outcome_labels(group: &hdf5::Group, num_trials: usize) -> Vec<String> {
    let dataset = match group.dataset(COL_OUTCOME) {
        Ok(dataset) => dataset,
        Err(_) => {
            warn!("Trial table has no outcome column; outcomes will be missing");
            return vec![String::new(); num_trials];
        }
    };

    match dataset.read_raw::<VarLenUnicode>() {
        Ok(values) => values.iter().map(|v| v.as_str().to_string()).collect(),
        Err(e) => {
            warn!("Could not read outcome labels ({}); outcomes will be missing", e);
            vec![String::new(); num_trials]
        }
    }
}

/// Helper function to read the unit table.
///
/// Spike times are stored as one flat array plus a cumulative end-offset
/// index, one entry per unit.
fn read_units(file: &hdf5::File) -> Result<Vec<Unit>, AnalysisError> {
    if !file.link_exists(UNITS_GROUP) {
        info!("File has no unit table; session contributes no spikes");
        return Ok(Vec::new());
    }

    let group = file.group(UNITS_GROUP)?;
    let spike_times: Vec<f64> = group.dataset(DS_SPIKE_TIMES)?.read_raw()?;
    let index: Vec<i64> = group.dataset(DS_SPIKE_INDEX)?.read_raw()?;
    let ids = read_unit_ids(&group, index.len());

    build_units(spike_times, index, ids)
}

/// Helper function to read unit identifiers.
///
/// Falls back to sequential ids when the column is absent or does not match
/// the unit count.
fn read_unit_ids(group: &hdf5::Group, num_units: usize) -> Vec<i64> {
    if let Ok(dataset) = group.dataset(DS_UNIT_IDS) {
        if let Ok(ids) = dataset.read_raw::<i64>() {
            if ids.len() == num_units {
                return ids;
            }
            warn!(
                "Unit id column has {} entries for {} units; using sequential ids",
                ids.len(),
                num_units
            );
        }
    }
    (0..num_units as i64).collect()
}

/// Splits the flat spike-time array into per-unit trains using the
/// cumulative end-offset index.
fn build_units(
    spike_times: Vec<f64>,
    index: Vec<i64>,
    ids: Vec<i64>,
) -> Result<Vec<Unit>, AnalysisError> {
    let mut units = Vec::with_capacity(index.len());
    let mut begin = 0usize;

    for (unit_idx, &end) in index.iter().enumerate() {
        if end < begin as i64 || end as usize > spike_times.len() {
            return Err(AnalysisError::SpikeIndexInvalid);
        }
        let end = end as usize;
        units.push(Unit {
            id: ids[unit_idx],
            spike_times: spike_times[begin..end].to_vec(),
        });
        begin = end;
    }

    Ok(units)
}

// Helper function to print a per-session summary
fn print_session_summary(recording: &SessionRecording) {
    info!(
        "Found {} trial{} and {} unit{} ({} spike{} total) for subject {} session {}.",
        recording.trials.len(),
        if recording.trials.len() != 1 { "s" } else { "" },
        recording.units.len(),
        if recording.units.len() != 1 { "s" } else { "" },
        recording.num_spikes(),
        if recording.num_spikes() != 1 { "s" } else { "" },
        recording.subject,
        recording.session
    );
}
