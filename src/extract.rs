use ndarray::Array1;

use crate::types::*;

/// Per-file extraction result: one record per trial and one raster row per
/// (trial, unit) pair.
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    /// Trial records, in trial order
    pub records: Vec<TrialRecord>,
    /// Cue-aligned spike sequences, trial-major then unit order
    pub raster: Vec<RasterRow>,
}

/// Aligns a spike train to an event and clips it to the analysis window.
///
/// Every timestamp is shifted so the event is at 0; values within the window
/// (bounds inclusive) are kept and returned sorted ascending.
///
/// # Arguments
///
/// * `spike_times` - Absolute spike timestamps, in seconds
/// * `event_time` - Absolute time of the aligning event, in seconds
/// * `window` - Window around the event, in seconds
pub fn window_spikes(spike_times: &[f64], event_time: f64, window: Window) -> Vec<f64> {
    let mut relative: Vec<f64> = spike_times
        .iter()
        .map(|&t| t - event_time)
        .filter(|&t| window.contains(t))
        .collect();
    relative.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    relative
}

/// Builds the per-trial and per-(trial, unit) summaries for one session.
///
/// For each trial, every unit's spike train is aligned to the trial's cue
/// and windowed; the trial's spike count is the sum of windowed counts over
/// units. A session without trials or without units contributes nothing.
pub fn extract_session(recording: &SessionRecording, window: Window) -> SessionSummary {
    let mut summary = SessionSummary::default();

    if recording.is_empty() {
        return summary;
    }

    for (trial_index, trial) in recording.trials.iter().enumerate() {
        let cue_time = trial.cue_time();
        let mut spike_count = 0u64;

        for unit in &recording.units {
            let relative_times = window_spikes(&unit.spike_times, cue_time, window);
            spike_count += relative_times.len() as u64;
            summary.raster.push(RasterRow {
                trial_index,
                unit_id: unit.id,
                relative_times,
            });
        }

        summary.records.push(TrialRecord {
            subject: recording.subject.clone(),
            session: recording.session.clone(),
            trial_index,
            spike_count,
            outcome: Outcome::from_label(&trial.outcome_label),
        });
    }

    summary
}

/// Concatenates per-session summaries into one combined summary.
///
/// Row order follows the input order, then trial order within each session.
pub fn combine_summaries<I>(summaries: I) -> SessionSummary
where
    I: IntoIterator<Item = SessionSummary>,
{
    let mut combined = SessionSummary::default();
    for summary in summaries {
        combined.records.extend(summary.records);
        combined.raster.extend(summary.raster);
    }
    combined
}

/// Computes the peri-stimulus time histogram over all raster rows.
///
/// The window is divided into fixed-width bins (the last bin absorbs the
/// inclusive right edge). Rates are counts divided by rows x bin width, so
/// an empty row set produces all-zero rates rather than a division by zero.
pub fn compute_psth(
    rows: &[RasterRow],
    window: Window,
    bin_width: f64,
) -> Result<Psth, AnalysisError> {
    if !bin_width.is_finite() || bin_width <= 0.0 {
        return Err(AnalysisError::Other(format!(
            "Invalid histogram bin width: {}",
            bin_width
        )));
    }

    let num_bins = (window.duration() / bin_width).ceil().max(1.0) as usize;
    let mut counts = Array1::<u64>::zeros(num_bins);

    for row in rows {
        for &t in &row.relative_times {
            let offset = t - window.start;
            let bin = ((offset / bin_width).floor().max(0.0) as usize).min(num_bins - 1);
            counts[bin] += 1;
        }
    }

    let num_rows = rows.len();
    let rates = if num_rows == 0 {
        Array1::zeros(num_bins)
    } else {
        counts.mapv(|c| c as f64 / (num_rows as f64 * bin_width))
    };
    let bin_centers =
        Array1::from_iter((0..num_bins).map(|i| window.start + (i as f64 + 0.5) * bin_width));

    Ok(Psth {
        bin_centers,
        counts,
        rates,
        bin_width,
        num_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Window {
        Window::new(-1.0, 2.0).unwrap()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn windowing_matches_reference_case() {
        let spikes = [8.5, 9.2, 10.3, 11.9, 13.5];
        let kept = window_spikes(&spikes, 10.0, window());
        assert_close(&kept, &[-0.8, 0.3, 1.9]);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let spikes = [9.0, 12.0, 8.999, 12.001];
        let kept = window_spikes(&spikes, 10.0, window());
        assert_close(&kept, &[-1.0, 2.0]);
    }

    #[test]
    fn windowed_spikes_are_sorted() {
        let spikes = [11.5, 10.1, 9.5, 10.9];
        let kept = window_spikes(&spikes, 10.0, window());
        assert_close(&kept, &[-0.5, 0.1, 0.9, 1.5]);
    }

    #[test]
    fn outcome_mapping_is_fixed_and_total() {
        assert_eq!(Outcome::from_label("correct"), Some(Outcome::Correct));
        assert_eq!(Outcome::from_label("incorrect"), Some(Outcome::Incorrect));
        assert_eq!(Outcome::from_label("early"), Some(Outcome::EarlyResponse));
        assert_eq!(Outcome::from_label("no_response"), Some(Outcome::NoResponse));
        assert_eq!(Outcome::from_label("aborted"), None);
        assert_eq!(Outcome::from_label(""), None);

        assert_eq!(Outcome::Incorrect.code(), 0);
        assert_eq!(Outcome::Correct.code(), 1);
        assert_eq!(Outcome::EarlyResponse.code(), 2);
        assert_eq!(Outcome::NoResponse.code(), 3);
    }

    fn two_unit_recording() -> SessionRecording {
        SessionRecording {
            subject: "a".to_string(),
            session: "01".to_string(),
            trials: vec![
                Trial {
                    start_time: 9.0,
                    cue_offset: 1.0,
                    outcome_label: "correct".to_string(),
                },
                Trial {
                    start_time: 19.0,
                    cue_offset: 1.0,
                    outcome_label: "unknown".to_string(),
                },
            ],
            units: vec![
                Unit {
                    id: 0,
                    spike_times: vec![8.5, 9.2, 10.3, 11.9, 13.5],
                },
                Unit {
                    id: 1,
                    spike_times: vec![10.0, 21.5],
                },
            ],
        }
    }

    #[test]
    fn trial_count_is_sum_over_units() {
        let summary = extract_session(&two_unit_recording(), window());

        // Trial 0 (cue at 10): unit 0 keeps 3 spikes, unit 1 keeps 1.
        assert_eq!(summary.records[0].spike_count, 4);
        let per_unit: u64 = summary
            .raster
            .iter()
            .filter(|r| r.trial_index == 0)
            .map(|r| r.relative_times.len() as u64)
            .sum();
        assert_eq!(per_unit, summary.records[0].spike_count);

        // Trial 1 (cue at 20): only unit 1's spike at 21.5 survives.
        assert_eq!(summary.records[1].spike_count, 1);
        assert_eq!(summary.records[1].outcome, None);

        // One raster row per (trial, unit) pair, even when empty.
        assert_eq!(summary.raster.len(), 4);
    }

    #[test]
    fn sessions_without_trials_or_units_contribute_nothing() {
        let mut recording = two_unit_recording();
        recording.units.clear();
        let summary = extract_session(&recording, window());
        assert!(summary.records.is_empty());
        assert!(summary.raster.is_empty());

        let mut recording = two_unit_recording();
        recording.trials.clear();
        let summary = extract_session(&recording, window());
        assert!(summary.records.is_empty());
        assert!(summary.raster.is_empty());
    }

    #[test]
    fn combination_preserves_input_order() {
        let first = extract_session(&two_unit_recording(), window());
        let mut second_recording = two_unit_recording();
        second_recording.subject = "b".to_string();
        let second = extract_session(&second_recording, window());

        let combined = combine_summaries([first.clone(), second]);
        assert_eq!(combined.records.len(), 4);
        assert_eq!(combined.records[0].subject, "a");
        assert_eq!(combined.records[2].subject, "b");
        assert_eq!(combined.raster.len(), first.raster.len() * 2);
    }

    #[test]
    fn psth_rates_recover_mean_count_per_row() {
        let summary = extract_session(&two_unit_recording(), window());
        let psth = compute_psth(&summary.raster, window(), 0.05).unwrap();

        let total_count: u64 = psth.counts.sum();
        let total_spikes: u64 = summary.records.iter().map(|r| r.spike_count).sum();
        assert_eq!(total_count, total_spikes);

        let mean_count_per_row = total_spikes as f64 / summary.raster.len() as f64;
        let rate_sum_times_width: f64 = psth.rates.sum() * psth.bin_width;
        assert!((rate_sum_times_width - mean_count_per_row).abs() < 1e-9);
        assert!(psth.rates.iter().all(|&r| r >= 0.0));
    }

    #[test]
    fn psth_right_edge_lands_in_last_bin() {
        let rows = vec![RasterRow {
            trial_index: 0,
            unit_id: 0,
            relative_times: vec![-1.0, 2.0],
        }];
        let psth = compute_psth(&rows, window(), 0.05).unwrap();

        assert_eq!(psth.counts.len(), 60);
        assert_eq!(psth.counts[0], 1);
        assert_eq!(psth.counts[59], 1);
    }

    #[test]
    fn psth_of_no_rows_is_all_zero() {
        let psth = compute_psth(&[], window(), 0.05).unwrap();
        assert_eq!(psth.num_rows, 0);
        assert!(psth.counts.iter().all(|&c| c == 0));
        assert!(psth.rates.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn psth_rejects_bad_bin_width() {
        assert!(compute_psth(&[], window(), 0.0).is_err());
        assert!(compute_psth(&[], window(), -0.1).is_err());
        assert!(compute_psth(&[], window(), f64::NAN).is_err());
    }
}
