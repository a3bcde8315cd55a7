use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nwb_spike_analysis::{
    extract_session, window_spikes, SessionRecording, Trial, Unit, DEFAULT_WINDOW,
};

/// Builds a deterministic synthetic session: evenly spaced spikes with a
/// per-unit phase shift, one trial every 10 seconds.
fn synthetic_recording(
    num_trials: usize,
    num_units: usize,
    spikes_per_unit: usize,
) -> SessionRecording {
    let duration = num_trials as f64 * 10.0;

    let units = (0..num_units)
        .map(|u| {
            let phase = u as f64 / num_units as f64;
            let spike_times = (0..spikes_per_unit)
                .map(|i| (i as f64 + phase) * duration / spikes_per_unit as f64)
                .collect();
            Unit {
                id: u as i64,
                spike_times,
            }
        })
        .collect();

    let trials = (0..num_trials)
        .map(|t| Trial {
            start_time: t as f64 * 10.0,
            cue_offset: 1.0,
            outcome_label: if t % 2 == 0 { "correct" } else { "incorrect" }.to_string(),
        })
        .collect();

    SessionRecording {
        subject: "bench".to_string(),
        session: "01".to_string(),
        trials,
        units,
    }
}

pub fn bench_window_spikes(c: &mut Criterion) {
    let recording = synthetic_recording(1, 1, 100_000);

    c.bench_function("window_spikes_100k", |b| {
        b.iter(|| {
            let kept = window_spikes(
                black_box(&recording.units[0].spike_times),
                5.0,
                DEFAULT_WINDOW,
            );
            black_box(kept.len())
        });
    });
}

pub fn bench_extract_session(c: &mut Criterion) {
    let recording = synthetic_recording(100, 16, 5_000);

    c.bench_function("extract_session_100x16", |b| {
        b.iter(|| {
            let summary = extract_session(black_box(&recording), DEFAULT_WINDOW);
            black_box(summary.records.len())
        });
    });
}

criterion_group!(benches, bench_window_spikes, bench_extract_session);
criterion_main!(benches);
