use clap::Parser;
use log::error;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use nwb_spike_analysis::{
    classify_outcomes, combine_summaries, compute_psth, extract_session, find_sessions, load,
    render_psth, render_raster, ClassificationReport, Outcome, SessionSummary, TrialRecord,
    Window, DEFAULT_BIN_WIDTH, DEFAULT_CV_FOLDS, DEFAULT_WINDOW,
};

/// Spike/outcome analysis over a directory of NWB recording sessions.
#[derive(Parser)]
#[command(
    name = "nwb_spike_analysis",
    about = "Extract, plot, and classify cue-aligned spike counts from NWB sessions"
)]
struct Cli {
    /// Data root containing the sub-<id> subject directories
    #[arg(short, long, default_value = "data")]
    data_root: PathBuf,

    /// Output directory for figures and the combined trial table
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Left edge of the analysis window relative to the cue (s)
    #[arg(long, default_value_t = DEFAULT_WINDOW.start, allow_negative_numbers = true)]
    window_start: f64,

    /// Right edge of the analysis window relative to the cue (s)
    #[arg(long, default_value_t = DEFAULT_WINDOW.end, allow_negative_numbers = true)]
    window_end: f64,

    /// PSTH bin width (s)
    #[arg(long, default_value_t = DEFAULT_BIN_WIDTH)]
    bin_width: f64,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = DEFAULT_CV_FOLDS)]
    folds: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        error!("Analysis failed: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let tic = Instant::now();
    let window = Window::new(cli.window_start, cli.window_end)?;

    let sessions = find_sessions(&cli.data_root)?;
    println!(
        "Found {} session file{} under {}.",
        sessions.len(),
        if sessions.len() != 1 { "s" } else { "" },
        cli.data_root.display()
    );

    // Any failure inside a single file means that file contributes no data;
    // the run continues with the rest.
    let mut summaries = Vec::new();
    let mut skipped = 0usize;
    for session in &sessions {
        match process_session(&session.path, window) {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                error!("Skipping {}: {}", session.path.display(), e);
                skipped += 1;
            }
        }
    }

    let combined = combine_summaries(summaries);
    print_run_summary(sessions.len(), skipped, &combined);

    fs::create_dir_all(&cli.output_dir)?;

    let table_path = cli.output_dir.join("trial_table.csv");
    write_trial_table(&table_path, &combined.records)?;
    println!("Wrote {}", table_path.display());

    let psth = compute_psth(&combined.raster, window, cli.bin_width)?;

    let raster_path = cli.output_dir.join("raster.svg");
    render_raster(&raster_path, &combined.raster, window)?;
    println!("Wrote {}", raster_path.display());

    let psth_path = cli.output_dir.join("psth.svg");
    render_psth(&psth_path, &psth, window)?;
    println!("Wrote {}", psth_path.display());

    match classify_outcomes(&combined.records, cli.folds)? {
        Some(report) => print_classification_report(&report),
        None => println!("\nClassification skipped: not enough labeled data."),
    }

    println!(
        "\nDone! Elapsed time: {:.1} seconds",
        tic.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Helper function to load and summarize a single session file
fn process_session(path: &Path, window: Window) -> Result<SessionSummary, Box<dyn Error>> {
    let recording = load(path)?;
    Ok(extract_session(&recording, window))
}

// Helper function to print the combined run summary
fn print_run_summary(num_files: usize, skipped: usize, combined: &SessionSummary) {
    println!(
        "Processed {} of {} session file{} ({} skipped).",
        num_files - skipped,
        num_files,
        if num_files != 1 { "s" } else { "" },
        skipped
    );
    println!(
        "Combined table: {} trial{}, {} raster row{}.",
        combined.records.len(),
        if combined.records.len() != 1 { "s" } else { "" },
        combined.raster.len(),
        if combined.raster.len() != 1 { "s" } else { "" },
    );

    let mut tally = [0usize; 4];
    let mut unlabeled = 0usize;
    for record in &combined.records {
        match record.outcome {
            Some(outcome) => tally[outcome.code() as usize] += 1,
            None => unlabeled += 1,
        }
    }
    println!(
        "Outcomes: {} correct, {} incorrect, {} early, {} no response, {} unlabeled.",
        tally[Outcome::Correct.code() as usize],
        tally[Outcome::Incorrect.code() as usize],
        tally[Outcome::EarlyResponse.code() as usize],
        tally[Outcome::NoResponse.code() as usize],
        unlabeled
    );
}

/// Helper function to write the combined trial table as CSV
fn write_trial_table(path: &Path, records: &[TrialRecord]) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["subject", "session", "trial_index", "spike_count", "outcome_code"])?;

    for record in records {
        let trial_index = record.trial_index.to_string();
        let spike_count = record.spike_count.to_string();
        let code = record
            .outcome
            .map(|o| o.code().to_string())
            .unwrap_or_default();
        writer.write_record([
            record.subject.as_str(),
            record.session.as_str(),
            trial_index.as_str(),
            spike_count.as_str(),
            code.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

// Helper function to print the classifier report
fn print_classification_report(report: &ClassificationReport) {
    println!("\nClassification (spike count -> outcome):");
    println!("  Trials used: {}", report.num_trials);
    for (fold, accuracy) in report.fold_accuracies.iter().enumerate() {
        println!("  Fold {} accuracy: {:.3}", fold + 1, accuracy);
    }
    println!(
        "  Mean cross-validated accuracy: {:.3}",
        report.mean_accuracy
    );
    println!("  Coefficient (spike count): {:.6}", report.coefficient);
    println!("  Intercept: {:.6}", report.intercept);
}
