use nwb_spike_analysis::{extract_session, load, DEFAULT_WINDOW};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Load a single NWB session file
    let recording = load("data/sub-mouse01/sub-mouse01_ses-01.nwb")?;

    // Print basic session information
    println!("Subject: {}", recording.subject);
    println!("Session: {}", recording.session);
    println!("Number of trials: {}", recording.trials.len());
    println!("Number of units: {}", recording.units.len());
    println!("Total spikes: {}", recording.num_spikes());

    // List first few trials
    if !recording.trials.is_empty() {
        println!("\nTrials:");
        for (i, trial) in recording.trials.iter().enumerate().take(5) {
            println!(
                "  {}: start {:.3} s, cue at {:.3} s, outcome \"{}\"",
                i,
                trial.start_time,
                trial.cue_time(),
                trial.outcome_label
            );
        }

        if recording.trials.len() > 5 {
            println!("  ... and {} more", recording.trials.len() - 5);
        }
    }

    // List first few units
    if !recording.units.is_empty() {
        println!("\nUnits:");
        for unit in recording.units.iter().take(5) {
            println!("  {}: {} spikes", unit.id, unit.spike_times.len());
        }

        if recording.units.len() > 5 {
            println!("  ... and {} more", recording.units.len() - 5);
        }
    }

    // Summarize the cue-aligned extraction for this session
    let summary = extract_session(&recording, DEFAULT_WINDOW);

    if summary.records.is_empty() {
        println!("\nSession contributes no analysis rows.");
    } else {
        println!("\nExtraction summary:");
        println!("  Trial records: {}", summary.records.len());
        println!("  Raster rows: {}", summary.raster.len());

        let record = &summary.records[0];
        println!(
            "  First trial: {} windowed spike{}, outcome code {:?}",
            record.spike_count,
            if record.spike_count != 1 { "s" } else { "" },
            record.outcome.map(|o| o.code())
        );
    }

    Ok(())
}
