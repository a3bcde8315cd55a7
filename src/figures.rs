//! Figure generation using plotters (SVG output)
//!
//! Uses the SVG backend to avoid system font dependencies.

use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use std::path::Path;

use crate::types::{Psth, RasterRow, Window};

const FIGURE_WIDTH: u32 = 900;
const FIGURE_HEIGHT: u32 = 600;

const SPIKE_COLOR: RGBColor = RGBColor(40, 40, 40);
const BAR_COLOR: RGBColor = RGBColor(70, 110, 180);
const CUE_LINE_COLOR: RGBColor = RGBColor(200, 60, 60);

/// Renders the aggregate spike raster: one row per (trial, unit) pair, a dot
/// per spike at its cue-relative time, and a vertical line at the cue.
pub fn render_raster(
    path: &Path,
    rows: &[RasterRow],
    window: Window,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, (FIGURE_WIDTH, FIGURE_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    if rows.is_empty() {
        root.draw(&Text::new(
            "No raster data",
            (FIGURE_WIDTH as i32 / 2 - 60, FIGURE_HEIGHT as i32 / 2),
            ("sans-serif", 20).into_font().color(&BLACK),
        ))?;
        root.present()?;
        return Ok(());
    }

    let num_rows = rows.len();
    let mut chart = ChartBuilder::on(&root)
        .caption("Spike raster, all trials and units", ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(window.start..window.end, 0f64..num_rows as f64)?;

    chart
        .configure_mesh()
        .x_desc("Time from cue (s)")
        .y_desc("(trial, unit) row")
        .draw()?;

    for (row_idx, row) in rows.iter().enumerate() {
        chart.draw_series(
            row.relative_times
                .iter()
                .map(|&t| Circle::new((t, row_idx as f64 + 0.5), 1, SPIKE_COLOR.filled())),
        )?;
    }

    draw_cue_line(&mut chart, num_rows as f64)?;

    root.present()?;
    Ok(())
}

/// Renders the peri-stimulus time histogram as one bar per bin of the mean
/// firing rate, with a vertical line at the cue.
pub fn render_psth(
    path: &Path,
    psth: &Psth,
    window: Window,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, (FIGURE_WIDTH, FIGURE_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    if psth.num_rows == 0 {
        root.draw(&Text::new(
            "No histogram data",
            (FIGURE_WIDTH as i32 / 2 - 70, FIGURE_HEIGHT as i32 / 2),
            ("sans-serif", 20).into_font().color(&BLACK),
        ))?;
        root.present()?;
        return Ok(());
    }

    let max_rate = psth.rates.iter().cloned().fold(0.0, f64::max);
    let y_max = if max_rate > 0.0 { max_rate * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "PSTH, mean over {} (trial, unit) rows, {:.0} ms bins",
                psth.num_rows,
                psth.bin_width * 1000.0
            ),
            ("sans-serif", 20),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(window.start..window.end, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time from cue (s)")
        .y_desc("Firing rate (spikes/s)")
        .draw()?;

    chart.draw_series(psth.rates.iter().enumerate().map(|(i, &rate)| {
        let left = window.start + i as f64 * psth.bin_width;
        let right = (left + psth.bin_width).min(window.end);
        Rectangle::new([(left, 0.0), (right, rate)], BAR_COLOR.filled())
    }))?;

    draw_cue_line(&mut chart, y_max)?;

    root.present()?;
    Ok(())
}

// Helper function to draw the vertical cue marker at t = 0
fn draw_cue_line<DB: DrawingBackend>(
    chart: &mut ChartContext<DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    y_max: f64,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    chart.draw_series(LineSeries::new(
        vec![(0.0, 0.0), (0.0, y_max)],
        CUE_LINE_COLOR.stroke_width(2),
    ))?;
    Ok(())
}
