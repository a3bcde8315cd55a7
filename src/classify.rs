use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use log::info;
use ndarray::{Array1, Array2, Axis};

use crate::types::{AnalysisError, Outcome, TrialRecord};

const MAX_ITERATIONS: u64 = 150;

/// Result of the cross-validated logistic fit of trial outcome on windowed
/// spike count.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    /// Held-out accuracy for each fold, in fold order
    pub fold_accuracies: Vec<f64>,
    /// Mean of the per-fold accuracies
    pub mean_accuracy: f64,
    /// Spike-count coefficient of the final fit on all rows
    pub coefficient: f64,
    /// Intercept of the final fit on all rows
    pub intercept: f64,
    /// Number of trials entering the fit (correct/incorrect only)
    pub num_trials: usize,
}

/// Fits a logistic regression of outcome on total spike count with k-fold
/// cross-validation.
///
/// Only trials labeled correct or incorrect enter the fit; early responses,
/// no-responses, and unlabeled trials are excluded. Folds are contiguous
/// over the combined table order. When the data cannot support the fit
/// (fewer rows than folds, or a single represented class) the function
/// declines with `Ok(None)` rather than failing the run.
pub fn classify_outcomes(
    records: &[TrialRecord],
    folds: usize,
) -> Result<Option<ClassificationReport>, Box<dyn std::error::Error>> {
    if folds < 2 {
        return Err(Box::new(AnalysisError::Other(format!(
            "Cross-validation needs at least 2 folds, got {}",
            folds
        ))));
    }

    // Binary subset: correct = 1, incorrect = 0.
    let labeled: Vec<(f64, usize)> = records
        .iter()
        .filter_map(|r| match r.outcome {
            Some(Outcome::Correct) => Some((r.spike_count as f64, 1)),
            Some(Outcome::Incorrect) => Some((r.spike_count as f64, 0)),
            _ => None,
        })
        .collect();

    let n = labeled.len();
    if n < folds {
        info!(
            "Skipping classification: {} labeled trial{} for {} folds",
            n,
            if n != 1 { "s" } else { "" },
            folds
        );
        return Ok(None);
    }

    let num_correct = labeled.iter().filter(|(_, y)| *y == 1).count();
    if num_correct == 0 || num_correct == n {
        info!("Skipping classification: only one outcome class is present");
        return Ok(None);
    }

    let features = Array2::from_shape_fn((n, 1), |(i, _)| labeled[i].0);
    let targets: Array1<usize> = labeled.iter().map(|&(_, y)| y).collect();

    let mut fold_accuracies = Vec::with_capacity(folds);
    for fold in 0..folds {
        let lo = fold * n / folds;
        let hi = (fold + 1) * n / folds;
        let valid_idx: Vec<usize> = (lo..hi).collect();
        let train_idx: Vec<usize> = (0..lo).chain(hi..n).collect();

        let train_targets = targets.select(Axis(0), &train_idx);
        let train_correct = train_targets.iter().filter(|&&y| y == 1).count();
        if train_correct == 0 || train_correct == train_targets.len() {
            info!("Skipping fold {}: training half has a single class", fold);
            continue;
        }

        let train = Dataset::new(features.select(Axis(0), &train_idx), train_targets);
        let model = LogisticRegression::default()
            .max_iterations(MAX_ITERATIONS)
            .fit(&train)?;

        let predictions = model.predict(&features.select(Axis(0), &valid_idx));
        let hits = predictions
            .iter()
            .zip(valid_idx.iter())
            .filter(|&(&p, &i)| p == targets[i])
            .count();
        fold_accuracies.push(hits as f64 / valid_idx.len() as f64);
    }

    if fold_accuracies.is_empty() {
        info!("Skipping classification: no usable cross-validation fold");
        return Ok(None);
    }

    let mean_accuracy = fold_accuracies.iter().sum::<f64>() / fold_accuracies.len() as f64;

    // Refit on all rows for the reported coefficients.
    let dataset = Dataset::new(features, targets);
    let model = LogisticRegression::default()
        .max_iterations(MAX_ITERATIONS)
        .fit(&dataset)?;

    Ok(Some(ClassificationReport {
        fold_accuracies,
        mean_accuracy,
        coefficient: model.params()[0],
        intercept: model.intercept(),
        num_trials: n,
    }))
}
