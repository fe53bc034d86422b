//! Classifier evaluation: forward-chaining folds, feature scaling and
//! binary classification scores.
//!
//! The models themselves live behind [`crate::ports::model_port::ModelPort`];
//! this module only needs their per-fold predictions.

use std::ops::Range;

use super::error::TraderError;
use super::features::{FeatureRow, FeatureSet, FEATURE_COUNT};

pub const DEFAULT_FOLDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

fn model_error(reason: String) -> TraderError {
    TraderError::Model { reason }
}

/// Expanding-window folds. Every test block is `n_samples / (n_splits + 1)`
/// rows, the last block ends at `n_samples`, and each fold trains on all
/// rows before its test block.
pub fn time_series_folds(n_samples: usize, n_splits: usize) -> Result<Vec<Fold>, TraderError> {
    if n_splits == 0 {
        return Err(model_error("at least one fold is required".into()));
    }
    if n_samples < n_splits + 1 {
        return Err(model_error(format!(
            "{} samples cannot be split into {} folds",
            n_samples, n_splits
        )));
    }

    let test_size = n_samples / (n_splits + 1);
    let first_test = n_samples - n_splits * test_size;
    Ok((0..n_splits)
        .map(|k| {
            let start = first_test + k * test_size;
            Fold {
                train: 0..start,
                test: start..start + test_size,
            }
        })
        .collect())
}

/// Column-wise standardization fitted on training rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    mean: FeatureRow,
    scale: FeatureRow,
}

impl Standardizer {
    /// Population mean and standard deviation per column. Constant columns
    /// keep a scale of 1.
    pub fn fit(rows: &[FeatureRow]) -> Self {
        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [1.0; FEATURE_COUNT];
        if rows.is_empty() {
            return Standardizer { mean, scale };
        }

        let n = rows.len() as f64;
        for col in 0..FEATURE_COUNT {
            let m = rows.iter().map(|r| r[col]).sum::<f64>() / n;
            let var = rows.iter().map(|r| (r[col] - m).powi(2)).sum::<f64>() / n;
            mean[col] = m;
            if var > 0.0 {
                scale[col] = var.sqrt();
            }
        }
        Standardizer { mean, scale }
    }

    pub fn transform(&self, rows: &[FeatureRow]) -> Vec<FeatureRow> {
        rows.iter()
            .map(|r| std::array::from_fn(|col| (r[col] - self.mean[col]) / self.scale[col]))
            .collect()
    }
}

/// Per-row weights that give both classes equal total weight.
pub fn balanced_weights(labels: &[bool]) -> Vec<f64> {
    let n = labels.len() as f64;
    let positives = labels.iter().filter(|l| **l).count();
    let negatives = labels.len() - positives;
    let weight = |count: usize| {
        if count == 0 {
            0.0
        } else {
            n / (2.0 * count as f64)
        }
    };
    let (pos_w, neg_w) = (weight(positives), weight(negatives));
    labels
        .iter()
        .map(|&l| if l { pos_w } else { neg_w })
        .collect()
}

/// Area under the ROC curve from positive-class scores, with tied scores
/// sharing their average rank. `None` unless both classes are present.
pub fn roc_auc(actual: &[bool], scores: &[f64]) -> Option<f64> {
    let n = actual.len().min(scores.len());
    let positives = actual[..n].iter().filter(|a| **a).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = avg_rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = (0..n).filter(|&k| actual[k]).map(|k| ranks[k]).sum();
    let p = positives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64))
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
}

impl ClassificationMetrics {
    /// Scores for one test block. Precision, recall and F1 fall back to 0
    /// when their denominator is empty; ROC AUC requires both classes.
    pub fn score(actual: &[bool], predicted: &[bool], scores: &[f64]) -> Result<Self, TraderError> {
        if actual.is_empty() || actual.len() != predicted.len() || actual.len() != scores.len() {
            return Err(model_error(format!(
                "prediction length mismatch: {} labels, {} predictions, {} scores",
                actual.len(),
                predicted.len(),
                scores.len()
            )));
        }

        let (mut tp, mut tn, mut fp, mut fn_) = (0usize, 0usize, 0usize, 0usize);
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a, p) {
                (true, true) => tp += 1,
                (false, false) => tn += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        let roc_auc = roc_auc(actual, scores).ok_or_else(|| {
            model_error("only one class present in test labels, ROC AUC is undefined".into())
        })?;

        Ok(ClassificationMetrics {
            accuracy: ratio(tp + tn, actual.len()),
            precision,
            recall,
            f1,
            roc_auc,
        })
    }

    pub fn mean(folds: &[ClassificationMetrics]) -> Self {
        if folds.is_empty() {
            return Self::default();
        }
        let n = folds.len() as f64;
        let avg = |f: fn(&ClassificationMetrics) -> f64| folds.iter().map(f).sum::<f64>() / n;
        ClassificationMetrics {
            accuracy: avg(|m| m.accuracy),
            precision: avg(|m| m.precision),
            recall: avg(|m| m.recall),
            f1: avg(|m| m.f1),
            roc_auc: avg(|m| m.roc_auc),
        }
    }
}

/// Cross-validated scores of the two direction classifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelMetrics {
    pub logistic: ClassificationMetrics,
    pub tree: ClassificationMetrics,
}

/// Hard predictions for a test block plus positive-class scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoldPrediction {
    pub predicted: Vec<bool>,
    pub scores: Vec<f64>,
}

/// Train and score one classifier on every fold, then average the scores.
pub fn cross_validate<F>(
    features: &FeatureSet,
    n_splits: usize,
    mut fit_predict: F,
) -> Result<ClassificationMetrics, TraderError>
where
    F: FnMut(&FeatureSet, &FeatureSet) -> Result<FoldPrediction, TraderError>,
{
    let folds = time_series_folds(features.len(), n_splits)?;
    let mut scores = Vec::with_capacity(folds.len());
    for fold in folds {
        let train = features.slice(fold.train);
        let test = features.slice(fold.test);
        let prediction = fit_predict(&train, &test)?;
        scores.push(ClassificationMetrics::score(
            &test.labels,
            &prediction.predicted,
            &prediction.scores,
        )?);
    }
    Ok(ClassificationMetrics::mean(&scores))
}
