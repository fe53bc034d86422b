//! Logistic regression and decision tree direction classifiers on linfa.
//!
//! Logistic regression is trained on standardized features. The tree is
//! trained on raw features with balanced class weights and scored on its
//! hard predictions, since it exposes no class probabilities.

use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use linfa_trees::DecisionTree;
use log::{debug, info};
use ndarray::{Array1, Array2};

use crate::domain::classification::{
    balanced_weights, cross_validate, FoldPrediction, ModelMetrics, Standardizer, DEFAULT_FOLDS,
};
use crate::domain::error::TraderError;
use crate::domain::features::{FeatureRow, FeatureSet, FEATURE_COUNT, FEATURE_NAMES};
use crate::ports::model_port::ModelPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinfaModelAdapter {
    pub folds: usize,
    pub max_iterations: u64,
    pub tree_max_depth: usize,
}

impl Default for LinfaModelAdapter {
    fn default() -> Self {
        LinfaModelAdapter {
            folds: DEFAULT_FOLDS,
            max_iterations: 1000,
            tree_max_depth: 5,
        }
    }
}

fn model_err(stage: &str, e: impl std::fmt::Display) -> TraderError {
    TraderError::Model {
        reason: format!("{}: {}", stage, e),
    }
}

fn to_matrix(rows: &[FeatureRow]) -> Result<Array2<f64>, TraderError> {
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), FEATURE_COUNT), flat)
        .map_err(|e| model_err("feature matrix", e))
}

fn to_targets(labels: &[bool]) -> Array1<usize> {
    labels.iter().map(|&l| usize::from(l)).collect()
}

impl LinfaModelAdapter {
    fn logistic_fold(&self, train: &FeatureSet, test: &FeatureSet) -> Result<FoldPrediction, TraderError> {
        let scaler = Standardizer::fit(&train.rows);
        let x_train = to_matrix(&scaler.transform(&train.rows))?;
        let x_test = to_matrix(&scaler.transform(&test.rows))?;

        let dataset = Dataset::new(x_train, to_targets(&train.labels));
        let model = LogisticRegression::default()
            .max_iterations(self.max_iterations)
            .fit(&dataset)
            .map_err(|e| model_err("logistic regression", e))?;

        let predicted: Array1<usize> = model.predict(&x_test);
        let scores = model.predict_probabilities(&x_test);
        Ok(FoldPrediction {
            predicted: predicted.iter().map(|&c| c == 1).collect(),
            scores: scores.to_vec(),
        })
    }

    fn tree_fold(&self, train: &FeatureSet, test: &FeatureSet) -> Result<FoldPrediction, TraderError> {
        let x_train = to_matrix(&train.rows)?;
        let x_test = to_matrix(&test.rows)?;
        let weights: Array1<f32> = balanced_weights(&train.labels)
            .into_iter()
            .map(|w| w as f32)
            .collect();

        let dataset = Dataset::new(x_train, to_targets(&train.labels)).with_weights(weights);
        let tree = DecisionTree::<f64, usize>::params()
            .max_depth(Some(self.tree_max_depth))
            .fit(&dataset)
            .map_err(|e| model_err("decision tree", e))?;

        let mut importance: Vec<(&str, f64)> = FEATURE_NAMES
            .iter()
            .copied()
            .zip(tree.feature_importance())
            .collect();
        importance.sort_by(|a, b| b.1.total_cmp(&a.1));
        debug!("Decision tree feature importances: {:?}", importance);

        let predicted: Vec<bool> = tree.predict(&x_test).iter().map(|&c| c == 1).collect();
        let scores = predicted.iter().map(|&p| if p { 1.0 } else { 0.0 }).collect();
        Ok(FoldPrediction { predicted, scores })
    }
}

impl ModelPort for LinfaModelAdapter {
    fn name(&self) -> &str {
        "linfa"
    }

    fn evaluate(&self, features: &FeatureSet) -> Result<ModelMetrics, TraderError> {
        debug!(
            "Training on {} rows ({} positive) with {} folds",
            features.len(),
            features.positives(),
            self.folds
        );
        let logistic = cross_validate(features, self.folds, |train, test| {
            self.logistic_fold(train, test)
        })?;
        let tree = cross_validate(features, self.folds, |train, test| self.tree_fold(train, test))?;
        info!(
            "Average trained models (cross-validation): logistic_accuracy={:.3}, tree_accuracy={:.3}",
            logistic.accuracy, tree.accuracy
        );
        Ok(ModelMetrics { logistic, tree })
    }
}
