//! Direction-classifier port.

use crate::domain::classification::ModelMetrics;
use crate::domain::error::TraderError;
use crate::domain::features::FeatureSet;

pub trait ModelPort {
    fn name(&self) -> &str;

    /// Cross-validated scores of the logistic and decision-tree classifiers
    /// on one symbol's features.
    fn evaluate(&self, features: &FeatureSet) -> Result<ModelMetrics, TraderError>;
}
