//! Anomaly models
//!
//! The prediction service only sees [`AnomalyModel`]. The shipped
//! implementation is an [`IsolationForest`] persisted as a JSON artifact.

pub mod isolation_forest;
pub mod training;

pub use isolation_forest::{ForestParams, IsolationForest};
pub use training::{healthy_reference_data, train_default_model};

use crate::error::ModelError;
use std::path::Path;
use std::sync::Arc;

/// Pre-fit model producing a scalar anomaly score.
///
/// Score convention: `0.0` is the decision boundary, positive values are
/// more anomalous than the boundary and negative values more normal.
/// Implementations must be safe to share across concurrent requests.
pub trait AnomalyModel: Send + Sync {
    /// Human-readable model identifier
    fn name(&self) -> &str;

    /// Expected feature vector length
    fn n_features(&self) -> usize;

    /// Score a single feature vector
    fn anomaly_score(&self, features: &[f64]) -> Result<f64, ModelError>;
}

/// Load the model artifact at `path`
pub fn load_model(path: impl AsRef<Path>) -> Result<Arc<dyn AnomalyModel>, ModelError> {
    let path = path.as_ref();
    let forest = IsolationForest::load(path)?;
    tracing::info!(
        path = %path.display(),
        trees = forest.n_estimators(),
        max_samples = forest.max_samples(),
        "anomaly model loaded"
    );
    Ok(Arc::new(forest))
}

/// Load the model, logging instead of failing when it is unavailable
pub fn try_load_model(path: impl AsRef<Path>) -> Option<Arc<dyn AnomalyModel>> {
    let path = path.as_ref();
    match load_model(path) {
        Ok(model) => Some(model),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to load anomaly model");
            None
        }
    }
}
