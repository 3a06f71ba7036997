//! Training of the default vital-sign model
//!
//! The forest is fit on a fixed set of healthy readings with default
//! hyper-parameters. Model selection is out of scope.

use super::{ForestParams, IsolationForest};
use crate::error::ModelError;

/// Healthy reference readings: `[heart_rate, oxygen_level, temperature]`
const HEALTHY_READINGS: [[f64; 3]; 20] = [
    [75.0, 98.5, 37.0],
    [80.0, 99.0, 36.8],
    [72.0, 98.2, 37.1],
    [85.0, 98.8, 36.9],
    [78.0, 99.1, 37.0],
    [88.0, 98.9, 36.8],
    [70.0, 98.0, 37.2],
    [90.0, 99.5, 36.7],
    [76.0, 98.6, 37.1],
    [81.0, 99.2, 36.9],
    [73.0, 98.3, 37.0],
    [86.0, 98.7, 36.8],
    [79.0, 99.3, 37.1],
    [87.0, 98.8, 36.9],
    [71.0, 98.1, 37.2],
    [89.0, 99.4, 36.7],
    [68.0, 99.8, 36.6],
    [92.0, 99.6, 36.8],
    [77.0, 98.4, 37.0],
    [83.0, 99.0, 36.9],
];

/// Healthy training set as row vectors
pub fn healthy_reference_data() -> Vec<Vec<f64>> {
    HEALTHY_READINGS.iter().map(|row| row.to_vec()).collect()
}

/// Fit the default forest on the healthy reference readings
pub fn train_default_model(seed: u64) -> Result<IsolationForest, ModelError> {
    let params = ForestParams {
        seed,
        ..ForestParams::default()
    };
    let forest = IsolationForest::fit(&healthy_reference_data(), &params)?;

    tracing::info!(
        samples = HEALTHY_READINGS.len(),
        trees = forest.n_estimators(),
        seed,
        "trained anomaly model on healthy reference data"
    );

    Ok(forest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnomalyModel;

    #[test]
    fn test_reference_data_shape() {
        let data = healthy_reference_data();
        assert_eq!(data.len(), 20);
        assert!(data.iter().all(|row| row.len() == 3));
    }

    #[test]
    fn test_default_model_separates_fault_vitals() {
        let model = train_default_model(42).unwrap();
        let healthy = model.anomaly_score(&[79.0, 98.9, 36.95]).unwrap();
        let faulty = model.anomaly_score(&[140.0, 80.0, 38.8]).unwrap();

        assert!(faulty > healthy);
        assert!(faulty > 0.0, "fault vitals scored {}", faulty);
    }

    #[test]
    fn test_same_seed_same_model() {
        assert_eq!(train_default_model(42).unwrap(), train_default_model(42).unwrap());
    }
}
