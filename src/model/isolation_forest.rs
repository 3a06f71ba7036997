//! Isolation forest anomaly model
//!
//! Random axis-aligned partitioning isolates outliers in fewer splits than
//! inliers. A point's normality is `2^(-E[h(x)] / c(psi))` where `h` is its
//! path length through a tree and `c(psi)` the average path length of an
//! unsuccessful BST search over `psi` samples. The exposed anomaly score
//! subtracts the 0.5 boundary, so positive means anomalous.

use super::AnomalyModel;
use crate::error::ModelError;
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Artifact layout version written by [`IsolationForest::save`]
pub const FORMAT_VERSION: u32 = 1;

/// Decision boundary on the normality scale
const DEFAULT_OFFSET: f64 = 0.5;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Fitting hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees
    pub n_estimators: usize,
    /// Subsample size per tree; `None` means `min(256, n)`
    pub max_samples: Option<usize>,
    /// RNG seed
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

/// Single isolation tree stored as a flat node array, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn fit(data: &[Vec<f64>], sample: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(data, sample, 0, max_depth, rng);
        tree
    }

    fn grow(
        &mut self,
        data: &[Vec<f64>],
        sample: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();

        if depth >= max_depth || sample.len() <= 1 {
            self.nodes.push(Node::Leaf { size: sample.len() });
            return id;
        }

        // Only features that still vary inside this node can split it.
        let n_features = data[sample[0]].len();
        let candidates: Vec<(usize, f64, f64)> = (0..n_features)
            .filter_map(|feature| {
                let (lo, hi) = sample.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), &i| (lo.min(data[i][feature]), hi.max(data[i][feature])),
                );
                (hi > lo).then_some((feature, lo, hi))
            })
            .collect();

        if candidates.is_empty() {
            self.nodes.push(Node::Leaf { size: sample.len() });
            return id;
        }

        let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = rng.gen_range(lo..hi);
        let (left_sample, right_sample): (Vec<usize>, Vec<usize>) =
            sample.into_iter().partition(|&i| data[i][feature] <= threshold);

        self.nodes.push(Node::Leaf { size: 0 });
        let left = self.grow(data, left_sample, depth + 1, max_depth, rng);
        let right = self.grow(data, right_sample, depth + 1, max_depth, rng);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };

        id
    }

    fn path_length(&self, x: &[f64]) -> f64 {
        let mut id = 0;
        let mut depth = 0.0;

        loop {
            match &self.nodes[id] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if x[*feature] <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
                Node::Leaf { size } => return depth + average_path_length(*size),
            }
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Corrupt("empty tree".to_string()));
        }

        for (id, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                // Children always follow their parent, which rules out cycles.
                let in_range = |child: usize| child > id && child < self.nodes.len();
                if *feature >= n_features || !threshold.is_finite() {
                    return Err(ModelError::Corrupt(format!("invalid split at node {}", id)));
                }
                if !in_range(*left) || !in_range(*right) {
                    return Err(ModelError::Corrupt(format!(
                        "dangling child reference at node {}",
                        id
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Average path length of an unsuccessful BST search among `n` points
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Fitted isolation forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    format_version: u32,
    n_features: usize,
    max_samples: usize,
    offset: f64,
    trees: Vec<IsolationTree>,
}

impl IsolationForest {
    /// Fit a forest on row-major training data
    pub fn fit(data: &[Vec<f64>], params: &ForestParams) -> Result<Self, ModelError> {
        if data.len() < 2 {
            return Err(ModelError::InvalidTrainingData(format!(
                "need at least 2 samples, got {}",
                data.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(ModelError::InvalidTrainingData(
                "n_estimators must be positive".to_string(),
            ));
        }

        let n_features = data[0].len();
        if n_features == 0 {
            return Err(ModelError::InvalidTrainingData(
                "samples have no features".to_string(),
            ));
        }
        for (row, sample) in data.iter().enumerate() {
            if sample.len() != n_features {
                return Err(ModelError::InvalidTrainingData(format!(
                    "row {} has {} features, expected {}",
                    row,
                    sample.len(),
                    n_features
                )));
            }
            if sample.iter().any(|v| !v.is_finite()) {
                return Err(ModelError::InvalidTrainingData(format!(
                    "row {} contains a non-finite value",
                    row
                )));
            }
        }

        // Split thresholds are drawn uniformly from [min, max), which needs a
        // finite span.
        for feature in 0..n_features {
            let (lo, hi) = data.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), row| {
                (lo.min(row[feature]), hi.max(row[feature]))
            });
            if !(hi - lo).is_finite() {
                return Err(ModelError::InvalidTrainingData(format!(
                    "feature {} spans a range too wide to split",
                    feature
                )));
            }
        }

        let max_samples = params
            .max_samples
            .unwrap_or(256)
            .min(data.len())
            .max(2);
        let max_depth = (max_samples as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let trees = (0..params.n_estimators)
            .map(|_| {
                let sample = index::sample(&mut rng, data.len(), max_samples).into_vec();
                IsolationTree::fit(data, sample, max_depth, &mut rng)
            })
            .collect();

        tracing::debug!(
            n_estimators = params.n_estimators,
            max_samples,
            max_depth,
            "isolation forest fitted"
        );

        Ok(Self {
            format_version: FORMAT_VERSION,
            n_features,
            max_samples,
            offset: DEFAULT_OFFSET,
            trees,
        })
    }

    /// Normality on the `(0, 1]` scale; values near 1 are isolated quickly
    pub fn normality(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.check_input(features)?;

        let mean_depth = self
            .trees
            .iter()
            .map(|tree| tree.path_length(features))
            .sum::<f64>()
            / self.trees.len() as f64;

        Ok(2f64.powf(-mean_depth / average_path_length(self.max_samples)))
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Write the forest as a JSON artifact
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read and verify a JSON artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    /// Parse and verify an in-memory artifact
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let forest: Self = serde_json::from_slice(bytes)?;
        forest.validate()?;
        Ok(forest)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: self.format_version,
                expected: FORMAT_VERSION,
            });
        }
        if self.n_features == 0 || self.max_samples < 2 || self.trees.is_empty() {
            return Err(ModelError::Corrupt(
                "forest header is inconsistent".to_string(),
            ));
        }
        if !self.offset.is_finite() {
            return Err(ModelError::Corrupt("offset is not finite".to_string()));
        }
        self.trees
            .iter()
            .try_for_each(|tree| tree.validate(self.n_features))
    }

    fn check_input(&self, features: &[f64]) -> Result<(), ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        match features.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(ModelError::NonFiniteFeature { index }),
            None => Ok(()),
        }
    }
}

impl AnomalyModel for IsolationForest {
    fn name(&self) -> &str {
        "isolation-forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn anomaly_score(&self, features: &[f64]) -> Result<f64, ModelError> {
        Ok(self.normality(features)? - self.offset)
    }
}
