//! Random forest regressor built on bagged decision trees

use crate::error::{Result, TabflowError};
use crate::models::{DecisionTree, Regressor};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest regressor: averages predictions from bootstrap-trained trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<DecisionTree>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features scanned per split (None = all features)
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub random_state: Option<u64>,
    n_features: usize,
    is_fitted: bool,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomForestRegressor {
    pub fn new() -> Self {
        Self {
            trees: Vec::new(),
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            random_state: None,
            n_features: 0,
            is_fitted: false,
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Mean of the per-tree feature importances
    pub fn feature_importances(&self) -> Option<Array1<f64>> {
        if !self.is_fitted || self.trees.is_empty() {
            return None;
        }

        let mut total = Array1::zeros(self.n_features);
        let mut counted = 0usize;
        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                total = total + imp;
                counted += 1;
            }
        }
        if counted == 0 {
            return None;
        }
        Some(total / counted as f64)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn bootstrap_indices(rng: &mut ChaCha8Rng, n_samples: usize) -> Vec<usize> {
        (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(TabflowError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(TabflowError::DataError(
                "cannot fit on empty data".to_string(),
            ));
        }
        if self.n_estimators == 0 {
            return Err(TabflowError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        self.n_features = n_features;
        let max_features = self.max_features.unwrap_or(n_features).min(n_features);

        let base_seed = self.random_state.unwrap_or_else(rand::random);

        // Pre-draw bootstrap samples sequentially so results are
        // reproducible regardless of the rayon thread count
        let samples: Vec<Vec<usize>> = {
            let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
            (0..self.n_estimators)
                .map(|_| {
                    if self.bootstrap {
                        Self::bootstrap_indices(&mut rng, n_samples)
                    } else {
                        (0..n_samples).collect()
                    }
                })
                .collect()
        };

        let max_depth = self.max_depth;
        let min_samples_split = self.min_samples_split;
        let min_samples_leaf = self.min_samples_leaf;

        self.trees = samples
            .into_par_iter()
            .map(|indices| {
                let n = indices.len();
                let x_boot = Array2::from_shape_fn((n, n_features), |(r, c)| {
                    x[[indices[r], c]]
                });
                let y_boot = Array1::from_shape_fn(n, |r| y[indices[r]]);

                let mut tree = DecisionTree::new()
                    .with_min_samples_split(min_samples_split)
                    .with_min_samples_leaf(min_samples_leaf)
                    .with_max_features(max_features);
                if let Some(depth) = max_depth {
                    tree = tree.with_max_depth(depth);
                }
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<DecisionTree>>>()?;

        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(TabflowError::ModelNotFitted);
        }

        let tree_predictions: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let mut sum = Array1::zeros(x.nrows());
        for preds in &tree_predictions {
            sum = sum + preds;
        }

        Ok(sum / self.trees.len() as f64)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
