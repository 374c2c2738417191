//! Gradient boosted trees for regression
//!
//! Boosts shallow regression trees on the residuals of the running
//! prediction, with optional row and column subsampling per round.

use crate::error::{Result, TabflowError};
use crate::models::{DecisionTree, Regressor};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Boosting hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Fraction of rows sampled per boosting round
    pub subsample: f64,
    /// Fraction of features sampled per boosting round
    pub colsample: f64,
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
            subsample: 1.0,
            colsample: 1.0,
            random_state: None,
        }
    }
}

impl GradientBoostingConfig {
    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(TabflowError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.learning_rate <= 0.0 || self.learning_rate > 1.0 {
            return Err(TabflowError::InvalidParameter {
                name: "learning_rate".to_string(),
                value: self.learning_rate.to_string(),
                reason: "must be in (0, 1]".to_string(),
            });
        }
        for (name, value) in [("subsample", self.subsample), ("colsample", self.colsample)] {
            if value <= 0.0 || value > 1.0 {
                return Err(TabflowError::InvalidParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                    reason: "must be in (0, 1]".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// One fitted boosting round
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoostingStage {
    tree: DecisionTree,
    /// Feature indices the round was trained on
    feature_indices: Vec<usize>,
}

/// Gradient boosting regressor with squared-error loss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    pub config: GradientBoostingConfig,
    stages: Vec<BoostingStage>,
    initial_prediction: f64,
    n_features: usize,
    is_fitted: bool,
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self::new(GradientBoostingConfig::default())
    }
}

impl GradientBoostingRegressor {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            stages: Vec::new(),
            initial_prediction: 0.0,
            n_features: 0,
            is_fitted: false,
        }
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }

    fn stage_prediction(stage: &BoostingStage, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_sub = Array2::from_shape_fn((x.nrows(), stage.feature_indices.len()), |(r, c)| {
            x[[r, stage.feature_indices[c]]]
        });
        stage.tree.predict(&x_sub)
    }
}

impl Regressor for GradientBoostingRegressor {
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
        self.config.validate()?;

        self.n_features = n_features;
        self.initial_prediction = y.mean().unwrap_or(0.0);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(
            self.config.random_state.unwrap_or_else(rand::random),
        );

        let n_rows_per_round =
            ((n_samples as f64 * self.config.subsample).round() as usize).clamp(1, n_samples);
        let n_cols_per_round =
            ((n_features as f64 * self.config.colsample).round() as usize).clamp(1, n_features);

        let mut predictions = Array1::from_elem(n_samples, self.initial_prediction);
        self.stages = Vec::with_capacity(self.config.n_estimators);

        let all_rows: Vec<usize> = (0..n_samples).collect();
        let all_cols: Vec<usize> = (0..n_features).collect();

        for _ in 0..self.config.n_estimators {
            // Negative gradient of squared error is just the residual
            let residuals: Array1<f64> = y - &predictions;

            let row_indices: Vec<usize> = if n_rows_per_round < n_samples {
                let mut rows = all_rows.clone();
                rows.shuffle(&mut rng);
                rows.truncate(n_rows_per_round);
                rows
            } else {
                all_rows.clone()
            };

            let mut feature_indices: Vec<usize> = if n_cols_per_round < n_features {
                let mut cols = all_cols.clone();
                cols.shuffle(&mut rng);
                cols.truncate(n_cols_per_round);
                cols
            } else {
                all_cols.clone()
            };
            feature_indices.sort_unstable();

            let x_round = Array2::from_shape_fn(
                (row_indices.len(), feature_indices.len()),
                |(r, c)| x[[row_indices[r], feature_indices[c]]],
            );
            let y_round = Array1::from_shape_fn(row_indices.len(), |r| residuals[row_indices[r]]);

            let mut tree = DecisionTree::new()
                .with_max_depth(self.config.max_depth)
                .with_min_samples_split(self.config.min_samples_split)
                .with_min_samples_leaf(self.config.min_samples_leaf);
            tree.fit(&x_round, &y_round)?;

            let stage = BoostingStage {
                tree,
                feature_indices,
            };

            let stage_preds = Self::stage_prediction(&stage, x)?;
            predictions = predictions + stage_preds * self.config.learning_rate;

            self.stages.push(stage);
        }

        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(TabflowError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(TabflowError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut predictions = Array1::from_elem(x.nrows(), self.initial_prediction);
        for stage in &self.stages {
            let stage_preds = Self::stage_prediction(stage, x)?;
            predictions = predictions + stage_preds * self.config.learning_rate;
        }

        Ok(predictions)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn training_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0],
            [2.0],
            [3.0],
            [4.0],
            [5.0],
            [6.0],
            [7.0],
            [8.0],
            [9.0],
            [10.0]
        ];
        let y = array![2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0];
        (x, y)
    }

    #[test]
    fn test_fit_reduces_error_over_mean_baseline() {
        let (x, y) = training_data();

        let mut model = GradientBoostingRegressor::new(GradientBoostingConfig {
            n_estimators: 50,
            learning_rate: 0.1,
            random_state: Some(42),
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        let mse: f64 = preds
            .iter()
            .zip(y.iter())
            .map(|(p, t)| (p - t).powi(2))
            .sum::<f64>()
            / y.len() as f64;

        let y_mean = y.mean().unwrap();
        let baseline_mse: f64 = y.iter().map(|t| (t - y_mean).powi(2)).sum::<f64>() / y.len() as f64;

        assert!(mse < baseline_mse * 0.1, "mse {} baseline {}", mse, baseline_mse);
    }

    #[test]
    fn test_same_seed_same_predictions() {
        let (x, y) = training_data();
        let config = GradientBoostingConfig {
            n_estimators: 20,
            subsample: 0.8,
            random_state: Some(9),
            ..Default::default()
        };

        let mut a = GradientBoostingRegressor::new(config.clone());
        let mut b = GradientBoostingRegressor::new(config);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_invalid_learning_rate_rejected() {
        let (x, y) = training_data();
        let mut model = GradientBoostingRegressor::new(GradientBoostingConfig {
            learning_rate: 0.0,
            ..Default::default()
        });
        assert!(matches!(
            model.fit(&x, &y),
            Err(TabflowError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let model = GradientBoostingRegressor::default();
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(TabflowError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_feature_count_mismatch_errors() {
        let (x, y) = training_data();
        let mut model = GradientBoostingRegressor::new(GradientBoostingConfig {
            n_estimators: 5,
            random_state: Some(1),
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();

        assert!(matches!(
            model.predict(&array![[1.0, 2.0]]),
            Err(TabflowError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_bytes_round_trip() {
        let (x, y) = training_data();
        let mut model = GradientBoostingRegressor::new(GradientBoostingConfig {
            n_estimators: 10,
            random_state: Some(3),
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();

        let restored =
            GradientBoostingRegressor::from_bytes(&model.to_bytes().unwrap()).unwrap();
        assert_eq!(model.predict(&x).unwrap(), restored.predict(&x).unwrap());
    }
}
