//! Shared model evaluation metrics

use crate::error::{Result, TabflowError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The four regression metrics every workflow reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    /// Compute metrics from equal-length prediction/target arrays
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(TabflowError::ShapeError {
                expected: format!("y_pred length = {}", y_true.len()),
                actual: format!("y_pred length = {}", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(TabflowError::DataError(
                "cannot evaluate empty predictions".to_string(),
            ));
        }

        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let y_mean = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2,
        })
    }

    /// The metrics as a name → value mapping
    pub fn into_map(self) -> HashMap<String, f64> {
        HashMap::from([
            ("mse".to_string(), self.mse),
            ("rmse".to_string(), self.rmse),
            ("mae".to_string(), self.mae),
            ("r2".to_string(), self.r2),
        ])
    }
}
