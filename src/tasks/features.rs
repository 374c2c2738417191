//! Shared feature engineering step
//!
//! For each configured numeric column `c` this adds two derived columns:
//! `{c}_normalized` (z-score) and `{c}_binned` (equal-frequency quartile
//! labels q1..q4). Original columns are left untouched.

use crate::data::is_numeric_dtype;
use crate::error::{Result, TabflowError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const N_BINS: usize = 4;

/// Parameters for one fitted feature column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FeatureParams {
    mean: f64,
    std: f64,
    bin_edges: Vec<f64>,
}

/// Derives normalized and binned columns from numeric features
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureEngineer {
    params: HashMap<String, FeatureParams>,
    columns: Vec<String>,
    is_fitted: bool,
}

impl FeatureEngineer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit scaling and binning parameters for the given columns.
    /// Non-numeric columns are skipped, matching the shared task contract.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| TabflowError::FeatureNotFound(col_name.to_string()))?;
            let series = column.as_materialized_series();

            if !is_numeric_dtype(series.dtype()) {
                continue;
            }

            let ca = series
                .cast(&DataType::Float64)
                .map_err(|e| TabflowError::DataError(e.to_string()))?
                .f64()
                .map_err(|e| TabflowError::DataError(e.to_string()))?
                .clone();

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(1).unwrap_or(1.0);

            let mut values: Vec<f64> = ca.into_iter().flatten().collect();
            let bin_edges = quantile_edges(&mut values)?;

            self.params.insert(
                col_name.to_string(),
                FeatureParams {
                    mean,
                    std: if std == 0.0 { 1.0 } else { std },
                    bin_edges,
                },
            );
            self.columns.push(col_name.to_string());
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Add `{c}_normalized` and `{c}_binned` for every fitted column
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(TabflowError::ModelNotFitted);
        }

        let mut result = df.clone();

        // Iterate in fit order so output column order is deterministic
        for col_name in &self.columns {
            let params = &self.params[col_name];
            let column = df
                .column(col_name)
                .map_err(|_| TabflowError::FeatureNotFound(col_name.clone()))?;
            let ca = column
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| TabflowError::DataError(e.to_string()))?
                .f64()
                .map_err(|e| TabflowError::DataError(e.to_string()))?
                .clone();

            let normalized: Float64Chunked = ca
                .clone()
                .into_iter()
                .map(|opt| opt.map(|v| (v - params.mean) / params.std))
                .collect();
            let normalized = normalized
                .with_name(format!("{col_name}_normalized").into())
                .into_series();

            let labels: Vec<Option<String>> = ca
                .into_iter()
                .map(|opt| opt.map(|v| format!("q{}", find_bin(v, &params.bin_edges) + 1)))
                .collect();
            let binned = Series::new(format!("{col_name}_binned").into(), labels);

            result = result.with_column(normalized)?.clone();
            result = result.with_column(binned)?.clone();
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Columns that were actually fitted (numeric subset of the request)
    pub fn fitted_columns(&self) -> &[String] {
        &self.columns
    }
}

/// Equal-frequency quartile edges from observed values
fn quantile_edges(values: &mut Vec<f64>) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(TabflowError::DataError("Empty column".to_string()));
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut edges = Vec::with_capacity(N_BINS + 1);
    edges.push(values[0]);
    for i in 1..N_BINS {
        let q = i as f64 / N_BINS as f64;
        let idx = (q * (values.len() - 1) as f64) as usize;
        edges.push(values[idx]);
    }
    edges.push(values[values.len() - 1]);

    Ok(edges)
}

/// Which bin a value belongs to; out-of-range values clamp to the last bin
fn find_bin(value: f64, edges: &[f64]) -> usize {
    for (i, window) in edges.windows(2).enumerate() {
        if value >= window[0] && value <= window[1] {
            return i;
        }
    }
    edges.len().saturating_sub(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df!(
            "size" => &[1500.0, 2000.0, 1800.0, 2200.0, 1600.0],
            "bedrooms" => &[3.0, 4.0, 3.0, 4.0, 3.0],
            "price" => &[300_000.0, 400_000.0, 350_000.0, 420_000.0, 310_000.0]
        )
        .unwrap()
    }

    #[test]
    fn test_adds_exactly_two_columns_per_feature() {
        let df = sample_df();
        let before = df.width();

        let result = FeatureEngineer::new()
            .fit_transform(&df, &["size", "bedrooms"])
            .unwrap();

        assert_eq!(result.width(), before + 4);
        assert!(result.column("size_normalized").is_ok());
        assert!(result.column("size_binned").is_ok());
        assert!(result.column("bedrooms_normalized").is_ok());
        assert!(result.column("bedrooms_binned").is_ok());
    }

    #[test]
    fn test_normalized_has_zero_mean() {
        let df = sample_df();
        let result = FeatureEngineer::new().fit_transform(&df, &["size"]).unwrap();

        let col = result.column("size_normalized").unwrap().f64().unwrap();
        assert!(col.mean().unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_binned_labels_are_quartiles() {
        let df = df!(
            "x" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        )
        .unwrap();

        let result = FeatureEngineer::new().fit_transform(&df, &["x"]).unwrap();
        let binned = result.column("x_binned").unwrap().str().unwrap();

        assert_eq!(binned.get(0), Some("q1"));
        assert_eq!(binned.get(7), Some("q4"));
        for v in binned.into_no_null_iter() {
            assert!(matches!(v, "q1" | "q2" | "q3" | "q4"));
        }
    }

    #[test]
    fn test_constant_column_does_not_divide_by_zero() {
        let df = df!("x" => &[5.0, 5.0, 5.0, 5.0]).unwrap();
        let result = FeatureEngineer::new().fit_transform(&df, &["x"]).unwrap();

        let col = result.column("x_normalized").unwrap().f64().unwrap();
        assert!(col.into_no_null_iter().all(|v| v == 0.0));
    }

    #[test]
    fn test_non_numeric_columns_skipped() {
        let df = df!(
            "x" => &[1.0, 2.0, 3.0, 4.0],
            "label" => &["a", "b", "c", "d"]
        )
        .unwrap();

        let mut eng = FeatureEngineer::new();
        let result = eng.fit_transform(&df, &["x", "label"]).unwrap();

        assert_eq!(eng.fitted_columns(), &["x".to_string()]);
        assert!(result.column("label_normalized").is_err());
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let df = df!("x" => &[1.0, 2.0]).unwrap();
        let err = FeatureEngineer::new().fit(&df, &["nope"]).err().unwrap();
        assert!(matches!(err, TabflowError::FeatureNotFound(_)));
    }
}
