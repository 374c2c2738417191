//! Regression models
//!
//! All computation is delegated to plain ndarray math; models serialize to
//! opaque byte blobs for the artifact layer.

pub mod decision_tree;
pub mod gradient_boosting;
pub mod linear;
pub mod random_forest;

pub use decision_tree::DecisionTree;
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use linear::LinearRegression;
pub use random_forest::RandomForestRegressor;

use crate::error::{Result, TabflowError};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Trait for regression models
pub trait Regressor: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Serialize the fitted model to bytes
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Deserialize a model from bytes
    fn from_bytes(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

/// Extract named columns from a DataFrame into a row-major Array2<f64>
pub fn dataframe_to_matrix(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let series = df
                .column(col_name)
                .map_err(|_| TabflowError::FeatureNotFound(col_name.clone()))?;
            let series_f64 = series
                .cast(&DataType::Float64)
                .map_err(|e| TabflowError::DataError(e.to_string()))?;
            let values: Vec<f64> = series_f64
                .f64()
                .map_err(|e| TabflowError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

/// Every column of a DataFrame as a feature matrix
pub fn all_columns_to_matrix(df: &DataFrame) -> Result<Array2<f64>> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    dataframe_to_matrix(df, &names)
}

/// A polars Series as a dense f64 array
pub fn series_to_array(series: &Series) -> Result<Array1<f64>> {
    let cast = series
        .cast(&DataType::Float64)
        .map_err(|e| TabflowError::DataError(e.to_string()))?;
    let values: Vec<f64> = cast
        .f64()
        .map_err(|e| TabflowError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    Ok(Array1::from_vec(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataframe_to_matrix() {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0],
            "b" => &[4.0, 5.0, 6.0]
        )
        .unwrap();

        let m = dataframe_to_matrix(&df, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(m.shape(), &[3, 2]);
        assert_eq!(m[[0, 0]], 1.0);
        assert_eq!(m[[2, 1]], 6.0);
    }

    #[test]
    fn test_missing_column_errors() {
        let df = df!("a" => &[1.0]).unwrap();
        assert!(dataframe_to_matrix(&df, &["nope".to_string()]).is_err());
    }

    #[test]
    fn test_series_to_array_casts_ints() {
        let s = Series::new("x".into(), &[1i64, 2, 3]);
        let arr = series_to_array(&s).unwrap();
        assert_eq!(arr, ndarray::array![1.0, 2.0, 3.0]);
    }
}
