//! End-to-end pipeline workflows
//!
//! Each workflow is a flat, fixed-order composition of the shared tasks:
//! load or generate data, clean, engineer features, split, fit, evaluate.
//! Steps run synchronously and log their boundaries via tracing.

pub mod customer_ltv;
pub mod house_price;
pub mod housing;

pub use house_price::{house_price_trainer, SplitDataset, NUM_HOUSES_PER_LOCATION};

use crate::data::is_numeric_dtype;
use crate::error::Result;
use crate::models::dataframe_to_matrix;
use ndarray::Array2;
use polars::prelude::*;

/// Numeric columns of a frame as a feature matrix, with their names.
///
/// Engineered frames carry string-typed binned columns alongside the
/// numeric ones; models only consume the numeric subset.
pub(crate) fn numeric_feature_matrix(df: &DataFrame) -> Result<(Vec<String>, Array2<f64>)> {
    let names: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect();
    let matrix = dataframe_to_matrix(df, &names)?;
    Ok((names, matrix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_feature_matrix_skips_strings() {
        let df = df!(
            "a" => &[1.0, 2.0],
            "a_binned" => &["q1", "q2"],
            "b" => &[3.0, 4.0]
        )
        .unwrap();

        let (names, matrix) = numeric_feature_matrix(&df).unwrap();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(matrix.shape(), &[2, 2]);
    }
}
