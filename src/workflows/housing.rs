//! Housing price workflow: linear model over a small curated dataset

use crate::error::Result;
use crate::models::{series_to_array, LinearRegression, Regressor};
use crate::tasks::{Cleaner, FeatureEngineer, RegressionMetrics, TrainTestSplitter};
use crate::workflows::numeric_feature_matrix;
use polars::prelude::*;
use tracing::info;

const FEATURE_COLUMNS: [&str; 2] = ["size", "bedrooms"];
const TARGET_COLUMN: &str = "price";

/// The curated housing dataset
pub fn load_housing_data() -> Result<DataFrame> {
    Ok(df!(
        "size" => &[1500.0, 2000.0, 1800.0, 2200.0, 1600.0],
        "bedrooms" => &[3i64, 4, 3, 4, 3],
        "price" => &[300_000.0, 400_000.0, 350_000.0, 420_000.0, 310_000.0]
    )?)
}

/// Run the full housing pipeline and return test-set metrics
pub fn run() -> Result<RegressionMetrics> {
    info!("loading housing data");
    let df = load_housing_data()?;

    info!(rows = df.height(), "cleaning");
    let cleaned = Cleaner::new().fit_transform(&df)?;

    info!("engineering features");
    let engineered = FeatureEngineer::new().fit_transform(&cleaned, &FEATURE_COLUMNS)?;

    info!(target = TARGET_COLUMN, "splitting");
    let split = TrainTestSplitter::default().split(&engineered, TARGET_COLUMN)?;

    let (feature_names, x_train) = numeric_feature_matrix(&split.x_train)?;
    let y_train = series_to_array(&split.y_train)?;
    let x_test = crate::models::dataframe_to_matrix(&split.x_test, &feature_names)?;
    let y_test = series_to_array(&split.y_test)?;

    info!(features = feature_names.len(), "fitting linear regression");
    let mut model = LinearRegression::new();
    model.fit(&x_train, &y_train)?;

    let predictions = model.predict(&x_test)?;
    let metrics = RegressionMetrics::compute(&y_test, &predictions)?;
    info!(mse = metrics.mse, r2 = metrics.r2, "evaluated housing model");

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_shape() {
        let df = load_housing_data().unwrap();
        assert_eq!(df.height(), 5);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_workflow_produces_metrics() {
        let metrics = run().unwrap();
        assert!(metrics.mse >= 0.0);
        assert!(metrics.rmse >= 0.0);
        assert!(metrics.mae >= 0.0);
    }
}
