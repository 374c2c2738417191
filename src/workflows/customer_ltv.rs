//! Customer lifetime value workflow: random forest over a small curated dataset

use crate::error::Result;
use crate::models::{series_to_array, RandomForestRegressor, Regressor};
use crate::tasks::{Cleaner, FeatureEngineer, RegressionMetrics, TrainTestSplitter};
use crate::workflows::numeric_feature_matrix;
use polars::prelude::*;
use tracing::info;

const FEATURE_COLUMNS: [&str; 2] = ["age", "spending"];
const TARGET_COLUMN: &str = "ltv";
const N_ESTIMATORS: usize = 100;
const RANDOM_STATE: u64 = 42;

/// The curated customer dataset
pub fn load_customer_data() -> Result<DataFrame> {
    Ok(df!(
        "age" => &[25i64, 35, 45, 30, 50],
        "spending" => &[1000.0, 2000.0, 3000.0, 1500.0, 2500.0],
        "ltv" => &[5_000.0, 12_000.0, 20_000.0, 8_000.0, 15_000.0]
    )?)
}

/// Run the full customer LTV pipeline and return test-set metrics
pub fn run() -> Result<RegressionMetrics> {
    info!("loading customer data");
    let df = load_customer_data()?;

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

    info!(n_estimators = N_ESTIMATORS, "fitting random forest");
    let mut model = RandomForestRegressor::new()
        .with_n_estimators(N_ESTIMATORS)
        .with_random_state(RANDOM_STATE);
    model.fit(&x_train, &y_train)?;

    let predictions = model.predict(&x_test)?;
    let metrics = RegressionMetrics::compute(&y_test, &predictions)?;
    info!(mse = metrics.mse, r2 = metrics.r2, "evaluated customer LTV model");

    Ok(metrics)
}
