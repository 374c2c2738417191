//! House price trainer: synthetic data, boosted trees, persisted artifacts
//!
//! Three-step pipeline per location: generate and split a synthetic house
//! frame, fit a gradient boosting model on the training partition, then
//! load the saved artifact and predict on the held-out test partition.

use crate::artifact::ModelArtifact;
use crate::error::Result;
use crate::models::{
    all_columns_to_matrix, series_to_array, GradientBoostingConfig, GradientBoostingRegressor,
    Regressor,
};
use crate::data::synthetic::{HouseGenerator, HOUSE_COLUMNS};
use crate::tasks::{three_way_split, RegressionMetrics, SPLIT_RATIOS};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default number of houses generated per location
pub const NUM_HOUSES_PER_LOCATION: usize = 1000;

/// Default generation seed
pub const DEFAULT_SEED: u64 = 7;

const TARGET_COLUMN: &str = HOUSE_COLUMNS[0];

/// Train/validation/test partitions of a generated house frame
#[derive(Debug, Clone)]
pub struct SplitDataset {
    pub train: DataFrame,
    pub val: DataFrame,
    pub test: DataFrame,
}

/// Generate `n` synthetic houses and partition them 60/30/10
pub fn generate_and_split_data(n: usize, seed: u64) -> Result<SplitDataset> {
    info!(n, seed, "generating synthetic houses");
    let df = HouseGenerator::new(seed).generate(n)?;
    let (train, val, test) = three_way_split(&df, seed, SPLIT_RATIOS)?;
    info!(
        train = train.height(),
        val = val.height(),
        test = test.height(),
        "split house frame"
    );
    Ok(SplitDataset { train, val, test })
}

fn features_and_target(df: &DataFrame) -> Result<(ndarray::Array2<f64>, ndarray::Array1<f64>)> {
    let features = df.drop(TARGET_COLUMN)?;
    let x = all_columns_to_matrix(&features)?;
    let y = series_to_array(df.column(TARGET_COLUMN)?.as_materialized_series())?;
    Ok((x, y))
}

/// Fit a boosted model for `location` and persist it under `workdir`.
///
/// Validation metrics are logged but do not gate the save.
pub fn fit(location: &str, train: &DataFrame, val: &DataFrame, workdir: &Path) -> Result<PathBuf> {
    let (x_train, y_train) = features_and_target(train)?;
    let (x_val, y_val) = features_and_target(val)?;

    info!(location, rows = train.height(), "fitting boosted model");
    let mut model = GradientBoostingRegressor::new(GradientBoostingConfig {
        random_state: Some(42),
        ..Default::default()
    });
    model.fit(&x_train, &y_train)?;

    let val_preds = model.predict(&x_val)?;
    let val_metrics = RegressionMetrics::compute(&y_val, &val_preds)?;
    info!(
        location,
        rmse = val_metrics.rmse,
        r2 = val_metrics.r2,
        "validation metrics"
    );

    let artifact = ModelArtifact::from_model(location, "gradient_boosting", &model)?;
    let path = artifact.save(workdir)?;
    info!(location, path = %path.display(), "saved model artifact");
    Ok(path)
}

/// Load the artifact at `artifact_path` and predict prices for `test`
pub fn predict(test: &DataFrame, artifact_path: &Path) -> Result<Vec<f64>> {
    let artifact = ModelArtifact::load(artifact_path)?;
    let model: GradientBoostingRegressor = artifact.to_model()?;

    let (x_test, _) = features_and_target(test)?;
    let predictions = model.predict(&x_test)?;
    info!(
        name = %artifact.name,
        n = predictions.len(),
        "predicted test partition"
    );
    Ok(predictions.to_vec())
}

/// Full trainer pipeline for one location: generate, fit, predict
pub fn house_price_trainer(
    location: &str,
    seed: u64,
    num_houses: usize,
    workdir: &Path,
) -> Result<Vec<f64>> {
    let dataset = generate_and_split_data(num_houses, seed)?;
    let artifact_path = fit(location, &dataset.train, &dataset.val, workdir)?;
    predict(&dataset.test, &artifact_path)
}
