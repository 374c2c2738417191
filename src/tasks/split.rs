//! Shared train/test splitting logic
//!
//! Two splitters are provided: a two-way feature/target split used by the
//! team workflows, and a fixed-ratio three-way frame split used by the
//! house-price trainer. Both shuffle with a seeded RNG so partitions are
//! reproducible, exact, and disjoint.

use crate::error::{Result, TabflowError};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Train/validation/test ratios used by the house-price trainer
pub const SPLIT_RATIOS: [f64; 3] = [0.6, 0.3, 0.1];

/// Result of a two-way feature/target split
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Series,
    pub y_test: Series,
}

/// Splits a frame into train/test features and targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainTestSplitter {
    test_size: f64,
    seed: u64,
}

impl Default for TrainTestSplitter {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
        }
    }
}

impl TrainTestSplitter {
    pub fn new(test_size: f64, seed: u64) -> Result<Self> {
        if !(0.0..1.0).contains(&test_size) || test_size == 0.0 {
            return Err(TabflowError::InvalidParameter {
                name: "test_size".to_string(),
                value: test_size.to_string(),
                reason: "must be in (0, 1)".to_string(),
            });
        }
        Ok(Self { test_size, seed })
    }

    /// Split `df` into shuffled train/test partitions, separating the target
    /// column from the features.
    pub fn split(&self, df: &DataFrame, target_column: &str) -> Result<TrainTestSplit> {
        let n = df.height();
        if n < 2 {
            return Err(TabflowError::InvalidParameter {
                name: "n_samples".to_string(),
                value: n.to_string(),
                reason: "need at least 2 rows to split".to_string(),
            });
        }
        if df.column(target_column).is_err() {
            return Err(TabflowError::FeatureNotFound(target_column.to_string()));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let n_test = ((n as f64 * self.test_size).round() as usize).clamp(1, n - 1);
        let (test_idx, train_idx) = indices.split_at(n_test);

        let features = df.drop(target_column)?;
        let target = df
            .column(target_column)?
            .as_materialized_series()
            .clone();

        Ok(TrainTestSplit {
            x_train: take_rows(&features, train_idx)?,
            x_test: take_rows(&features, test_idx)?,
            y_train: take_series_rows(&target, train_idx)?,
            y_test: take_series_rows(&target, test_idx)?,
        })
    }
}

/// Split a frame into train/val/test partitions with the given ratios.
///
/// The test partition is carved off first, then validation, so the test
/// fraction is exact even when rounding leaves a remainder; whatever is left
/// becomes training data.
pub fn three_way_split(
    df: &DataFrame,
    seed: u64,
    ratios: [f64; 3],
) -> Result<(DataFrame, DataFrame, DataFrame)> {
    let sum: f64 = ratios.iter().sum();
    if (sum - 1.0).abs() > 1e-9 {
        return Err(TabflowError::InvalidParameter {
            name: "ratios".to_string(),
            value: format!("{ratios:?}"),
            reason: "must sum to 1.0".to_string(),
        });
    }

    let n = df.height();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = (n as f64 * ratios[2]).round() as usize;
    let n_val = (n as f64 * ratios[1]).round() as usize;

    let (test_idx, rest) = indices.split_at(n_test.min(n));
    let (val_idx, train_idx) = rest.split_at(n_val.min(rest.len()));

    Ok((
        take_rows(df, train_idx)?,
        take_rows(df, val_idx)?,
        take_rows(df, test_idx)?,
    ))
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: IdxCa = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}

fn take_series_rows(series: &Series, indices: &[usize]) -> Result<Series> {
    let idx: IdxCa = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(series.take(&idx)?)
}
