//! Common data cleaning step: duplicate removal and mean imputation

use crate::data::{is_numeric_dtype, FeatureStats};
use crate::error::{Result, TabflowError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cleans a frame by dropping duplicate rows and filling nulls in numeric
/// columns with the column mean observed during fit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cleaner {
    fill_values: HashMap<String, f64>,
    is_fitted: bool,
}

impl Cleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute fill means for every numeric column.
    /// Means are taken after duplicate removal, the same frame transform
    /// later imputes into.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;

        for column in deduped.get_columns() {
            let series = column.as_materialized_series();
            if !is_numeric_dtype(series.dtype()) {
                continue;
            }

            let stats = FeatureStats::from_numeric_series(series.name().as_str(), series)?;
            if let Some(mean) = stats.mean {
                self.fill_values.insert(series.name().to_string(), mean);
            }
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Drop duplicate rows (keep first), then impute nulls with fitted means
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(TabflowError::ModelNotFitted);
        }

        let mut result = df.unique_stable(None, UniqueKeepStrategy::First, None)?;

        for (col_name, &mean) in &self.fill_values {
            let Ok(column) = result.column(col_name) else {
                continue;
            };
            let series = column.as_materialized_series();
            if series.null_count() == 0 {
                continue;
            }

            let ca = series
                .cast(&DataType::Float64)
                .map_err(|e| TabflowError::DataError(e.to_string()))?
                .f64()
                .map_err(|e| TabflowError::DataError(e.to_string()))?
                .clone();

            let filled: Float64Chunked = ca.into_iter().map(|opt| opt.or(Some(mean))).collect();
            result = result
                .with_column(filled.with_name(series.name().clone()).into_series())?
                .clone();
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }
}
