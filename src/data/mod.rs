//! Tabular data utilities
//!
//! Column statistics, CSV loading/saving, and synthetic dataset generation.

pub mod loader;
pub mod synthetic;

pub use loader::{DataLoader, DataSaver};
pub use synthetic::{HouseGenerator, HOUSE_COLUMNS, MAX_YEAR};

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column data type as seen by the pipeline steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
    Unknown,
}

/// Per-column summary statistics computed during fit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStats {
    pub name: String,
    pub dtype: ColumnType,
    pub count: usize,
    pub null_count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

impl FeatureStats {
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
            count: 0,
            null_count: 0,
            mean: None,
            std: None,
            min: None,
            max: None,
            median: None,
        }
    }

    /// Compute statistics from a numeric series
    pub fn from_numeric_series(name: &str, series: &Series) -> Result<Self> {
        let mut stats = Self::new(name, ColumnType::Numeric);
        stats.count = series.len();
        stats.null_count = series.null_count();

        if let Ok(cast) = series.cast(&DataType::Float64) {
            if let Ok(ca) = cast.f64() {
                stats.mean = ca.mean();
                stats.std = ca.std(1);
                stats.min = ca.min();
                stats.max = ca.max();
                stats.median = ca.median();
            }
        }

        Ok(stats)
    }
}

/// Whether a dtype participates in numeric pipeline steps
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_stats_from_series() {
        let s = Series::new("x".into(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let stats = FeatureStats::from_numeric_series("x", &s).unwrap();

        assert_eq!(stats.count, 5);
        assert_eq!(stats.null_count, 0);
        assert!((stats.mean.unwrap() - 3.0).abs() < 1e-10);
        assert_eq!(stats.min.unwrap(), 1.0);
        assert_eq!(stats.max.unwrap(), 5.0);
    }

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(is_numeric_dtype(&DataType::Int32));
        assert!(!is_numeric_dtype(&DataType::String));
    }
}
