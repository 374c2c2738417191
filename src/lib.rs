//! tabflow - Tabular regression workflow pipelines
//!
//! Small, linear data pipelines over polars DataFrames: load or generate a
//! dataset, clean it, engineer features, split into partitions, fit a
//! regression model, and evaluate. Fitted models persist as opaque artifacts
//! that downstream steps load back for prediction.
//!
//! # Modules
//!
//! ## Shared tasks
//! - [`tasks`] - Cleaning, feature engineering, splitting, evaluation
//! - [`data`] - Column statistics, CSV loading, synthetic house generation
//!
//! ## Models
//! - [`models`] - Linear regression, decision tree, random forest, gradient boosting
//! - [`artifact`] - Saved model artifacts with provenance metadata
//!
//! ## Pipelines
//! - [`workflows`] - End-to-end workflow compositions
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data and shared tasks
pub mod data;
pub mod tasks;

// Models and persistence
pub mod artifact;
pub mod models;

// Pipelines
pub mod workflows;

// Services
pub mod cli;

pub use error::{Result, TabflowError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, TabflowError};

    // Data
    pub use crate::data::{DataLoader, DataSaver, FeatureStats, HouseGenerator};

    // Shared tasks
    pub use crate::tasks::{
        three_way_split, Cleaner, FeatureEngineer, RegressionMetrics, TrainTestSplit,
        TrainTestSplitter, SPLIT_RATIOS,
    };

    // Models
    pub use crate::models::{
        DecisionTree, GradientBoostingConfig, GradientBoostingRegressor, LinearRegression,
        RandomForestRegressor, Regressor,
    };

    // Artifacts
    pub use crate::artifact::ModelArtifact;

    // Workflows
    pub use crate::workflows::{house_price_trainer, SplitDataset, NUM_HOUSES_PER_LOCATION};
}
