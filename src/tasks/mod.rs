//! Shared pipeline steps used by every workflow
//!
//! Each step follows the fit/transform pattern: statistics are computed once
//! during fit and applied during transform. Steps run synchronously and
//! propagate library errors unmodified.

pub mod cleaning;
pub mod evaluate;
pub mod features;
pub mod split;

pub use cleaning::Cleaner;
pub use evaluate::RegressionMetrics;
pub use features::FeatureEngineer;
pub use split::{three_way_split, TrainTestSplit, TrainTestSplitter, SPLIT_RATIOS};
