//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the clean monthly series (`CleanSeries`) and its invariants
//! - feature rows and columns (`FeatureRow`, `FeatureColumn`)
//! - evaluation outputs (`Scores`, `MetricRecord`)
//! - run configuration (`LoadConfig`, `FeatureConfig`, `EvalConfig`)

pub mod types;

pub use types::*;
