//! Forecasters that consume the feature table.
//!
//! The evaluator treats every forecaster as a black box; the built-in ones
//! here are reference baselines that make a leaderboard meaningful without
//! any external predictions.

pub mod model;
pub mod split;

pub use model::*;
pub use split::*;
