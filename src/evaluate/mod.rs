//! Forecast evaluation: accuracy metrics and the model leaderboard.

pub mod leaderboard;
pub mod metrics;

pub use leaderboard::*;
pub use metrics::*;
