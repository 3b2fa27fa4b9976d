//! Terminal reporting: load, feature and leaderboard summaries.

pub mod format;

pub use format::*;
