//! Synthetic data sources.
//!
//! - raw attendance export generator (`sample`)

pub mod sample;

pub use sample::*;
