//! Feature-table construction.
//!
//! Responsibilities:
//!
//! - calendar features (pure functions of the date)
//! - lag, rolling-window and momentum features (history-dependent)
//! - public-holiday month flags
//! - assembly into a table with no missing values

pub mod builder;
pub mod calendar;
pub mod holidays;

pub use builder::*;
pub use calendar::*;
pub use holidays::*;
