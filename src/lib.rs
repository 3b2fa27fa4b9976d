//! `er-forecast` library crate.
//!
//! Loads the monthly A&E attendance series from a raw export, builds a
//! leakage-free feature table, and scores forecasts on a validation window.
//! The binary (`erf`) is a thin wrapper so the whole workflow is testable
//! without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod evaluate;
pub mod features;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
