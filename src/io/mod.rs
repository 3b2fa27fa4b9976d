//! Input/output helpers.
//!
//! - raw headerless table reading (`raw`)
//! - raw export ingest + normalization (`ingest`)
//! - external prediction files (`predictions`)
//! - CSV/JSON exports (`export`)

pub mod export;
pub mod ingest;
pub mod predictions;
pub mod raw;

pub use export::*;
pub use ingest::*;
pub use predictions::*;
pub use raw::*;
