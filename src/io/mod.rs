//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - report exports (CSV) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
