//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the dataset row type (`SalesRecord`) and its categorical enums
//! - the report selectors (`ReportMode`, year bounds)
//! - report outputs (`ReportResult`, `AggregateView`, `GroupKey`)
//! - run configuration (`RunConfig`, `DataSource`)

pub mod types;

pub use types::*;
