//! Dataset acquisition: remote download and synthetic samples.

pub mod remote;
pub mod sample;

pub use remote::*;
pub use sample::*;
