//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - results JSON/markdown and residual CSV (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
