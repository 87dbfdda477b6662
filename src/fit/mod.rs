//! Two-stage parameter search.
//!
//! Responsibilities:
//!
//! - generate the fixed coarse grid (`grid`)
//! - score every grid triple and keep the first minimum (`coarse`, parallel)
//! - refine the coarse winner by neighbourhood descent (`refine`)

pub mod coarse;
pub mod grid;
pub mod refine;

pub use coarse::*;
pub use grid::*;
pub use refine::*;
