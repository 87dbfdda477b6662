//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observations (`Point`, `PointSet`)
//! - search values (`ParameterTriple`, `ScoredTriple`) and their bounds
//! - fit outputs (`FitResult`, `PointResidual`) and run configuration (`FitConfig`)

pub mod types;

pub use types::*;
