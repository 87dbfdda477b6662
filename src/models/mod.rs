//! Residual model of the rotated decay-modulated sinusoid.
//!
//! The model is implemented as small, pure functions so that search code can
//! stay generic over the t-source policy.

pub mod model;

pub use model::*;
