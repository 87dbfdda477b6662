//! Mathematical utilities: the rotated frame and the transverse profile.

pub mod frame;

pub use frame::*;
