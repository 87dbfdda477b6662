//! Rotated orthonormal frame and the decay-modulated profile.
//!
//! For an angle `θ` the frame is:
//!
//! - `e1 = ( cos θ, sin θ)`: curve-following axis
//! - `e2 = (-sin θ, cos θ)`: transverse axis
//!
//! The profile `R(t) = exp(M·|t|)·sin(0.3·t)` is the transverse offset the
//! model predicts at parametric coordinate `t`. It is finite for every finite
//! `t` and vanishes at `t = 0`.

use nalgebra::Vector2;

use crate::domain::PROFILE_FREQ;

/// Orthonormal frame rotated by `theta_deg` from the x-axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub cos: f64,
    pub sin: f64,
    pub e1: Vector2<f64>,
    pub e2: Vector2<f64>,
}

impl Frame {
    pub fn new(theta_deg: f64) -> Self {
        let (sin, cos) = theta_deg.to_radians().sin_cos();
        Self {
            cos,
            sin,
            e1: Vector2::new(cos, sin),
            e2: Vector2::new(-sin, cos),
        }
    }

    /// Coordinate of `d` along the curve-following axis.
    pub fn along(&self, d: &Vector2<f64>) -> f64 {
        d.x * self.e1.x + d.y * self.e1.y
    }

    /// Coordinate of `d` along the transverse axis.
    pub fn across(&self, d: &Vector2<f64>) -> f64 {
        d.x * self.e2.x + d.y * self.e2.y
    }

    /// Map frame coordinates `(t, r)` back to an offset in the data plane.
    pub fn to_offset(&self, t: f64, r: f64) -> Vector2<f64> {
        Vector2::new(self.cos * t - self.sin * r, self.sin * t + self.cos * r)
    }
}

/// Decay-modulated transverse profile `exp(m·|t|)·sin(0.3·t)`.
pub fn profile(t: f64, m: f64) -> f64 {
    (m * t.abs()).exp() * (PROFILE_FREQ * t).sin()
}
