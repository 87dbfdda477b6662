//! Coarse parameter grid.
//!
//! The first stage is a deterministic exhaustive search over a fixed lattice:
//!
//! - `theta_deg`: `0.5, 1.5, …, 49.5` (50 values)
//! - `M`: `-0.05, -0.04, …, 0.05` (11 values)
//! - `X`: `0, 5, …, 100` (21 values)
//!
//! The lattice is flattened theta-outer, M-middle, X-inner. The flat index is
//! the tie-break key of the coarse search, so this ordering is part of the
//! observable behaviour.

use crate::domain::ParameterTriple;

pub const THETA_STEPS: usize = 50;
pub const M_STEPS: usize = 11;
pub const X_STEPS: usize = 21;

/// Round to `places` decimals.
pub fn round_to(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (v * scale).round() / scale
}

pub fn theta_values() -> Vec<f64> {
    (0..THETA_STEPS).map(|i| 0.5 + i as f64).collect()
}

pub fn m_values() -> Vec<f64> {
    // Rounded so that e.g. the middle value is exactly 0.0.
    (0..M_STEPS).map(|i| round_to(-0.05 + i as f64 * 0.01, 5)).collect()
}

pub fn x_values() -> Vec<f64> {
    (0..X_STEPS).map(|i| (i * 5) as f64).collect()
}

/// Every coarse triple in search order.
pub fn coarse_grid() -> Vec<ParameterTriple> {
    let thetas = theta_values();
    let ms = m_values();
    let xs = x_values();

    let mut out = Vec::with_capacity(thetas.len() * ms.len() * xs.len());
    for &theta_deg in &thetas {
        for &m in &ms {
            for &x in &xs {
                out.push(ParameterTriple::new(theta_deg, m, x));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_expected_size_and_endpoints() {
        let grid = coarse_grid();
        assert_eq!(grid.len(), 11_550);
        assert_eq!(grid[0], ParameterTriple::new(0.5, -0.05, 0.0));
        assert_eq!(grid[grid.len() - 1], ParameterTriple::new(49.5, 0.05, 100.0));
    }

    #[test]
    fn grid_is_theta_outer_x_inner() {
        let grid = coarse_grid();
        assert_eq!(grid[1], ParameterTriple::new(0.5, -0.05, 5.0));
        assert_eq!(grid[X_STEPS], ParameterTriple::new(0.5, -0.04, 0.0));
        assert_eq!(grid[X_STEPS * M_STEPS], ParameterTriple::new(1.5, -0.05, 0.0));
    }

    #[test]
    fn m_values_are_clean_decimals() {
        let ms = m_values();
        assert_eq!(ms[5], 0.0);
        assert_eq!(ms[10], 0.05);
        assert_eq!(ms[3], -0.02);
    }
}
