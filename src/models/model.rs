//! Model evaluation for one parameter triple.
//!
//! The search relies on two primitive operations:
//! - the transverse residual of a point (primary metric, drives the search)
//! - the predicted Cartesian position at a parametric coordinate (secondary
//!   metric, reporting only)
//!
//! Both share the same t derivation, controlled by [`TSource`].

use nalgebra::Vector2;

use crate::domain::{ParameterTriple, Point, TSource, Y0};
use crate::math::{Frame, profile};

/// Precomputed per-triple state so that a pass over the points does no trig.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    params: ParameterTriple,
    frame: Frame,
    source: TSource,
}

impl Evaluator {
    pub fn new(params: ParameterTriple, source: TSource) -> Self {
        Self {
            params,
            frame: Frame::new(params.theta_deg),
            source,
        }
    }

    fn offset(&self, p: &Point) -> Vector2<f64> {
        Vector2::new(p.x - self.params.x, p.y - Y0)
    }

    fn t_for(&self, p: &Point, d: &Vector2<f64>) -> f64 {
        match (self.source, p.t) {
            (TSource::Supplied, Some(t)) => t,
            _ => self.frame.along(d),
        }
    }

    /// Parametric coordinate of `p`: supplied or projected onto `e1`.
    pub fn param_t(&self, p: &Point) -> f64 {
        self.t_for(p, &self.offset(p))
    }

    /// Transverse coordinate minus the profile predicted at the point's `t`.
    pub fn e2_residual(&self, p: &Point) -> f64 {
        let d = self.offset(p);
        let t = self.t_for(p, &d);
        self.frame.across(&d) - profile(t, self.params.m)
    }

    /// Model position at parametric coordinate `t`.
    pub fn predict(&self, t: f64) -> (f64, f64) {
        let off = self.frame.to_offset(t, profile(t, self.params.m));
        (off.x + self.params.x, Y0 + off.y)
    }

    /// Cartesian L1 distance between `p` and the model position at the point's `t`.
    pub fn xy_residual(&self, p: &Point) -> f64 {
        let (rx, ry) = self.predict(self.param_t(p));
        (rx - p.x).abs() + (ry - p.y).abs()
    }
}

/// Primary objective: `Σ |e2 residual|`.
pub fn err_e2_l1(points: &[Point], params: ParameterTriple, source: TSource) -> f64 {
    let ev = Evaluator::new(params, source);
    points.iter().map(|p| ev.e2_residual(p).abs()).sum()
}

/// Secondary objective: `Σ (|Rx - x| + |Ry - y|)`.
pub fn err_xy_l1(points: &[Point], params: ParameterTriple, source: TSource) -> f64 {
    let ev = Evaluator::new(params, source);
    points.iter().map(|p| ev.xy_residual(p)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_curve(params: ParameterTriple, ts: &[f64]) -> Vec<Point> {
        let ev = Evaluator::new(params, TSource::Projected);
        ts.iter()
            .map(|&t| {
                let (x, y) = ev.predict(t);
                Point::with_t(x, y, t)
            })
            .collect()
    }

    #[test]
    fn anchor_point_has_zero_residual_for_any_angle() {
        let p = Point::new(50.0, 42.0);
        for &deg in &[0.5, 12.0, 49.5] {
            let ev = Evaluator::new(ParameterTriple::new(deg, 0.03, 50.0), TSource::Projected);
            assert_eq!(ev.param_t(&p), 0.0);
            assert_eq!(ev.e2_residual(&p), 0.0);
            assert_eq!(ev.xy_residual(&p), 0.0);
        }
    }

    #[test]
    fn points_on_the_curve_score_near_zero() {
        let params = ParameterTriple::new(28.0, 0.02, 55.0);
        let ts: Vec<f64> = (0..40).map(|i| 6.0 + i as f64 * 1.35).collect();
        let points = on_curve(params, &ts);

        assert!(err_e2_l1(&points, params, TSource::Supplied) < 1e-9);
        assert!(err_xy_l1(&points, params, TSource::Supplied) < 1e-9);
        assert!(err_e2_l1(&points, params, TSource::Projected) < 1e-9);
    }

    #[test]
    fn supplied_t_is_ignored_when_projecting() {
        let params = ParameterTriple::new(10.0, 0.0, 50.0);
        let p = Point::with_t(60.0, 45.0, 999.0);
        let supplied = Evaluator::new(params, TSource::Supplied);
        let projected = Evaluator::new(params, TSource::Projected);
        assert_eq!(supplied.param_t(&p), 999.0);
        assert_ne!(projected.param_t(&p), 999.0);
    }

    #[test]
    fn supplied_policy_falls_back_to_projection_without_t() {
        let params = ParameterTriple::new(33.0, -0.01, 20.0);
        let p = Point::new(31.0, 50.0);
        let a = Evaluator::new(params, TSource::Supplied).param_t(&p);
        let b = Evaluator::new(params, TSource::Projected).param_t(&p);
        assert_eq!(a, b);
    }

    #[test]
    fn metrics_match_when_supplied_t_equals_projection() {
        let params = ParameterTriple::new(21.3, 0.013, 47.0);
        let raw = [(40.0, 39.0), (55.5, 47.2), (70.0, 52.0), (81.0, 66.6)];
        let ev = Evaluator::new(params, TSource::Projected);
        let points: Vec<Point> = raw
            .iter()
            .map(|&(x, y)| {
                let t = ev.param_t(&Point::new(x, y));
                Point::with_t(x, y, t)
            })
            .collect();

        assert_eq!(
            err_xy_l1(&points, params, TSource::Supplied),
            err_xy_l1(&points, params, TSource::Projected)
        );
        assert_eq!(
            err_e2_l1(&points, params, TSource::Supplied),
            err_e2_l1(&points, params, TSource::Projected)
        );
    }

    #[test]
    fn residuals_are_finite_across_the_domain() {
        let points = vec![Point::new(-500.0, 900.0), Point::new(1e4, -1e4), Point::new(0.0, 0.0)];
        for &deg in &[0.001, 25.0, 49.999] {
            for &m in &[-0.05, 0.0, 0.05] {
                for &x in &[0.0, 100.0] {
                    let e = err_e2_l1(&points, ParameterTriple::new(deg, m, x), TSource::Projected);
                    assert!(e.is_finite());
                }
            }
        }
    }
}
