//! Fit report assembly: the final record, per-point residuals, and formatted output.

pub mod format;

pub use format::*;

use crate::domain::{FitResult, ParameterTriple, PointResidual, PointSet, ScoredTriple, TSource};
use crate::error::{AppError, EXIT_NUMERIC};
use crate::models::{Evaluator, err_xy_l1};

/// Assemble the final record for a refined triple.
///
/// `err_xy_l1` is computed here, on the refined triple only; it never feeds back
/// into the search.
pub fn build_fit_result(set: &PointSet, refined: &ScoredTriple, source: TSource) -> Result<FitResult, AppError> {
    let params = refined.params;
    let err_xy = err_xy_l1(set.points(), params, source);
    if !(refined.err.is_finite() && err_xy.is_finite()) {
        return Err(AppError::new(EXIT_NUMERIC, "Non-finite error in the final fit."));
    }

    Ok(FitResult {
        theta_deg: params.theta_deg,
        m: params.m,
        x: params.x,
        err_e2_l1: refined.err,
        err_xy_l1: err_xy,
        has_t_in_csv: set.has_t(),
    })
}

/// Per-point diagnostics for `params`.
pub fn point_residuals(set: &PointSet, params: ParameterTriple, source: TSource) -> Vec<PointResidual> {
    let ev = Evaluator::new(params, source);
    set.points()
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let t = ev.param_t(p);
            let (x_fit, y_fit) = ev.predict(t);
            PointResidual {
                index,
                x: p.x,
                y: p.y,
                t,
                e2_residual: ev.e2_residual(p),
                x_fit,
                y_fit,
                xy_residual: (x_fit - p.x).abs() + (y_fit - p.y).abs(),
            }
        })
        .collect()
}
