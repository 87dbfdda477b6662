//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the search
//! - exported to JSON/CSV
//! - reloaded later for plotting or re-scoring

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Vertical anchor of the curve family.
pub const Y0: f64 = 42.0;

/// Angular frequency of the transverse sinusoid.
pub const PROFILE_FREQ: f64 = 0.3;

/// Closed interval `[lo, hi]` for one search axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub lo: f64,
    pub hi: f64,
}

impl AxisBounds {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn clamp(self, v: f64) -> f64 {
        v.max(self.lo).min(self.hi)
    }

    pub fn contains(self, v: f64) -> bool {
        v >= self.lo && v <= self.hi
    }
}

/// Bounds every refinement move is clamped into.
///
/// `theta_deg` stays strictly inside `(0, 50)`.
pub const THETA_BOUNDS: AxisBounds = AxisBounds::new(0.001, 49.999);
pub const M_BOUNDS: AxisBounds = AxisBounds::new(-0.05, 0.05);
pub const X_BOUNDS: AxisBounds = AxisBounds::new(0.0, 100.0);

/// Where the parametric coordinate `t` of each point comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TSource {
    /// Use the point's own `t` when it carries one; project otherwise.
    Supplied,
    /// Always project onto the curve-following axis.
    Projected,
}

/// CLI-facing selection of the t source.
///
/// `Auto` defers to whether the input table had a usable `t` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TSourceMode {
    Auto,
    Supplied,
    Projected,
}

impl TSourceMode {
    pub fn resolve(self, has_t: bool) -> TSource {
        match self {
            TSourceMode::Auto if has_t => TSource::Supplied,
            TSourceMode::Auto => TSource::Projected,
            TSourceMode::Supplied => TSource::Supplied,
            TSourceMode::Projected => TSource::Projected,
        }
    }
}

/// How a refinement pass chooses among several improving neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RefinePolicy {
    /// Adopt every strict improvement as it is seen; the last one in the pass wins.
    LastImproving,
    /// Adopt only the lowest-error neighbour of the pass (earliest on ties).
    BestOfPass,
}

/// One observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Externally supplied parametric coordinate, if the source had one.
    pub t: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, t: None }
    }

    pub fn with_t(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t: Some(t) }
    }
}

/// The loaded observations, validated for fitting.
///
/// A `PointSet` is never empty, and `has_t` is true only if every point carries a `t`.
#[derive(Debug, Clone)]
pub struct PointSet {
    points: Vec<Point>,
    has_t: bool,
}

impl PointSet {
    /// Validate and wrap a sequence of points.
    ///
    /// When `has_t` is false every `t` is dropped, whatever the rows carried.
    pub fn new(mut points: Vec<Point>, has_t: bool) -> Result<Self, AppError> {
        if points.is_empty() {
            return Err(AppError::no_data("No data points to fit."));
        }

        for (i, p) in points.iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(AppError::input(format!("Point {i} has a non-finite coordinate.")));
            }
            match p.t {
                Some(t) if !t.is_finite() => {
                    return Err(AppError::input(format!("Point {i} has a non-finite `t`.")));
                }
                None if has_t => {
                    return Err(AppError::input(format!(
                        "Point {i} is missing `t` although the set is marked as carrying `t`."
                    )));
                }
                _ => {}
            }
        }

        if !has_t {
            for p in points.iter_mut() {
                p.t = None;
            }
        }

        Ok(Self { points, has_t })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn has_t(&self) -> bool {
        self.has_t
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The three fitted parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterTriple {
    pub theta_deg: f64,
    #[serde(rename = "M")]
    pub m: f64,
    #[serde(rename = "X")]
    pub x: f64,
}

impl ParameterTriple {
    pub fn new(theta_deg: f64, m: f64, x: f64) -> Self {
        Self { theta_deg, m, x }
    }

    /// Clamp every axis into the refinement bounds.
    pub fn clamped(self) -> Self {
        Self {
            theta_deg: THETA_BOUNDS.clamp(self.theta_deg),
            m: M_BOUNDS.clamp(self.m),
            x: X_BOUNDS.clamp(self.x),
        }
    }

    pub fn within_bounds(&self) -> bool {
        THETA_BOUNDS.contains(self.theta_deg) && M_BOUNDS.contains(self.m) && X_BOUNDS.contains(self.x)
    }
}

/// A parameter triple together with its primary-metric error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredTriple {
    #[serde(flatten)]
    pub params: ParameterTriple,
    pub err: f64,
}

/// Final fit record.
///
/// Field order and names match the `results.json` schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub theta_deg: f64,
    #[serde(rename = "M")]
    pub m: f64,
    #[serde(rename = "X")]
    pub x: f64,
    pub err_e2_l1: f64,
    pub err_xy_l1: f64,
    pub has_t_in_csv: bool,
}

impl FitResult {
    pub fn params(&self) -> ParameterTriple {
        ParameterTriple::new(self.theta_deg, self.m, self.x)
    }
}

/// Per-point diagnostics for a fitted triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointResidual {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    /// The parametric coordinate actually used (supplied or projected).
    pub t: f64,
    pub e2_residual: f64,
    pub x_fit: f64,
    pub y_fit: f64,
    pub xy_residual: f64,
}

/// Knobs of the local refinement stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineOptions {
    pub max_iters: usize,
    pub policy: RefinePolicy,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            max_iters: 30,
            policy: RefinePolicy::LastImproving,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,
    pub t_source: TSourceMode,
    pub refine: RefineOptions,
    /// Evaluate the coarse grid on the rayon pool.
    pub parallel: bool,

    pub out_json: Option<PathBuf>,
    pub out_md: Option<PathBuf>,
    pub export_residuals: Option<PathBuf>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}
