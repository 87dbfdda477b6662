//! Local pattern-search refinement around the coarse winner.
//!
//! Each iteration scores the 3×3×3 neighbourhood `{-s, 0, +s}` on every axis
//! (clamped into the search bounds, deduplicated at 6 decimals). If some
//! neighbour strictly improves the error the search moves there; otherwise all
//! step sizes are halved down to their floors. The search stops once every
//! step sits at its floor or after `max_iters` iterations.
//!
//! The result is only locally optimal: it stays in whichever basin the coarse
//! grid landed in.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{ParameterTriple, Point, RefineOptions, RefinePolicy, ScoredTriple, TSource};
use crate::domain::{M_BOUNDS, THETA_BOUNDS, X_BOUNDS};
use crate::fit::grid::round_to;
use crate::models::err_e2_l1;

/// Initial step sizes `(theta_deg, M, X)`.
const INITIAL_STEPS: Steps = Steps { theta: 1.0, m: 0.01, x: 2.0 };

/// Step floors `(theta_deg, M, X)`.
const STEP_FLOORS: Steps = Steps { theta: 0.05, m: 0.001, x: 0.2 };

/// Per-axis step sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steps {
    pub theta: f64,
    pub m: f64,
    pub x: f64,
}

impl Steps {
    fn halved(self) -> Self {
        Self {
            theta: STEP_FLOORS.theta.max(self.theta * 0.5),
            m: STEP_FLOORS.m.max(self.m * 0.5),
            x: STEP_FLOORS.x.max(self.x * 0.5),
        }
    }

    fn at_floor(&self) -> bool {
        self.theta <= STEP_FLOORS.theta && self.m <= STEP_FLOORS.m && self.x <= STEP_FLOORS.x
    }
}

/// Outcome of a refinement run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refinement {
    pub best: ScoredTriple,
    /// Iterations actually performed (at most `max_iters`).
    pub iterations: usize,
    /// Iterations that moved the current triple.
    pub moves: usize,
    /// Iterations that shrank the steps instead.
    pub shrinks: usize,
    /// True when the search stopped because all steps reached their floors.
    pub converged: bool,
    pub final_steps: Steps,
}

/// Refine `start` by neighbourhood descent.
///
/// The start triple is clamped into the search bounds first, so the returned
/// triple always lies inside them.
pub fn refine(points: &[Point], start: ScoredTriple, source: TSource, opts: &RefineOptions) -> Refinement {
    let mut current = ScoredTriple {
        params: start.params.clamped(),
        err: 0.0,
    };
    current.err = err_e2_l1(points, current.params, source);

    let mut steps = INITIAL_STEPS;
    let mut iterations = 0;
    let mut moves = 0;
    let mut shrinks = 0;
    let mut converged = false;

    for _ in 0..opts.max_iters {
        iterations += 1;
        let candidates = neighbourhood(current.params, steps);

        let adopted = match opts.policy {
            RefinePolicy::LastImproving => last_improving(points, &candidates, current.err, source),
            RefinePolicy::BestOfPass => best_of_pass(points, &candidates, current.err, source),
        };

        match adopted {
            Some(next) => {
                debug!(
                    iteration = iterations,
                    theta_deg = next.params.theta_deg,
                    m = next.params.m,
                    x = next.params.x,
                    err = next.err,
                    "refinement move"
                );
                current = next;
                moves += 1;
            }
            None => {
                steps = steps.halved();
                shrinks += 1;
                debug!(
                    iteration = iterations,
                    step_theta = steps.theta,
                    step_m = steps.m,
                    step_x = steps.x,
                    "refinement shrink"
                );
                if steps.at_floor() {
                    converged = true;
                    break;
                }
            }
        }
    }

    Refinement {
        best: current,
        iterations,
        moves,
        shrinks,
        converged,
        final_steps: steps,
    }
}

/// Clamped `{-s, 0, +s}³` neighbourhood of `center`, deduplicated in scan order.
pub fn neighbourhood(center: ParameterTriple, steps: Steps) -> Vec<ParameterTriple> {
    let mut seen = HashSet::with_capacity(27);
    let mut out = Vec::with_capacity(27);

    for d_theta in [-steps.theta, 0.0, steps.theta] {
        let theta_deg = THETA_BOUNDS.clamp(center.theta_deg + d_theta);
        for d_m in [-steps.m, 0.0, steps.m] {
            let m = M_BOUNDS.clamp(center.m + d_m);
            for d_x in [-steps.x, 0.0, steps.x] {
                let x = X_BOUNDS.clamp(center.x + d_x);
                if seen.insert(dedup_key(theta_deg, m, x)) {
                    out.push(ParameterTriple::new(theta_deg, m, x));
                }
            }
        }
    }
    out
}

fn dedup_key(theta_deg: f64, m: f64, x: f64) -> [i64; 3] {
    let key = |v: f64| (round_to(v, 6) * 1e6).round() as i64;
    [key(theta_deg), key(m), key(x)]
}

/// Every strict improvement over the running best replaces it, so the last
/// improving candidate in scan order wins.
fn last_improving(
    points: &[Point],
    candidates: &[ParameterTriple],
    best_err: f64,
    source: TSource,
) -> Option<ScoredTriple> {
    candidates.iter().fold(None, |adopted: Option<ScoredTriple>, &params| {
        let bar = adopted.map_or(best_err, |a| a.err);
        let err = err_e2_l1(points, params, source);
        if err < bar { Some(ScoredTriple { params, err }) } else { adopted }
    })
}

/// The lowest-error candidate of the pass (earliest on ties), if it strictly
/// improves on `best_err`.
fn best_of_pass(
    points: &[Point],
    candidates: &[ParameterTriple],
    best_err: f64,
    source: TSource,
) -> Option<ScoredTriple> {
    let pass_best = candidates
        .iter()
        .map(|&params| ScoredTriple {
            params,
            err: err_e2_l1(points, params, source),
        })
        .fold(None, |acc: Option<ScoredTriple>, c| match acc {
            Some(a) if a.err <= c.err => Some(a),
            _ => Some(c),
        })?;

    (pass_best.err < best_err).then_some(pass_best)
}
