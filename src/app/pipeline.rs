//! Shared fit pipeline used by the `fit` and `plot` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> PointSet -> coarse grid -> refinement -> FitResult -> residuals
//!
//! The command handlers can then focus on presentation (printing vs files).

use std::time::Instant;

use tracing::info;

use crate::domain::{FitConfig, FitResult, PointResidual, PointSet, RefineOptions, ScoredTriple, TSource};
use crate::error::AppError;
use crate::fit::{Refinement, coarse_search, refine};
use crate::io::ingest::{IngestedData, load_points};
use crate::report::{build_fit_result, point_residuals};

/// Output of the optimizer proper (no I/O involved).
#[derive(Debug, Clone, Copy)]
pub struct FitOutcome {
    pub coarse: ScoredTriple,
    pub refinement: Refinement,
    pub result: FitResult,
}

/// All computed outputs of a single `dcf fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub source: TSource,
    pub outcome: FitOutcome,
    pub residuals: Vec<PointResidual>,
}

/// Execute the full pipeline: load the CSV, fit, and compute residuals.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let ingest = load_points(&config.csv_path)?;
    let source = config.t_source.resolve(ingest.point_set.has_t());
    info!(
        points = ingest.rows_used,
        skipped = ingest.row_errors.len(),
        has_t = ingest.point_set.has_t(),
        ?source,
        "input loaded"
    );

    let outcome = fit_point_set(&ingest.point_set, source, &config.refine, config.parallel)?;
    let residuals = point_residuals(&ingest.point_set, outcome.result.params(), source);

    Ok(RunOutput {
        ingest,
        source,
        outcome,
        residuals,
    })
}

/// Coarse search, refinement, and report assembly on an already validated set.
pub fn fit_point_set(
    set: &PointSet,
    source: TSource,
    refine_opts: &RefineOptions,
    parallel: bool,
) -> Result<FitOutcome, AppError> {
    let started = Instant::now();
    let coarse = coarse_search(set.points(), source, parallel)?;
    info!(
        duration_ms = started.elapsed().as_millis(),
        theta_deg = coarse.params.theta_deg,
        m = coarse.params.m,
        x = coarse.params.x,
        err = coarse.err,
        "coarse search complete"
    );

    let started = Instant::now();
    let refinement = refine(set.points(), coarse, source, refine_opts);
    info!(
        duration_ms = started.elapsed().as_millis(),
        iterations = refinement.iterations,
        moves = refinement.moves,
        converged = refinement.converged,
        err = refinement.best.err,
        "refinement complete"
    );

    let result = build_fit_result(set, &refinement.best, source)?;
    Ok(FitOutcome {
        coarse,
        refinement,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParameterTriple, Point};
    use crate::models::err_e2_l1;

    #[test]
    fn two_point_scenario_beats_grid_centroid() {
        let set = PointSet::new(vec![Point::with_t(50.0, 42.0, 0.0), Point::new(60.0, 45.2)], false).unwrap();
        let source = TSource::Projected;
        let out = fit_point_set(&set, source, &RefineOptions::default(), true).unwrap();

        let r = out.result;
        for v in [r.theta_deg, r.m, r.x, r.err_e2_l1, r.err_xy_l1] {
            assert!(v.is_finite());
        }
        assert!(!r.has_t_in_csv);

        let centroid = err_e2_l1(set.points(), ParameterTriple::new(25.5, 0.0, 50.0), source);
        assert!(r.err_e2_l1 < centroid);
        assert!(r.err_e2_l1 <= out.coarse.err);
    }

    #[test]
    fn pipeline_is_deterministic() {
        let set = PointSet::new(
            vec![Point::new(50.0, 42.0), Point::new(60.0, 45.2), Point::new(67.5, 44.1)],
            false,
        )
        .unwrap();
        let a = fit_point_set(&set, TSource::Projected, &RefineOptions::default(), true).unwrap();
        let b = fit_point_set(&set, TSource::Projected, &RefineOptions::default(), false).unwrap();
        assert_eq!(a.result, b.result);
        assert_eq!(a.refinement, b.refinement);
    }

    #[test]
    fn run_fit_reads_csv_and_uses_supplied_t() {
        let path = std::env::temp_dir().join(format!("dcf-pipeline-{}.csv", std::process::id()));
        std::fs::write(&path, "x,y,t\n50,42,0\n60,45.2,10.4\nbad,1,2\n").unwrap();
        let config = FitConfig {
            csv_path: path.clone(),
            t_source: crate::domain::TSourceMode::Auto,
            refine: RefineOptions::default(),
            parallel: true,
            out_json: None,
            out_md: None,
            export_residuals: None,
            plot: false,
            plot_width: 80,
            plot_height: 20,
        };
        let run = run_fit(&config).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(run.source, TSource::Supplied);
        assert!(run.outcome.result.has_t_in_csv);
        assert_eq!(run.ingest.row_errors.len(), 1);
        assert_eq!(run.residuals.len(), 2);
        assert_eq!(run.residuals[1].t, 10.4);

        let summary = crate::report::format_run_summary(
            &run.ingest,
            &run.outcome.coarse,
            &run.outcome.refinement,
            &run.outcome.result,
            run.source,
        );
        assert!(summary.contains("Generated: "));
        assert!(summary.contains("Rows: read=3 used=2 skipped=1"));
        assert!(summary.contains("t: supplied, [0.000, 10.400]"));
    }
}
