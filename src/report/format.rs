//! Formatted output: run summary, closed-form equation, results documents.
//!
//! We keep formatting code in one place so:
//! - the search code stays clean and testable
//! - output changes are localized

use chrono::Local;

use crate::domain::{FitResult, PointResidual, ScoredTriple, TSource};
use crate::error::AppError;
use crate::fit::Refinement;
use crate::io::ingest::IngestedData;

/// Pretty JSON of the fit record (the `results.json` payload).
pub fn format_result_json(result: &FitResult) -> Result<String, AppError> {
    serde_json::to_string_pretty(result).map_err(|e| AppError::input(format!("Failed to serialize results: {e}")))
}

/// LaTeX-ready parametric equation with the fitted values substituted.
pub fn format_equation(result: &FitResult) -> String {
    let th = format!("{:.6}", result.theta_deg);
    let m = format!("{:.6}", result.m);
    let x = format!("{:.6}", result.x);
    format!(
        r"\left(t*\cos({th}\,\deg)-e^{{{m}\left|t\right|}}\cdot\sin(0.3t)\sin({th}\,\deg)+{x},\;42+t*\sin({th}\,\deg)+e^{{{m}\left|t\right|}}\cdot\sin(0.3t)\cos({th}\,\deg)\right)"
    )
}

/// The `results.md` document.
pub fn format_results_markdown(result: &FitResult) -> Result<String, AppError> {
    let mut out = String::new();
    out.push_str("# Fitted Parameters\n\n");
    out.push_str(&format_result_json(result)?);
    out.push_str("\n\n**Equation (LaTeX-ready):**\n\n");
    out.push_str(&format_equation(result));
    out.push('\n');
    Ok(out)
}

/// Format the full run summary (dataset stats + search diagnostics + fitted values).
pub fn format_run_summary(
    ingest: &IngestedData,
    coarse: &ScoredTriple,
    refinement: &Refinement,
    result: &FitResult,
    source: TSource,
) -> String {
    let mut out = String::new();
    let stats = &ingest.stats;

    out.push_str("=== dcf - Decay Curve Fit ===\n");
    out.push_str(&format!("Generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    out.push_str(&format!(
        "Points: n={} | x=[{:.3}, {:.3}] | y=[{:.3}, {:.3}]\n",
        stats.n_points, stats.x_min, stats.x_max, stats.y_min, stats.y_max
    ));
    let t_label = match (source, stats.t_range) {
        (TSource::Supplied, Some((lo, hi))) => format!("supplied, [{lo:.3}, {hi:.3}]"),
        (TSource::Supplied, None) => "supplied (no t column, projecting)".to_string(),
        (TSource::Projected, _) => "projected".to_string(),
    };
    out.push_str(&format!("t: {t_label}\n"));

    out.push_str("\nSearch:\n");
    out.push_str(&format!(
        "- coarse : theta={:.4} M={:.4} X={:.4} err={:.6}\n",
        coarse.params.theta_deg, coarse.params.m, coarse.params.x, coarse.err
    ));
    out.push_str(&format!(
        "- refined: theta={:.6} M={:.6} X={:.6} err={:.6}\n",
        result.theta_deg, result.m, result.x, result.err_e2_l1
    ));
    out.push_str(&format!(
        "- refinement: iterations={} moves={} shrinks={} {}\n",
        refinement.iterations,
        refinement.moves,
        refinement.shrinks,
        if refinement.converged { "converged" } else { "hit iteration cap" }
    ));

    out.push_str("\nErrors:\n");
    out.push_str(&format!("- err_e2_l1: {:.6}\n", result.err_e2_l1));
    out.push_str(&format!("- err_xy_l1: {:.6}\n", result.err_xy_l1));
    out.push('\n');

    out
}

/// Points with the largest Cartesian residual, largest first.
pub fn worst_points(rows: &[PointResidual], top_n: usize) -> Vec<PointResidual> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        b.xy_residual
            .partial_cmp(&a.xy_residual)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(top_n);
    sorted
}

/// Format a residual table.
pub fn format_residual_table(rows: &[PointResidual]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>6} {:>10} {:>10} {:>10} {:>12} {:>12}\n",
            "index", "x", "y", "t", "e2_resid", "xy_resid"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:->6} {:->10} {:->10} {:->10} {:->12} {:->12}", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:>6} {:>10.3} {:>10.3} {:>10.3} {:>12.6} {:>12.6}",
                r.index, r.x, r.y, r.t, r.e2_residual, r.xy_residual
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> FitResult {
        FitResult {
            theta_deg: 10.0,
            m: 0.0,
            x: 50.0,
            err_e2_l1: 0.25,
            err_xy_l1: 0.5,
            has_t_in_csv: true,
        }
    }

    fn row(index: usize, xy_residual: f64) -> PointResidual {
        PointResidual {
            index,
            x: 0.0,
            y: 0.0,
            t: 0.0,
            e2_residual: 0.0,
            x_fit: 0.0,
            y_fit: 0.0,
            xy_residual,
        }
    }

    #[test]
    fn equation_substitutes_fitted_values() {
        let eq = format_equation(&sample_result());
        assert_eq!(
            eq,
            r"\left(t*\cos(10.000000\,\deg)-e^{0.000000\left|t\right|}\cdot\sin(0.3t)\sin(10.000000\,\deg)+50.000000,\;42+t*\sin(10.000000\,\deg)+e^{0.000000\left|t\right|}\cdot\sin(0.3t)\cos(10.000000\,\deg)\right)"
        );
    }

    #[test]
    fn markdown_has_header_json_and_equation() {
        let md = format_results_markdown(&sample_result()).unwrap();
        assert!(md.starts_with("# Fitted Parameters\n\n{\n  \"theta_deg\": 10.0,"));
        assert!(md.contains("\"has_t_in_csv\": true\n}\n\n**Equation (LaTeX-ready):**\n\n\\left("));
        assert!(md.ends_with("\\right)\n"));
    }

    #[test]
    fn worst_points_sorted_descending() {
        let rows = vec![row(0, 0.1), row(1, 3.0), row(2, 1.5)];
        let worst = worst_points(&rows, 2);
        assert_eq!(worst.len(), 2);
        assert_eq!(worst[0].index, 1);
        assert_eq!(worst[1].index, 2);
    }

    #[test]
    fn residual_table_has_one_line_per_row() {
        let txt = format_residual_table(&[row(0, 0.1), row(1, 3.0)]);
        assert_eq!(txt.lines().count(), 4);
        assert!(txt.lines().next().unwrap().ends_with("xy_resid"));
    }
}
