//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - runs the fit pipeline
//! - prints results/plots
//! - writes results files and optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{Command, FitArgs, PlotArgs, ScoreArgs, SynthArgs};
use crate::domain::{FitConfig, ParameterTriple, RefineOptions};
use crate::error::AppError;

pub mod pipeline;

/// Number of worst points listed under `--plot`.
const WORST_POINTS: usize = 10;

/// Entry point for the `dcf` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is fine; it only supplies defaults for `DCF_*` variables.
    dotenvy::dotenv().ok();

    // `dcf data.csv` behaves like `dcf fit data.csv`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let _ = tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Score(args) => handle_score(args),
        Command::Synth(args) => handle_synth(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;
    let result = &run.outcome.result;

    println!("{}", crate::report::format_result_json(result)?);

    if config.plot {
        eprintln!(
            "{}",
            crate::report::format_run_summary(
                &run.ingest,
                &run.outcome.coarse,
                &run.outcome.refinement,
                result,
                run.source,
            )
        );
        let worst = crate::report::worst_points(&run.residuals, WORST_POINTS);
        eprintln!("Largest residuals:\n{}", crate::report::format_residual_table(&worst));
        let plot = crate::plot::render_ascii_plot(
            &run.residuals,
            result,
            config.plot_width,
            config.plot_height,
            Some(worst.as_slice()),
        );
        eprintln!("{plot}");
    }

    if let Some(path) = &config.out_json {
        crate::io::export::write_results_json(path, result)?;
        info!(path = %path.display(), "wrote results json");
    }
    if let Some(path) = &config.out_md {
        crate::io::export::write_results_markdown(path, result)?;
        info!(path = %path.display(), "wrote results markdown");
    }
    if let Some(path) = &config.export_residuals {
        crate::io::export::write_residuals_csv(path, &run.residuals)?;
        info!(path = %path.display(), rows = run.residuals.len(), "wrote residuals");
    }

    Ok(())
}

fn handle_score(args: ScoreArgs) -> Result<(), AppError> {
    let ingest = crate::io::ingest::load_points(&args.csv)?;
    let set = &ingest.point_set;
    let source = args.t_source.resolve(set.has_t());
    let params = ParameterTriple::new(args.triple.theta_deg, args.triple.m, args.triple.x);

    let err_e2 = crate::models::err_e2_l1(set.points(), params, source);
    let refined = crate::domain::ScoredTriple { params, err: err_e2 };
    let result = crate::report::build_fit_result(set, &refined, source)?;

    println!("{}", crate::report::format_result_json(&result)?);
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let opts = crate::data::SynthOptions {
        params: ParameterTriple::new(args.triple.theta_deg, args.triple.m, args.triple.x),
        count: args.count,
        t_min: args.t_min,
        t_max: args.t_max,
        noise: args.noise,
        seed: args.seed,
    };
    let points = crate::data::generate_points(&opts)?;
    crate::data::write_points_csv(&args.out, &points, args.with_t)?;
    info!(path = %args.out.display(), count = points.len(), "wrote synthetic points");
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let result = crate::io::export::read_results_json(&args.results)?;
    let ingest = crate::io::ingest::load_points(&args.csv)?;
    let source = args.t_source.resolve(ingest.point_set.has_t());

    let rows = crate::report::point_residuals(&ingest.point_set, result.params(), source);
    let worst = crate::report::worst_points(&rows, args.top);
    let highlight = (!worst.is_empty()).then_some(worst.as_slice());

    println!(
        "{}",
        crate::plot::render_ascii_plot(&rows, &result, args.width, args.height, highlight)
    );
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        csv_path: args.csv.clone(),
        t_source: args.t_source,
        refine: RefineOptions {
            max_iters: args.max_iters,
            policy: args.refine_policy,
        },
        parallel: !args.serial,
        out_json: (!args.no_write).then(|| args.out_json.clone()),
        out_md: (!args.no_write).then(|| args.out_md.clone()),
        export_residuals: args.export_residuals.clone(),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}

/// Rewrite argv so a bare CSV path runs `fit`.
///
/// Rules:
/// - `dcf data.csv ...`            -> `dcf fit data.csv ...`
/// - `dcf`, flags, or subcommands  -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1) else {
        return argv;
    };

    let is_subcommand = matches!(arg1.as_str(), "fit" | "score" | "synth" | "plot" | "help");
    if is_subcommand || arg1.starts_with('-') {
        return argv;
    }

    argv.insert(1, "fit".to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_csv_runs_fit() {
        assert_eq!(rewrite_args(argv(&["dcf", "data/xy.csv"])), argv(&["dcf", "fit", "data/xy.csv"]));
    }

    #[test]
    fn subcommands_and_flags_are_untouched() {
        for args in [
            vec!["dcf"],
            vec!["dcf", "--help"],
            vec!["dcf", "score", "a.csv"],
            vec!["dcf", "--log-level", "debug", "fit", "a.csv"],
        ] {
            assert_eq!(rewrite_args(argv(&args)), argv(&args));
        }
    }

    #[test]
    fn no_write_disables_result_files() {
        let cli = crate::cli::Cli::parse_from(["dcf", "fit", "a.csv", "--no-write", "--serial", "--max-iters", "5"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        let config = fit_config_from_args(&args);
        assert!(config.out_json.is_none());
        assert!(config.out_md.is_none());
        assert!(!config.parallel);
        assert_eq!(config.refine.max_iters, 5);
    }
}
