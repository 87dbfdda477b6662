//! Command-line parsing for the decay curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/search code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{RefinePolicy, TSourceMode};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dcf", version, about = "Fit a rotated decay-modulated sinusoid to 2D points")]
pub struct Cli {
    /// Log level for diagnostics on stderr (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "DCF_LOG_LEVEL")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit (theta, M, X) to a CSV of points and write results.json / results.md.
    Fit(FitArgs),
    /// Evaluate both error metrics for a given parameter triple.
    Score(ScoreArgs),
    /// Generate a synthetic CSV of points on the curve.
    Synth(SynthArgs),
    /// Plot points against a previously written results.json.
    Plot(PlotArgs),
}

/// Options for fitting.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Input CSV (`x,y` with optional `t` column).
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Where each point's parametric coordinate comes from.
    #[arg(long, value_enum, default_value_t = TSourceMode::Auto)]
    pub t_source: TSourceMode,

    /// How a refinement pass picks among improving neighbours.
    #[arg(long, value_enum, default_value_t = RefinePolicy::LastImproving)]
    pub refine_policy: RefinePolicy,

    /// Refinement iteration cap.
    #[arg(long, default_value_t = 30)]
    pub max_iters: usize,

    /// Evaluate the coarse grid on a single thread.
    #[arg(long)]
    pub serial: bool,

    /// Results JSON path.
    #[arg(long, default_value = "results.json", env = "DCF_OUT_JSON")]
    pub out_json: PathBuf,

    /// Results markdown path.
    #[arg(long, default_value = "results.md", env = "DCF_OUT_MD")]
    pub out_md: PathBuf,

    /// Only print the results; do not write results.json / results.md.
    #[arg(long)]
    pub no_write: bool,

    /// Export per-point residuals to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_residuals: Option<PathBuf>,

    /// Print the run summary, worst points, and an ASCII plot to stderr.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// A parameter triple given on the command line.
#[derive(Debug, Args, Clone, Copy)]
pub struct TripleArgs {
    /// Rotation angle in degrees.
    #[arg(long)]
    pub theta_deg: f64,

    /// Decay-rate coefficient.
    #[arg(long = "m", allow_hyphen_values = true)]
    pub m: f64,

    /// Horizontal offset.
    #[arg(long = "x", allow_hyphen_values = true)]
    pub x: f64,
}

/// Options for scoring a fixed triple.
#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    /// Input CSV (`x,y` with optional `t` column).
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    #[command(flatten)]
    pub triple: TripleArgs,

    /// Where each point's parametric coordinate comes from.
    #[arg(long, value_enum, default_value_t = TSourceMode::Auto)]
    pub t_source: TSourceMode,
}

/// Options for synthetic data generation.
#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    #[command(flatten)]
    pub triple: TripleArgs,

    /// Number of points.
    #[arg(short = 'n', long, default_value_t = 1500)]
    pub count: usize,

    /// Lower end of the sampled t range.
    #[arg(long, default_value_t = 6.0, allow_hyphen_values = true)]
    pub t_min: f64,

    /// Upper end of the sampled t range.
    #[arg(long, default_value_t = 60.0, allow_hyphen_values = true)]
    pub t_max: f64,

    /// Standard deviation of Gaussian noise added to x and y.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Include the `t` column in the output.
    #[arg(long)]
    pub with_t: bool,

    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

/// Options for plotting a saved fit.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Input CSV the fit was made on.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Results JSON produced by `dcf fit`.
    #[arg(long, value_name = "JSON", default_value = "results.json")]
    pub results: PathBuf,

    /// Where each point's parametric coordinate comes from.
    #[arg(long, value_enum, default_value_t = TSourceMode::Auto)]
    pub t_source: TSourceMode,

    /// Highlight the N points with the largest residuals.
    #[arg(long, default_value_t = 0)]
    pub top: usize,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_defaults_match_reference_run() {
        let cli = Cli::try_parse_from(["dcf", "fit", "data.csv"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.max_iters, 30);
        assert_eq!(args.t_source, TSourceMode::Auto);
        assert_eq!(args.refine_policy, RefinePolicy::LastImproving);
        assert!(!args.serial);
    }

    #[test]
    fn score_accepts_negative_m() {
        let cli =
            Cli::try_parse_from(["dcf", "score", "data.csv", "--theta-deg", "10", "--m", "-0.02", "--x", "50"]).unwrap();
        let Command::Score(args) = cli.command else {
            panic!("expected score");
        };
        assert_eq!(args.triple.m, -0.02);
    }

    #[test]
    fn value_enums_parse_kebab_case() {
        let cli = Cli::try_parse_from([
            "dcf",
            "fit",
            "data.csv",
            "--refine-policy",
            "best-of-pass",
            "--t-source",
            "projected",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.refine_policy, RefinePolicy::BestOfPass);
        assert_eq!(args.t_source, TSourceMode::Projected);
    }
}
