//! Write fit results: `results.json`, `results.md`, and per-point residual CSV.
//!
//! `results.json` is the portable representation of a fit and can be read back
//! for plotting or re-scoring.

use std::fs::{self, File};
use std::path::Path;

use crate::domain::{FitResult, PointResidual};
use crate::error::AppError;
use crate::report::{format_result_json, format_results_markdown};

/// Write the pretty JSON record.
pub fn write_results_json(path: &Path, result: &FitResult) -> Result<(), AppError> {
    let json = format_result_json(result)?;
    fs::write(path, json)
        .map_err(|e| AppError::input(format!("Failed to write results JSON '{}': {e}", path.display())))
}

/// Write the markdown report with the LaTeX-ready equation.
pub fn write_results_markdown(path: &Path, result: &FitResult) -> Result<(), AppError> {
    let md = format_results_markdown(result)?;
    fs::write(path, md)
        .map_err(|e| AppError::input(format!("Failed to write results markdown '{}': {e}", path.display())))
}

/// Read a results JSON file.
pub fn read_results_json(path: &Path) -> Result<FitResult, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open results JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Failed to parse results JSON '{}': {e}", path.display())))
}

/// Write per-point residuals to CSV.
pub fn write_residuals_csv(path: &Path, rows: &[PointResidual]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::input(format!("Failed to create residual CSV '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::input(format!("Failed to write residual CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush residual CSV: {e}")))
}
