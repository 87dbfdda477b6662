//! CSV ingest and normalization.
//!
//! This module turns an `x,y[,t]` table into a validated [`PointSet`].
//!
//! Column detection:
//! - the first row is always the header (trimmed, BOM-stripped, lower-cased)
//! - `x` / `y` are taken from headers of that name, else from columns 0 / 1
//! - `t` is used only when a `t` header exists; then every kept row carries it
//!
//! Rows that fail numeric parsing are skipped and reported, never passed on.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{Point, PointSet};
use crate::error::AppError;

/// Resolved column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub x: usize,
    pub y: usize,
    pub t: Option<usize>,
}

/// Summary stats about the points actually used for fitting.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub t_range: Option<(f64, f64)>,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated points + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub point_set: PointSet,
    pub columns: ColumnMap,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a CSV file into a [`PointSet`].
pub fn load_points(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_points(file)?;
    debug!(path = %path.display(), rows_used = data.rows_used, "csv loaded");
    Ok(data)
}

/// Parse CSV from any reader.
pub fn read_points<R: Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = resolve_columns(&headers);
    let has_t = columns.t.is_some();

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, columns));
        match parsed {
            Ok(point) => points.push(point),
            Err(message) => {
                debug!(line, %message, "skipping row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), rows_read, "skipped malformed rows");
    }

    let rows_used = points.len();
    if rows_used == 0 {
        return Err(AppError::no_data("No valid rows remain after parsing."));
    }

    let stats = compute_stats(&points)
        .ok_or_else(|| AppError::no_data("No valid points remain after parsing."))?;
    let point_set = PointSet::new(points, has_t)?;

    Ok(IngestedData {
        point_set,
        columns,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn resolve_columns(headers: &StringRecord) -> ColumnMap {
    let header_map = build_header_map(headers);
    ColumnMap {
        x: header_map.get("x").copied().unwrap_or(0),
        y: header_map.get("y").copied().unwrap_or(1),
        t: header_map.get("t").copied(),
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    // Keep the first occurrence of duplicated names.
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, columns: ColumnMap) -> Result<Point, String> {
    let x = parse_field(record, columns.x, "x")?;
    let y = parse_field(record, columns.y, "y")?;
    match columns.t {
        Some(idx) => Ok(Point::with_t(x, y, parse_field(record, idx, "t")?)),
        None => Ok(Point::new(x, y)),
    }
}

fn parse_field(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .ok_or_else(|| format!("Missing `{name}` value (column {idx})."))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{raw}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite `{name}` value '{raw}'."))
    }
}

fn compute_stats(points: &[Point]) -> Option<DatasetStats> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    let mut t_range: Option<(f64, f64)> = None;

    for p in points {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
        if let Some(t) = p.t {
            t_range = Some(match t_range {
                Some((lo, hi)) => (lo.min(t), hi.max(t)),
                None => (t, t),
            });
        }
    }

    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return None;
    }

    Some(DatasetStats {
        n_points: points.len(),
        x_min,
        x_max,
        y_min,
        y_max,
        t_range,
    })
}
