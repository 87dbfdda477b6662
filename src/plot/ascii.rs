//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted curve: `-` line
//! - optional highlights: `*` (largest residuals)

use std::collections::HashSet;

use crate::domain::{FitResult, PointResidual, TSource};
use crate::models::Evaluator;

/// Render observed points and the fitted curve over the points' `t` span.
pub fn render_ascii_plot(
    rows: &[PointResidual],
    fit: &FitResult,
    width: usize,
    height: usize,
    highlight: Option<&[PointResidual]>,
) -> String {
    let (t_min, t_max) = t_range(rows).unwrap_or((0.0, 1.0));
    let curve = sample_curve(fit, t_min, t_max, (width * 4).max(2));
    render_plot(rows, &curve, width, height, highlight)
}

fn render_plot(
    rows: &[PointResidual],
    curve: &[(f64, f64)],
    width: usize,
    height: usize,
    highlight: Option<&[PointResidual]>,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all: Vec<(f64, f64)> = rows.iter().map(|r| (r.x, r.y)).chain(curve.iter().copied()).collect();
    let (x_min, x_max) = span(all.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = span(all.iter().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (x_min, x_max) = pad_range(x_min, x_max, 0.02);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it.
    let mut prev = None;
    for &(x, y) in curve {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(&mut grid, x0, y0, cx, cy, '-'),
            None => grid[cy][cx] = '-',
        }
        prev = Some((cx, cy));
    }

    let marked: HashSet<usize> = highlight
        .map(|h| h.iter().map(|r| r.index).collect())
        .unwrap_or_default();
    for r in rows {
        let cx = map_x(r.x, x_min, x_max, width);
        let cy = map_y(r.y, y_min, y_max, height);
        grid[cy][cx] = if marked.contains(&r.index) { '*' } else { 'o' };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.2}, {x_max:.2}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn t_range(rows: &[PointResidual]) -> Option<(f64, f64)> {
    span(rows.iter().map(|r| r.t))
}

fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() && hi > lo {
        Some((lo, hi))
    } else {
        None
    }
}

fn sample_curve(fit: &FitResult, t_min: f64, t_max: f64, n: usize) -> Vec<(f64, f64)> {
    let ev = Evaluator::new(fit.params(), TSource::Projected);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            ev.predict(t_min + u * (t_max - t_min))
        })
        .collect()
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let pad = ((max - min).abs() * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
