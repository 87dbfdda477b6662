//! Synthetic samples of the curve family.
//!
//! Points are drawn at uniform random `t` in `[t_min, t_max]`, mapped through
//! the model, and perturbed with independent Gaussian noise on `x` and `y`.
//! Generation is fully determined by the seed.

use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{ParameterTriple, Point, TSource};
use crate::error::AppError;
use crate::models::Evaluator;

#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub params: ParameterTriple,
    pub count: usize,
    pub t_min: f64,
    pub t_max: f64,
    /// Standard deviation of the coordinate noise.
    pub noise: f64,
    pub seed: u64,
}

pub fn generate_points(opts: &SynthOptions) -> Result<Vec<Point>, AppError> {
    if opts.count == 0 {
        return Err(AppError::input("Sample count must be > 0."));
    }
    if !(opts.t_min.is_finite() && opts.t_max.is_finite() && opts.t_max > opts.t_min) {
        return Err(AppError::input(format!(
            "Invalid t range: [{}, {}] (must be finite with t_max > t_min).",
            opts.t_min, opts.t_max
        )));
    }
    let normal = Normal::new(0.0, opts.noise)
        .map_err(|e| AppError::input(format!("Invalid noise level {}: {e}", opts.noise)))?;

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let ev = Evaluator::new(opts.params, TSource::Projected);

    let points = (0..opts.count)
        .map(|_| {
            let t = rng.gen_range(opts.t_min..=opts.t_max);
            let (x, y) = ev.predict(t);
            let nx = normal.sample(&mut rng);
            let ny = normal.sample(&mut rng);
            Point::with_t(x + nx, y + ny, t)
        })
        .collect();
    Ok(points)
}

/// Write points as CSV (`x,y` or `x,y,t`).
pub fn write_points_csv(path: &Path, points: &[Point], with_t: bool) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::input(format!("Failed to create CSV '{}': {e}", path.display())))?;
    let write_err = |e: csv::Error| AppError::input(format!("Failed to write CSV '{}': {e}", path.display()));

    if with_t {
        writer.write_record(["x", "y", "t"]).map_err(write_err)?;
    } else {
        writer.write_record(["x", "y"]).map_err(write_err)?;
    }

    for p in points {
        let mut record = vec![p.x.to_string(), p.y.to_string()];
        if with_t {
            record.push(p.t.map(|t| t.to_string()).unwrap_or_default());
        }
        writer.write_record(&record).map_err(write_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush CSV '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::load_points;
    use crate::models::err_e2_l1;

    fn opts(noise: f64, seed: u64) -> SynthOptions {
        SynthOptions {
            params: ParameterTriple::new(28.0, 0.02, 55.0),
            count: 200,
            t_min: 6.0,
            t_max: 60.0,
            noise,
            seed,
        }
    }

    #[test]
    fn same_seed_same_points() {
        let a = generate_points(&opts(0.5, 7)).unwrap();
        let b = generate_points(&opts(0.5, 7)).unwrap();
        let c = generate_points(&opts(0.5, 8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn noiseless_points_lie_on_the_curve() {
        let o = opts(0.0, 1);
        let points = generate_points(&o).unwrap();
        assert!(points.iter().all(|p| p.t.is_some_and(|t| (6.0..=60.0).contains(&t))));
        assert!(err_e2_l1(&points, o.params, TSource::Supplied) < 1e-8);
    }

    #[test]
    fn rejects_bad_options() {
        let mut o = opts(0.1, 1);
        o.count = 0;
        assert!(generate_points(&o).is_err());

        let mut o = opts(0.1, 1);
        o.t_max = o.t_min;
        assert!(generate_points(&o).is_err());

        assert!(generate_points(&opts(-1.0, 1)).is_err());
    }

    #[test]
    fn written_csv_loads_back() {
        let points = generate_points(&opts(0.0, 3)).unwrap();
        let path = std::env::temp_dir().join(format!("dcf-synth-{}.csv", std::process::id()));
        write_points_csv(&path, &points, true).unwrap();
        let data = load_points(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(data.point_set.has_t());
        assert_eq!(data.point_set.points(), points.as_slice());
    }
}
