//! Series smoothing for the time-of-day chart
//!
//! Fits a cubic spline through `(index, elapsed seconds)` and resamples it on
//! a dense uniform grid between the first and last index. The spline uses
//! not-a-knot end conditions, so four points reproduce the single cubic
//! through them. Presentation only; no analytic result depends on it.

use crate::model::TimePoint;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Cubic fit needs degree + 1 points
pub const MIN_POINTS: usize = 4;

/// Grid density used by [`smooth`]
pub const DEFAULT_SAMPLES: usize = 300;

/// Curve handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub points: Vec<TimePoint>,
    /// False when the input was returned unchanged
    pub smoothed: bool,
}

impl Curve {
    fn raw(points: &[TimePoint]) -> Self {
        Self {
            points: points.to_vec(),
            smoothed: false,
        }
    }
}

/// Smooth with the default grid density
pub fn smooth(points: &[TimePoint]) -> Curve {
    smooth_with(points, DEFAULT_SAMPLES)
}

/// Smooth onto `samples` evenly spaced indices spanning `[first, last]`.
///
/// Returns the input unchanged when there are fewer than [`MIN_POINTS`]
/// points, when indices are not strictly increasing, or when the fitted curve
/// cannot be represented as timestamps.
pub fn smooth_with(points: &[TimePoint], samples: usize) -> Curve {
    if points.len() < MIN_POINTS || samples < 2 || !strictly_increasing(points) {
        return Curve::raw(points);
    }

    let t0 = points[0].timestamp;
    let xs: Vec<f64> = points.iter().map(|p| p.index).collect();
    let ys: Vec<f64> = points.iter().map(|p| elapsed_seconds(t0, p.timestamp)).collect();

    let Some(spline) = CubicSpline::not_a_knot(xs, ys) else {
        return Curve::raw(points);
    };

    let lo = points[0].index;
    let hi = points[points.len() - 1].index;
    let step = (hi - lo) / (samples - 1) as f64;

    let mut curve = Vec::with_capacity(samples);
    for k in 0..samples {
        // pin the last sample so rounding never steps past the data
        let index = if k == samples - 1 { hi } else { lo + step * k as f64 };
        match offset(t0, spline.eval(index)) {
            Some(timestamp) => curve.push(TimePoint { index, timestamp }),
            None => return Curve::raw(points),
        }
    }

    Curve {
        points: curve,
        smoothed: true,
    }
}

fn strictly_increasing(points: &[TimePoint]) -> bool {
    points.iter().all(|p| p.index.is_finite())
        && points.windows(2).all(|w| w[1].index > w[0].index)
}

fn elapsed_seconds(t0: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
    let delta = t - t0;
    match delta.num_nanoseconds() {
        Some(ns) => ns as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1000.0,
    }
}

fn offset(t0: DateTime<Utc>, seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let nanos = (seconds * 1e9).round();
    if nanos.abs() >= i64::MAX as f64 {
        return None;
    }
    t0.checked_add_signed(Duration::nanoseconds(nanos as i64))
}

/// Interpolating cubic spline in second-derivative form
struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    m: Vec<f64>,
}

impl CubicSpline {
    /// Needs at least 4 strictly increasing knots
    fn not_a_knot(xs: Vec<f64>, ys: Vec<f64>) -> Option<Self> {
        let n = xs.len();
        if n < MIN_POINTS || ys.len() != n {
            return None;
        }
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

        let mut a = vec![vec![0.0; n]; n];
        let mut rhs = vec![0.0; n];

        // third derivative continuous across x[1]
        a[0][0] = h[1];
        a[0][1] = -(h[0] + h[1]);
        a[0][2] = h[0];

        for i in 1..n - 1 {
            a[i][i - 1] = h[i - 1];
            a[i][i] = 2.0 * (h[i - 1] + h[i]);
            a[i][i + 1] = h[i];
            rhs[i] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        }

        // and across x[n-2]
        a[n - 1][n - 3] = h[n - 2];
        a[n - 1][n - 2] = -(h[n - 3] + h[n - 2]);
        a[n - 1][n - 1] = h[n - 3];

        let m = solve(a, rhs)?;
        Some(Self { xs, ys, m })
    }

    fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let i = self
            .xs
            .partition_point(|&k| k <= x)
            .saturating_sub(1)
            .min(n - 2);

        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let h = x1 - x0;
        let (l, r) = (x1 - x, x - x0);

        m0 * l.powi(3) / (6.0 * h)
            + m1 * r.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * l
            + (y1 / h - m1 * h / 6.0) * r
    }
}

/// Gaussian elimination with partial pivoting. `None` if singular.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}
