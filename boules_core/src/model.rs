//! Calibration fitting: measured throw distances → mapping table.
//!
//! The engineer throws at lift percentages 0, 5, ..., 95 and measures where
//! the ball stops. A model `distance = f(percent)` is fitted to those 20
//! points, sampled every half percent from 0.5 to 95, and inverted: each whole
//! centimetre in the sampled range gets the sample percentage whose distance
//! is closest to it.

use std::fmt;
use std::str::FromStr;

use crate::error::ThrowError;
use crate::mapping::DistanceMap;

/// Number of measurements in a calibration series.
pub const CALIBRATION_POINTS: usize = 20;
/// Percent spacing between measurements.
pub const CALIBRATION_STEP_PERCENT: f64 = 5.0;
/// Sampling resolution of the fitted model, in percent.
const EVAL_STEP_PERCENT: f64 = 0.5;
const EVAL_POINTS: usize = 190;
/// Refuse fits whose distance span is absurd (bad data, runaway polynomial).
const MAX_SPAN_CM: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Piecewise linear interpolation through the measurements.
    SplineLinear,
    /// Cubic interpolating spline with not-a-knot ends.
    #[default]
    SplineCubic,
    /// Least-squares straight line.
    PolyLinear,
    /// Least-squares cubic polynomial.
    PolyCubic,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::SplineLinear,
        ModelKind::SplineCubic,
        ModelKind::PolyLinear,
        ModelKind::PolyCubic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::SplineLinear => "spline_linear",
            ModelKind::SplineCubic => "spline_cubic",
            ModelKind::PolyLinear => "poly_linear",
            ModelKind::PolyCubic => "poly_cubic",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ThrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ThrowError::Config(format!("unknown model kind '{s}'")))
    }
}

/// Twenty measured distances, one per lift percentage 0, 5, ..., 95.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSeries {
    distances_cm: Vec<f64>,
}

impl CalibrationSeries {
    pub fn new(distances_cm: Vec<f64>) -> Result<Self, ThrowError> {
        if distances_cm.len() != CALIBRATION_POINTS {
            return Err(ThrowError::InvalidCalibrationData(format!(
                "expected {CALIBRATION_POINTS} measurements, got {}",
                distances_cm.len()
            )));
        }
        if let Some(i) = distances_cm.iter().position(|d| !d.is_finite()) {
            return Err(ThrowError::InvalidCalibrationData(format!(
                "measurement at {} % is not finite",
                i as f64 * CALIBRATION_STEP_PERCENT
            )));
        }
        Ok(Self { distances_cm })
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances_cm
    }

    /// The lift percentages the measurements belong to.
    pub fn percentages() -> Vec<f64> {
        (0..CALIBRATION_POINTS)
            .map(|i| i as f64 * CALIBRATION_STEP_PERCENT)
            .collect()
    }
}

/// Fit `kind` to `series` and invert it into a [`DistanceMap`].
pub fn fit(series: &CalibrationSeries, kind: ModelKind) -> Result<DistanceMap, ThrowError> {
    let xs = CalibrationSeries::percentages();
    let ys = series.distances();
    let points = evaluation_points();

    let values: Vec<f64> = match kind {
        ModelKind::SplineLinear => points.iter().map(|&x| linear_interp(&xs, ys, x)).collect(),
        ModelKind::SplineCubic => {
            let spline = CubicSpline::not_a_knot(&xs, ys)?;
            points.iter().map(|&x| spline.eval(x)).collect()
        }
        ModelKind::PolyLinear | ModelKind::PolyCubic => {
            let degree = if kind == ModelKind::PolyLinear { 1 } else { 3 };
            let poly = Polynomial::least_squares(&xs, ys, degree)?;
            points.iter().map(|&x| poly.eval(x)).collect()
        }
    };

    let map = invert(&points, &values)?;
    tracing::debug!(
        model = %kind,
        start = map.start(),
        end = map.end(),
        entries = map.len(),
        "calibration model fitted"
    );
    Ok(map)
}

fn evaluation_points() -> Vec<f64> {
    (1..=EVAL_POINTS)
        .map(|i| i as f64 * EVAL_STEP_PERCENT)
        .collect()
}

/// For each whole centimetre in the sampled range, pick the closest sample.
fn invert(points: &[f64], values: &[f64]) -> Result<DistanceMap, ThrowError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ThrowError::InvalidCalibrationData(
            "model produced non-finite distances".into(),
        ));
    }
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min).ceil();
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max).floor();
    if lo > hi {
        return Err(ThrowError::InvalidCalibrationData(
            "model covers no whole centimetre".into(),
        ));
    }
    if hi - lo > MAX_SPAN_CM || lo < f64::from(i32::MIN) || hi > f64::from(i32::MAX) {
        return Err(ThrowError::InvalidCalibrationData(format!(
            "model spans an implausible range [{lo}, {hi}] cm"
        )));
    }

    let mut entries = Vec::with_capacity((hi - lo) as usize + 1);
    for cm in (lo as i32)..=(hi as i32) {
        let target = f64::from(cm);
        let mut best = 0;
        for (i, v) in values.iter().enumerate() {
            if (v - target).abs() < (values[best] - target).abs() {
                best = i;
            }
        }
        entries.push((cm, points[best] / 100.0));
    }
    DistanceMap::new(entries)
}

/// Piecewise linear interpolation; `xs` ascending, `x` inside `[xs[0], xs[n-1]]`.
fn linear_interp(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let i = segment(xs, x);
    let t = (x - xs[i]) / (xs[i + 1] - xs[i]);
    ys[i] + t * (ys[i + 1] - ys[i])
}

/// Index `i` of the interval `[xs[i], xs[i+1]]` holding `x`.
fn segment(xs: &[f64], x: f64) -> usize {
    let last = xs.len() - 2;
    xs.windows(2).position(|w| x <= w[1]).unwrap_or(last).min(last)
}

struct CubicSpline<'a> {
    xs: &'a [f64],
    ys: &'a [f64],
    /// Second derivative at each knot.
    m: Vec<f64>,
}

impl<'a> CubicSpline<'a> {
    /// Interpolating cubic spline whose third derivative is continuous across
    /// the second and second-to-last knots.
    fn not_a_knot(xs: &'a [f64], ys: &'a [f64]) -> Result<Self, ThrowError> {
        let n = xs.len();
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let mut a = vec![vec![0.0; n]; n];
        let mut b = vec![0.0; n];

        a[0][0] = -h[1];
        a[0][1] = h[0] + h[1];
        a[0][2] = -h[0];
        for i in 1..n - 1 {
            a[i][i - 1] = h[i - 1];
            a[i][i] = 2.0 * (h[i - 1] + h[i]);
            a[i][i + 1] = h[i];
            b[i] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        }
        a[n - 1][n - 3] = -h[n - 2];
        a[n - 1][n - 2] = h[n - 3] + h[n - 2];
        a[n - 1][n - 1] = -h[n - 3];

        let m = solve(a, b).ok_or_else(|| {
            ThrowError::InvalidCalibrationData("cubic spline system is singular".into())
        })?;
        Ok(Self { xs, ys, m })
    }

    fn eval(&self, x: f64) -> f64 {
        let i = segment(self.xs, x);
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

/// Polynomial in a rescaled variable `u = x / scale` for conditioning.
struct Polynomial {
    coeffs: Vec<f64>,
    scale: f64,
}

impl Polynomial {
    fn least_squares(xs: &[f64], ys: &[f64], degree: usize) -> Result<Self, ThrowError> {
        let scale = xs.iter().copied().fold(0.0, f64::max).max(1.0);
        let k = degree + 1;
        let mut ata = vec![vec![0.0; k]; k];
        let mut aty = vec![0.0; k];
        for (&x, &y) in xs.iter().zip(ys) {
            let u = x / scale;
            let pows: Vec<f64> = (0..k).map(|p| u.powi(p as i32)).collect();
            for r in 0..k {
                aty[r] += pows[r] * y;
                for c in 0..k {
                    ata[r][c] += pows[r] * pows[c];
                }
            }
        }
        let coeffs = solve(ata, aty).ok_or_else(|| {
            ThrowError::InvalidCalibrationData("polynomial fit is singular".into())
        })?;
        Ok(Self { coeffs, scale })
    }

    fn eval(&self, x: f64) -> f64 {
        let u = x / self.scale;
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * u + c)
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
            let f = a[row][col] / a[col][col];
            if f == 0.0 {
                continue;
            }
            for c in col..n {
                a[row][c] -= f * a[col][c];
            }
            b[row] -= f * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let s: f64 = (row + 1..n).map(|c| a[row][c] * x[c]).sum();
        x[row] = (b[row] - s) / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_small_system() {
        let x = solve(vec![vec![2.0, 1.0], vec![1.0, 3.0]], vec![3.0, 5.0]).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn singular_system_is_none() {
        assert!(solve(vec![vec![1.0, 2.0], vec![2.0, 4.0]], vec![1.0, 2.0]).is_none());
    }

    #[test]
    fn cubic_spline_reproduces_a_cubic() {
        let xs = CalibrationSeries::percentages();
        let f = |x: f64| 3.0 + 0.5 * x - 0.01 * x * x + 0.0001 * x * x * x;
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let s = CubicSpline::not_a_knot(&xs, &ys).unwrap();
        for x in [0.5, 12.25, 47.0, 94.5, 95.0] {
            assert!((s.eval(x) - f(x)).abs() < 1e-6, "x = {x}");
        }
    }

    #[test]
    fn polynomial_fit_recovers_line() {
        let xs = CalibrationSeries::percentages();
        let ys: Vec<f64> = xs.iter().map(|&x| 7.0 + 2.0 * x).collect();
        let p = Polynomial::least_squares(&xs, &ys, 1).unwrap();
        assert!((p.eval(50.0) - 107.0).abs() < 1e-9);
    }

    #[test]
    fn model_kind_parses_names() {
        for k in ModelKind::ALL {
            assert_eq!(k.as_str().parse::<ModelKind>().unwrap(), k);
        }
        assert!("spline".parse::<ModelKind>().is_err());
    }

    #[test]
    fn flat_measurements_cover_no_centimetre() {
        let series = CalibrationSeries::new(vec![10.5; CALIBRATION_POINTS]).unwrap();
        let err = fit(&series, ModelKind::SplineLinear).unwrap_err();
        assert!(matches!(err, ThrowError::InvalidCalibrationData(_)));
    }
}
