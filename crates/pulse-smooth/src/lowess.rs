//! LOWESS settings and the batch fit used for every share series.
//!
//! Fits run through `fastLowess` with a tricube kernel, bisquare robustness
//! and no delta interpolation, one single-threaded batch fit per series. The
//! worker pool parallelizes across series instead.

use fastLowess::prelude::{Batch, Bisquare, Lowess as LowessBuilder, Tricube};

use crate::error::{Result, SmoothError};

/// LOWESS smoother configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lowess {
    /// Fraction of the points used in each local fit.
    pub frac: f64,
    /// Robustifying passes after the initial fit.
    pub iterations: usize,
}

impl Default for Lowess {
    fn default() -> Self {
        Self {
            frac: 0.2,
            iterations: 3,
        }
    }
}

impl Lowess {
    pub fn new(frac: f64, iterations: usize) -> Result<Self> {
        if !(frac > 0.0 && frac <= 1.0) {
            return Err(SmoothError::InvalidParameters(format!(
                "frac must be in (0, 1], got {frac}"
            )));
        }
        Ok(Self { frac, iterations })
    }

    /// Smoothed values of `y` at each `x`, in input order.
    ///
    /// Series shorter than two points are returned unchanged.
    pub fn fit(&self, x: &[f64], y: &[f64]) -> Result<Vec<f64>> {
        if x.len() != y.len() {
            return Err(SmoothError::Fit(format!(
                "{} x values for {} y values",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Ok(y.to_vec());
        }

        let result = LowessBuilder::<f64>::new()
            .fraction(self.frac)
            .iterations(self.iterations)
            .delta(0.0)
            .weight_function(Tricube)
            .robustness_method(Bisquare)
            .adapter(Batch)
            .parallel(false)
            .build()
            .map_err(|e| SmoothError::Fit(e.to_string()))?
            .fit(x, y)
            .map_err(|e| SmoothError::Fit(e.to_string()))?;
        Ok(result.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_points_are_reproduced() {
        let fit = Lowess::new(1.0, 3).unwrap().fit(&[0.0, 7.0], &[0.2, 0.4]).unwrap();
        assert!((fit[0] - 0.2).abs() < 1e-9);
        assert!((fit[1] - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_full_span_preserves_straight_lines() {
        let x: Vec<f64> = (0..12).map(|i| f64::from(i) * 7.0).collect();
        let y: Vec<f64> = x.iter().map(|v| 0.5 - 0.002 * v).collect();
        let fit = Lowess::new(1.0, 3).unwrap().fit(&x, &y).unwrap();
        for (f, expected) in fit.iter().zip(&y) {
            assert!((f - expected).abs() < 1e-9, "{f} vs {expected}");
        }
    }

    #[test]
    fn test_outliers_are_downweighted() {
        let x: Vec<f64> = (0..20).map(f64::from).collect();
        let mut y = vec![0.3; 20];
        y[10] = 0.9;
        let robust = Lowess::new(0.5, 3).unwrap().fit(&x, &y).unwrap();
        let plain = Lowess::new(0.5, 0).unwrap().fit(&x, &y).unwrap();
        assert!((plain[9] - 0.3).abs() > (robust[9] - 0.3).abs());
        assert!((robust[9] - 0.3).abs() < 0.01);
    }

    #[test]
    fn test_rejects_bad_fraction() {
        assert!(Lowess::new(0.0, 3).is_err());
        assert!(Lowess::new(1.5, 3).is_err());
    }

    #[test]
    fn test_short_series_pass_through() {
        assert_eq!(Lowess::default().fit(&[3.0], &[0.4]).unwrap(), vec![0.4]);
        assert!(Lowess::default().fit(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_lengths_are_an_error() {
        assert!(matches!(
            Lowess::default().fit(&[1.0, 2.0], &[0.4]),
            Err(SmoothError::Fit(_))
        ));
    }
}
