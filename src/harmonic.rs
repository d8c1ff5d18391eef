//! Least-squares harmonic fitting of a seasonal cycle.
//!
//! A series `y` of length `N` is regressed on the design matrix
//!
//! ```text
//! P = [1, cos(2πt), sin(2πt), ..., cos(2πKt), sin(2πKt)],   t = (1..=N) / N
//! ```
//!
//! and replaced by `P β`. The projection `(PᵀP)⁻¹Pᵀ` depends only on `N` and
//! `K`, so [`HarmonicBasis`] computes it once and applies it to as many
//! series as needed (one per grid cell, typically).
//!
//! Non-finite inputs are not filtered: a single NaN poisons every
//! coefficient, and therefore the whole fitted curve.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct HarmonicBasis {
    harmonics: usize,
    design: DMatrix<f64>,
    projection: DMatrix<f64>,
}

impl HarmonicBasis {
    pub fn new(samples: usize, harmonics: usize) -> Result<Self> {
        let columns = harmonics.saturating_mul(2).saturating_add(1);
        if samples < columns {
            return Err(Error::Underdetermined {
                samples,
                harmonics,
                columns,
            });
        }

        let design = design_matrix(samples, harmonics);
        let normal = design.transpose() * &design;
        let cholesky = normal.cholesky().ok_or(Error::SingularDesign)?;
        let projection = cholesky.solve(&design.transpose());

        Ok(HarmonicBasis {
            harmonics,
            design,
            projection,
        })
    }

    pub fn samples(&self) -> usize {
        self.design.nrows()
    }

    pub fn harmonics(&self) -> usize {
        self.harmonics
    }

    pub fn fit(&self, series: &[f64]) -> Result<HarmonicFit> {
        if series.len() != self.samples() {
            return Err(Error::LengthMismatch {
                expected: self.samples(),
                actual: series.len(),
            });
        }

        let y = DVector::from_column_slice(series);
        let beta = &self.projection * y;
        let fitted = &self.design * &beta;

        Ok(HarmonicFit {
            coefficients: beta.iter().copied().collect(),
            fitted: fitted.iter().copied().collect(),
        })
    }

    /// Fits every series independently, in parallel.
    pub fn fit_batch(&self, series: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        series
            .par_iter()
            .map(|s| self.fit(s).map(|fit| fit.fitted))
            .collect()
    }
}

fn design_matrix(samples: usize, harmonics: usize) -> DMatrix<f64> {
    let n = samples as f64;

    DMatrix::from_fn(samples, 2 * harmonics + 1, |row, col| {
        if col == 0 {
            return 1.0;
        }
        let t = (row + 1) as f64 / n;
        let k = ((col + 1) / 2) as f64;
        let angle = 2.0 * PI * k * t;
        if col % 2 == 1 {
            angle.cos()
        } else {
            angle.sin()
        }
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicFit {
    /// `[mean, a1, b1, a2, b2, ...]` for `a_k cos(2πkt) + b_k sin(2πkt)`.
    pub coefficients: Vec<f64>,
    pub fitted: Vec<f64>,
}

impl HarmonicFit {
    pub fn mean(&self) -> f64 {
        self.coefficients[0]
    }

    pub fn harmonics(&self) -> usize {
        (self.coefficients.len() - 1) / 2
    }

    fn pair(&self, k: usize) -> Option<(f64, f64)> {
        if k == 0 || k > self.harmonics() {
            return None;
        }
        Some((self.coefficients[2 * k - 1], self.coefficients[2 * k]))
    }

    pub fn amplitude(&self, k: usize) -> Option<f64> {
        self.pair(k).map(|(a, b)| a.hypot(b))
    }

    /// Phase `φ` in `[0, 2π)` such that harmonic `k` reads `A cos(2πkt − φ)`.
    pub fn phase(&self, k: usize) -> Option<f64> {
        self.pair(k).map(|(a, b)| b.atan2(a).rem_euclid(2.0 * PI))
    }
}

/// Convenience wrapper building a one-off basis.
pub fn fit_harmonics(series: &[f64], harmonics: usize) -> Result<Vec<f64>> {
    let basis = HarmonicBasis::new(series.len(), harmonics)?;

    Ok(basis.fit(series)?.fitted)
}

// -- Tests -------------------------------------------------------------------
