//! FFT based low-pass / high-pass split of a series.

use rustfft::{num_complex::Complex64, FftPlanner};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct SpectralDecomposition {
    /// Mean plus the first `harmonics - 1` harmonics.
    pub low_pass: Vec<f64>,
    /// Everything else.
    pub high_pass: Vec<f64>,
}

/// Splits `series` in the frequency domain.
///
/// The low-pass keeps coefficients `0..harmonics` together with their
/// negative-frequency mirrors `n-harmonics+1..n`; the high-pass keeps the
/// complement. The two bands partition the spectrum, so their sum returns
/// the input up to rounding. NaN anywhere in the input spreads to every
/// output value.
pub fn harmonic_smoother(series: &[f64], harmonics: usize) -> Result<SpectralDecomposition> {
    let n = series.len();
    if n == 0 {
        return Err(Error::EmptySeries);
    }
    // The mirror band must not reach back into 0..harmonics.
    if harmonics > (n + 1) / 2 {
        return Err(Error::CutoffTooHigh { harmonics, len: n });
    }

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut spectrum: Vec<Complex64> = series.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    forward.process(&mut spectrum);

    let zero = Complex64::new(0.0, 0.0);
    let mut low = spectrum.clone();
    let mut high = spectrum;
    for index in 0..n {
        if in_low_band(index, n, harmonics) {
            high[index] = zero;
        } else {
            low[index] = zero;
        }
    }

    inverse.process(&mut low);
    inverse.process(&mut high);

    let scale = 1.0 / n as f64;
    Ok(SpectralDecomposition {
        low_pass: low.iter().map(|z| z.re * scale).collect(),
        high_pass: high.iter().map(|z| z.re * scale).collect(),
    })
}

fn in_low_band(index: usize, n: usize, harmonics: usize) -> bool {
    index < harmonics || index > n - harmonics
}

/// One-sided power `2|Z_k / N|²` for `k = 0..=N/2`.
pub fn power_spectrum(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex64> = series.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    FftPlanner::<f64>::new()
        .plan_fft_forward(n)
        .process(&mut buffer);

    buffer
        .iter()
        .take(n / 2 + 1)
        .map(|z| 2.0 * (*z / n as f64).norm_sqr())
        .collect()
}

/// Period, in samples, of the strongest non-zero frequency.
///
/// `None` for fewer than two samples or a spectrum with non-finite power.
pub fn dominant_period(series: &[f64]) -> Option<f64> {
    let power = power_spectrum(series);
    if power.iter().any(|p| !p.is_finite()) {
        return None;
    }

    power
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(k, _)| series.len() as f64 / k as f64)
}

// -- Tests -------------------------------------------------------------------
