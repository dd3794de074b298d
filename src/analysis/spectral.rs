//! Welch power-spectral-density estimation for short joint-angle series.
//!
//! Each segment is mean-detrended, multiplied by a periodic Hann window and transformed with
//! `rustfft`. The one-sided density is scaled by `1 / (fs * sum(w^2))`, and the periodograms of
//! all half-overlapping segments are averaged. A series shorter than the configured segment
//! length is analysed as a single segment of its own length.
//!
//! # Example
//!
//! ```
//! use kinematic_monitor::analysis::spectral::WelchEstimator;
//!
//! let fps = 30.0;
//! let series: Vec<f64> = (0..64)
//!     .map(|i| (2.0 * std::f64::consts::PI * 12.0 * i as f64 / fps).sin())
//!     .collect();
//!
//! let mut welch = WelchEstimator::new(256);
//! let ratio = welch.high_freq_energy_ratio(&series, fps).unwrap();
//! // 12 Hz sits above half of the 15 Hz Nyquist limit.
//! assert!(ratio > 0.9);
//! ```

use crate::analysis::stats;
use num_complex::Complex;
use rustfft::FftPlanner;
use tracing::trace;

/// One-sided power spectral density.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerSpectrum {
    /// Bin frequencies in Hz, from 0 to the Nyquist limit.
    pub frequencies: Vec<f64>,
    pub density: Vec<f64>,
}

impl PowerSpectrum {
    pub fn total_energy(&self) -> f64 {
        self.density.iter().sum()
    }

    /// Share of energy in bins strictly above half of the highest resolved frequency.
    ///
    /// `None` when the spectrum carries no energy at all (a constant series).
    pub fn high_freq_energy_ratio(&self) -> Option<f64> {
        let max_freq = self.frequencies.iter().copied().fold(f64::MIN, f64::max);
        let total = self.total_energy();
        if !(total.is_finite() && total > 0.0) {
            return None;
        }
        let high: f64 = self
            .frequencies
            .iter()
            .zip(&self.density)
            .filter(|(f, _)| **f > 0.5 * max_freq)
            .map(|(_, p)| p)
            .sum();
        Some(high / total)
    }
}

/// Welch estimator that reuses FFT plans across calls.
pub struct WelchEstimator {
    max_segment_len: usize,
    planner: FftPlanner<f64>,
}

impl WelchEstimator {
    /// Creates an estimator whose segments are at most `max_segment_len` samples long.
    pub fn new(max_segment_len: usize) -> Self {
        Self {
            max_segment_len: max_segment_len.max(2),
            planner: FftPlanner::new(),
        }
    }

    /// Estimates the PSD of `series` sampled at `sampling_rate` Hz.
    ///
    /// Needs at least two samples and a positive sampling rate.
    pub fn estimate(&mut self, series: &[f64], sampling_rate: f64) -> Option<PowerSpectrum> {
        if series.len() < 2 || !(sampling_rate.is_finite() && sampling_rate > 0.0) {
            return None;
        }
        let segment_len = self.max_segment_len.min(series.len());
        let step = segment_len - segment_len / 2;
        let window = hann_periodic(segment_len);
        let window_power: f64 = window.iter().map(|w| w * w).sum();
        let fft = self.planner.plan_fft_forward(segment_len);

        let num_bins = segment_len / 2 + 1;
        let mut density = vec![0.0; num_bins];
        let mut segments = 0usize;
        let mut start = 0;
        while start + segment_len <= series.len() {
            let segment = &series[start..start + segment_len];
            let mean = stats::mean(segment).unwrap_or(0.0);
            let mut buffer: Vec<Complex<f64>> = segment
                .iter()
                .zip(&window)
                .map(|(&v, &w)| Complex::new((v - mean) * w, 0.0))
                .collect();
            fft.process(&mut buffer);
            for (acc, bin) in density.iter_mut().zip(&buffer[..num_bins]) {
                *acc += bin.norm_sqr();
            }
            segments += 1;
            start += step;
        }
        trace!(segments, segment_len, "welch estimate");

        let scale = 1.0 / (sampling_rate * window_power * segments as f64);
        // Fold negative frequencies in; DC and (for even lengths) Nyquist appear once.
        let last_doubled = if segment_len % 2 == 0 {
            num_bins - 1
        } else {
            num_bins
        };
        for (k, p) in density.iter_mut().enumerate() {
            *p *= scale;
            if k > 0 && k < last_doubled {
                *p *= 2.0;
            }
        }

        let resolution = sampling_rate / segment_len as f64;
        let frequencies = (0..num_bins).map(|k| k as f64 * resolution).collect();
        Some(PowerSpectrum {
            frequencies,
            density,
        })
    }

    /// Energy share above half the Nyquist-limited bandwidth; see
    /// [`PowerSpectrum::high_freq_energy_ratio`].
    pub fn high_freq_energy_ratio(&mut self, series: &[f64], sampling_rate: f64) -> Option<f64> {
        self.estimate(series, sampling_rate)?.high_freq_energy_ratio()
    }
}

impl Default for WelchEstimator {
    fn default() -> Self {
        Self::new(256)
    }
}

fn hann_periodic(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / len as f64).cos())
        .collect()
}
