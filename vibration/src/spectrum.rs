use log::debug;
use rustfft::{FftPlanner, num_complex::Complex};
use thiserror::Error;

/// Seconds between two consecutive payloads published by a sensor node.
pub const PAYLOAD_INTERVAL_SECS: f64 = 2.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpectrumError {
    #[error("at least 2 samples are required, got {0}")]
    TooFewSamples(usize),

    #[error("sampling interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),

    #[error("sample {index} is not a finite number")]
    NonFiniteSample { index: usize },
}

/// The strongest bin of a one-sided magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominantFrequency {
    /// Centre frequency of the bin, in Hz.
    pub frequency_hz: f64,
    /// Index of the bin in the one-sided spectrum.
    pub bin: usize,
    /// Magnitude of the bin.
    pub magnitude: f64,
    /// Width of one bin, in Hz.
    pub resolution_hz: f64,
}

/// Finds the dominant frequency of an evenly sampled series.
///
/// The mean is removed first so the DC component does not win. Ties resolve
/// to the lowest bin.
///
/// # Example
///
/// ```
/// use vibration::spectrum::dominant_frequency;
///
/// // 0.125 Hz cosine sampled every 2 s: a period of 4 samples.
/// let samples: Vec<f64> = (0..16)
///     .map(|i| (2.0 * std::f64::consts::PI * 0.125 * 2.0 * i as f64).cos())
///     .collect();
///
/// let dominant = dominant_frequency(&samples, 2.0).unwrap();
/// assert!((dominant.frequency_hz - 0.125).abs() < 1e-9);
/// ```
pub fn dominant_frequency(
    samples: &[f64],
    interval_secs: f64,
) -> Result<DominantFrequency, SpectrumError> {
    if samples.len() < 2 {
        return Err(SpectrumError::TooFewSamples(samples.len()));
    }
    if !interval_secs.is_finite() || interval_secs <= 0.0 {
        return Err(SpectrumError::InvalidInterval(interval_secs));
    }
    if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
        return Err(SpectrumError::NonFiniteSample { index });
    }

    let n = samples.len();
    let mean = samples.iter().sum::<f64>() / n as f64;
    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .map(|v| Complex::new(v - mean, 0.0))
        .collect();

    let fft = FftPlanner::new().plan_fft_forward(n);
    fft.process(&mut buffer);

    // Real input: bins above n/2 mirror the ones below.
    let (bin, magnitude) = buffer[..=n / 2]
        .iter()
        .map(|c| c.norm())
        .enumerate()
        .fold((0, f64::MIN), |best, (i, m)| if m > best.1 { (i, m) } else { best });

    let resolution_hz = 1.0 / (n as f64 * interval_secs);
    debug!(
        "spectrum of {} samples: peak at bin {} (|X| = {:.4})",
        n, bin, magnitude
    );

    Ok(DominantFrequency {
        frequency_hz: bin as f64 * resolution_hz,
        bin,
        magnitude,
        resolution_hz,
    })
}
