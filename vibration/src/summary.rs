use crate::{
    sample::{AXES, TelemetrySample},
    severity::SeverityZone,
    spectrum::{DominantFrequency, SpectrumError, dominant_frequency},
};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SummaryError {
    #[error("no telemetry samples to summarize")]
    Empty,

    #[error("frequency analysis failed: {0}")]
    Spectrum(#[from] SpectrumError),
}

/// Aggregate view of a batch of telemetry samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub samples: usize,
    /// Per-axis mean of the acceleration RMS, m/s².
    pub accel_mean: [f64; AXES],
    /// Median severity, mm/s.
    pub severity_median: f64,
    pub severity_zone: SeverityZone,
    /// Mean sound pressure level, dB.
    pub spl_mean: f64,
    /// Dominant frequency of the X axis over time. `None` for a single sample.
    pub dominant: Option<DominantFrequency>,
}

impl Summary {
    pub fn from_samples(
        samples: &[TelemetrySample],
        interval_secs: f64,
    ) -> Result<Self, SummaryError> {
        if samples.is_empty() {
            return Err(SummaryError::Empty);
        }
        let count = samples.len() as f64;

        let mut accel_mean = [0.0; AXES];
        for sample in samples {
            for (acc, v) in accel_mean.iter_mut().zip(sample.accel_rms) {
                *acc += v;
            }
        }
        accel_mean.iter_mut().for_each(|acc| *acc /= count);

        let severities: Vec<f64> = samples.iter().map(TelemetrySample::severity).collect();
        let severity_median = median(severities);

        let spl_mean = samples.iter().map(|s| s.spl_db).sum::<f64>() / count;

        let dominant = if samples.len() < 2 {
            None
        } else {
            let x_axis: Vec<f64> = samples.iter().map(|s| s.accel_rms[0]).collect();
            Some(dominant_frequency(&x_axis, interval_secs)?)
        };

        Ok(Self {
            samples: samples.len(),
            accel_mean,
            severity_median,
            severity_zone: SeverityZone::classify(severity_median),
            spl_mean,
            dominant,
        })
    }
}

/// Median of a non-empty list; the mean of the middle pair for even lengths.
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Telemetry summary ===")?;
        writeln!(f, "Samples: {}", self.samples)?;
        writeln!(
            f,
            "Accel RMS mean (m/s^2): [{:.4} {:.4} {:.4}]",
            self.accel_mean[0], self.accel_mean[1], self.accel_mean[2]
        )?;
        writeln!(f, "Accel severity (mm/s) median: {:.2}", self.severity_median)?;
        writeln!(f, "Severity zone (ISO 10816-1, class I): {}", self.severity_zone)?;
        writeln!(f, "SPL mean (dB): {:.1}", self.spl_mean)?;
        match &self.dominant {
            Some(dominant) => write!(
                f,
                "Dominant vibration frequency: {:.2} Hz",
                dominant.frequency_hz
            ),
            None => write!(f, "Dominant vibration frequency: n/a (need at least 2 samples)"),
        }
    }
}
