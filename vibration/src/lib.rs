//! Vibration telemetry model and the signal math shared by the ingestion
//! server and the offline analyzer.
//!
//! A [`TelemetrySample`] is what a sensor node publishes every couple of
//! seconds: per-axis acceleration RMS, sound pressure level and link quality.
//! From a batch of samples the crate derives the ISO 10816 style
//! [`severity`] and the [`dominant_frequency`] of one axis over time.

pub mod sample;
pub mod severity;
pub mod spectrum;
pub mod summary;

pub use sample::{SampleError, TelemetryPayload, TelemetrySample};
pub use severity::{MPS2_TO_MMS, SeverityZone, severity, try_severity};
pub use spectrum::{DominantFrequency, PAYLOAD_INTERVAL_SECS, SpectrumError, dominant_frequency};
pub use summary::{Summary, SummaryError};
