use crate::repository::{
    Source, StorageError, TelemetrySink,
    recent::RecentSamples,
};
use log::info;
use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};
use thiserror::Error;
use vibration::{SampleError, TelemetryPayload, TelemetrySample};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid telemetry: {0}")]
    Invalid(#[from] SampleError),

    #[error("telemetry payload is not valid JSON: {0}")]
    Decode(serde_json::Error),

    #[error("cannot encode telemetry: {0}")]
    Encode(serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Ingestion and retrieval of telemetry samples.
///
/// Every accepted sample is made durable through the sink before it becomes
/// visible in the recent-samples buffer, so a failed write leaves the buffer
/// untouched.
pub struct TelemetryService {
    sink: Arc<dyn TelemetrySink>,
    recent: RecentSamples,
    feed_broker_samples: bool,
}

impl TelemetryService {
    pub fn new(
        sink: Arc<dyn TelemetrySink>,
        capacity: NonZeroUsize,
        feed_broker_samples: bool,
    ) -> Self {
        Self {
            sink,
            recent: RecentSamples::new(capacity),
            feed_broker_samples,
        }
    }

    /// Validates and ingests a sample posted over HTTP.
    pub async fn ingest_payload(&self, payload: TelemetryPayload) -> Result<PathBuf, ServiceError> {
        let sample = TelemetrySample::try_from(payload)?;
        self.ingest(sample).await
    }

    /// Persists a validated sample under `rest_<timestamp_ms>` and buffers it.
    pub async fn ingest(&self, sample: TelemetrySample) -> Result<PathBuf, ServiceError> {
        let contents = serde_json::to_vec(&sample).map_err(ServiceError::Encode)?;
        let path = self
            .sink
            .store(Source::Rest, sample.timestamp_ms, &contents)
            .await?;

        info!(
            "Ingested sample from {} (t={} ms) into {}",
            sample.device_id,
            sample.timestamp_ms,
            path.display()
        );
        self.recent.push(sample);

        Ok(path)
    }

    /// Decodes a broker message and persists the raw payload under
    /// `mqtt_<received_at_ms>`.
    ///
    /// Broker samples only reach the recent buffer when feeding is enabled.
    pub async fn ingest_broker_payload(
        &self,
        payload: &[u8],
        received_at_ms: i64,
    ) -> Result<TelemetrySample, ServiceError> {
        let sample: TelemetrySample =
            serde_json::from_slice(payload).map_err(ServiceError::Decode)?;

        let path = self
            .sink
            .store(Source::Mqtt, received_at_ms, payload)
            .await?;

        info!(
            "Stored broker sample from {} into {}",
            sample.device_id,
            path.display()
        );
        if self.feed_broker_samples {
            self.recent.push(sample.clone());
        }

        Ok(sample)
    }

    /// The `n` most recent samples, most recent first. Never touches storage.
    pub fn latest(&self, n: usize) -> Vec<TelemetrySample> {
        self.recent.latest(n)
    }

    pub fn buffered(&self) -> usize {
        self.recent.len()
    }
}
