use super::topic;
use crate::{
    config::MqttConfig,
    services::{
        device_registry::DeviceRegistry,
        telemetry_service::{ServiceError, TelemetryService},
    },
};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::sync::Arc;
use vibration::TelemetrySample;

/// What a broker message turned into.
#[derive(Debug, PartialEq)]
pub enum Handled {
    Telemetry(TelemetrySample),
    Status { device_id: String, status: String },
    Ignored,
}

/// Routes broker publishes to the telemetry service and device registry.
///
/// Kept free of any network handle so it can be driven directly in tests.
pub struct MessageHandler {
    vibration_topic: String,
    status_topic: String,
    telemetry: Arc<TelemetryService>,
    devices: Arc<DeviceRegistry>,
}

impl MessageHandler {
    pub fn new(
        config: &MqttConfig,
        telemetry: Arc<TelemetryService>,
        devices: Arc<DeviceRegistry>,
    ) -> Self {
        Self {
            vibration_topic: config.vibration_topic.clone(),
            status_topic: config.status_topic.clone(),
            telemetry,
            devices,
        }
    }

    /// Topic filters the receiver must subscribe to.
    pub fn subscriptions(&self) -> [&str; 2] {
        [&self.vibration_topic, &self.status_topic]
    }

    pub async fn handle(
        &self,
        topic: &str,
        payload: &[u8],
        received_at: DateTime<Utc>,
    ) -> Result<Handled, ServiceError> {
        if rumqttc::matches(topic, &self.vibration_topic) {
            let sample = self
                .telemetry
                .ingest_broker_payload(payload, received_at.timestamp_millis())
                .await?;

            if let Some(topic_device) = topic::device_id(&self.vibration_topic, topic) {
                if topic_device != sample.device_id {
                    warn!(
                        "Sample on {} claims device id {}",
                        topic, sample.device_id
                    );
                }
            }
            self.devices.touch(&sample.device_id, received_at);

            return Ok(Handled::Telemetry(sample));
        }

        if rumqttc::matches(topic, &self.status_topic) {
            let Some(device_id) = topic::device_id(&self.status_topic, topic) else {
                debug!("Status message on {} carries no device id", topic);
                return Ok(Handled::Ignored);
            };
            let status = String::from_utf8_lossy(payload).trim().to_string();
            self.devices.record_status(device_id, &status, received_at);

            return Ok(Handled::Status {
                device_id: device_id.to_string(),
                status,
            });
        }

        debug!("Ignoring message on unexpected topic {}", topic);
        Ok(Handled::Ignored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::file_sink::FileSink;
    use std::{num::NonZeroUsize, time::Duration};
    use tempfile::TempDir;

    const RAW: &[u8] = br#"{"device_id":"press-04","timestamp_ms":1200,"accel_rms":[0.01,0.02,0.02],"spl_db":72.5,"wifi_rssi":-61}"#;

    fn handler(dir: &TempDir) -> (MessageHandler, Arc<TelemetryService>, Arc<DeviceRegistry>) {
        let sink = FileSink::new(dir.path(), 1, Duration::from_millis(1));
        let telemetry = Arc::new(TelemetryService::new(
            Arc::new(sink),
            NonZeroUsize::new(8).unwrap(),
            true,
        ));
        let devices = Arc::new(DeviceRegistry::new(NonZeroUsize::new(8).unwrap()));
        let handler = MessageHandler::new(&MqttConfig::default(), telemetry.clone(), devices.clone());
        (handler, telemetry, devices)
    }

    #[tokio::test]
    async fn vibration_message_is_ingested() {
        let dir = TempDir::new().unwrap();
        let (handler, telemetry, devices) = handler(&dir);

        let handled = handler
            .handle("factory/press-04/vibration", RAW, Utc::now())
            .await
            .unwrap();

        assert!(matches!(handled, Handled::Telemetry(ref s) if s.device_id == "press-04"));
        assert_eq!(telemetry.buffered(), 1);
        assert_eq!(devices.list()[0].status, "reporting");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn status_message_updates_registry() {
        let dir = TempDir::new().unwrap();
        let (handler, telemetry, devices) = handler(&dir);

        let handled = handler
            .handle("factory/press-04/status", b"online\n", Utc::now())
            .await
            .unwrap();

        assert_eq!(
            handled,
            Handled::Status {
                device_id: "press-04".to_string(),
                status: "online".to_string()
            }
        );
        assert_eq!(devices.list()[0].status, "online");
        assert_eq!(telemetry.buffered(), 0);
    }

    #[tokio::test]
    async fn malformed_vibration_message_is_an_error() {
        let dir = TempDir::new().unwrap();
        let (handler, telemetry, devices) = handler(&dir);

        assert!(
            handler
                .handle("factory/press-04/vibration", b"{not json", Utc::now())
                .await
                .is_err()
        );
        assert_eq!(telemetry.buffered(), 0);
        assert!(devices.list().is_empty());
    }

    #[tokio::test]
    async fn unrelated_topics_are_ignored() {
        let dir = TempDir::new().unwrap();
        let (handler, _, _) = handler(&dir);

        let handled = handler
            .handle("factory/press-04/debug", RAW, Utc::now())
            .await
            .unwrap();

        assert_eq!(handled, Handled::Ignored);
        assert_eq!(handler.subscriptions(), ["factory/+/vibration", "factory/+/status"]);
    }
}
