use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Last known state of a sensor node.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeviceStatus {
    #[schema(example = "esp32-press-04")]
    pub device_id: String,
    /// Last value published on the node's status topic, or `reporting` if
    /// the node has only sent telemetry so far.
    #[schema(example = "online")]
    pub status: String,
    pub last_seen: DateTime<Utc>,
}
