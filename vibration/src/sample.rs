use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of acceleration axes a sensor reports.
pub const AXES: usize = 3;

/// Errors raised while turning a wire payload into a [`TelemetrySample`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SampleError {
    #[error("accel_rms must have exactly 3 components, got {0}")]
    AccelArity(usize),

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("device_id must not be empty")]
    EmptyDeviceId,
}

/// Telemetry exactly as it arrives on the wire.
///
/// `accel_rms` is kept as a list here so that a wrong number of axes can be
/// reported as a validation error instead of a generic decoding failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TelemetryPayload {
    /// Sensor node identifier.
    #[cfg_attr(feature = "openapi", schema(example = "esp32-press-04"))]
    pub device_id: String,
    /// Device timestamp in milliseconds.
    #[cfg_attr(feature = "openapi", schema(example = 1718000000000_i64))]
    pub timestamp_ms: i64,
    /// Per-axis acceleration RMS (x, y, z) in m/s².
    pub accel_rms: Vec<f64>,
    /// Sound pressure level in dB.
    #[cfg_attr(feature = "openapi", schema(example = 71.4))]
    pub spl_db: f64,
    /// Wi-Fi signal strength in dBm.
    #[cfg_attr(feature = "openapi", schema(example = -61))]
    pub wifi_rssi: i32,
}

/// A validated telemetry sample.
///
/// Samples are append-only facts: nothing mutates one after it has been
/// accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TelemetryPayload")]
pub struct TelemetrySample {
    pub device_id: String,
    pub timestamp_ms: i64,
    pub accel_rms: [f64; AXES],
    pub spl_db: f64,
    pub wifi_rssi: i32,
}

impl TelemetrySample {
    pub fn new(
        device_id: impl Into<String>,
        timestamp_ms: i64,
        accel_rms: [f64; AXES],
        spl_db: f64,
        wifi_rssi: i32,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp_ms,
            accel_rms,
            spl_db,
            wifi_rssi,
        }
    }

    /// Overall vibration severity in mm/s.
    pub fn severity(&self) -> f64 {
        crate::severity::severity(&self.accel_rms)
    }
}

impl TryFrom<TelemetryPayload> for TelemetrySample {
    type Error = SampleError;

    fn try_from(payload: TelemetryPayload) -> Result<Self, Self::Error> {
        if payload.device_id.trim().is_empty() {
            return Err(SampleError::EmptyDeviceId);
        }

        let accel_rms: [f64; AXES] = payload
            .accel_rms
            .as_slice()
            .try_into()
            .map_err(|_| SampleError::AccelArity(payload.accel_rms.len()))?;

        if accel_rms.iter().any(|v| !v.is_finite()) {
            return Err(SampleError::NonFinite { field: "accel_rms" });
        }
        if !payload.spl_db.is_finite() {
            return Err(SampleError::NonFinite { field: "spl_db" });
        }

        Ok(Self {
            device_id: payload.device_id,
            timestamp_ms: payload.timestamp_ms,
            accel_rms,
            spl_db: payload.spl_db,
            wifi_rssi: payload.wifi_rssi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(accel_rms: Vec<f64>) -> TelemetryPayload {
        TelemetryPayload {
            device_id: "node-1".to_string(),
            timestamp_ms: 1000,
            accel_rms,
            spl_db: 70.0,
            wifi_rssi: -55,
        }
    }

    #[test]
    fn accepts_three_axes() {
        let sample = TelemetrySample::try_from(payload(vec![0.1, 0.2, 0.3])).unwrap();

        assert_eq!(sample.accel_rms, [0.1, 0.2, 0.3]);
        assert_eq!(sample.device_id, "node-1");
    }

    #[test]
    fn rejects_wrong_arity() {
        assert_eq!(
            TelemetrySample::try_from(payload(vec![0.1, 0.2])),
            Err(SampleError::AccelArity(2))
        );
        assert_eq!(
            TelemetrySample::try_from(payload(vec![0.1, 0.2, 0.3, 0.4])),
            Err(SampleError::AccelArity(4))
        );
        assert_eq!(
            TelemetrySample::try_from(payload(vec![])),
            Err(SampleError::AccelArity(0))
        );
    }

    #[test]
    fn rejects_blank_device_id() {
        let mut p = payload(vec![0.1, 0.2, 0.3]);
        p.device_id = "  ".to_string();

        assert_eq!(TelemetrySample::try_from(p), Err(SampleError::EmptyDeviceId));
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut p = payload(vec![0.1, f64::NAN, 0.3]);
        assert_eq!(
            TelemetrySample::try_from(p.clone()),
            Err(SampleError::NonFinite { field: "accel_rms" })
        );

        p.accel_rms = vec![0.1, 0.2, 0.3];
        p.spl_db = f64::INFINITY;
        assert_eq!(
            TelemetrySample::try_from(p),
            Err(SampleError::NonFinite { field: "spl_db" })
        );
    }

    #[test]
    fn deserializes_through_validation() {
        let json = r#"{"device_id":"node-7","timestamp_ms":42,"accel_rms":[1.0,2.0,2.0],"spl_db":60.5,"wifi_rssi":-70}"#;
        let sample: TelemetrySample = serde_json::from_str(json).unwrap();

        assert_eq!(sample.timestamp_ms, 42);
        assert_eq!(sample.severity(), 3000.0);

        let bad = r#"{"device_id":"node-7","timestamp_ms":42,"accel_rms":[1.0,2.0],"spl_db":60.5,"wifi_rssi":-70}"#;
        let err = serde_json::from_str::<TelemetrySample>(bad).unwrap_err();
        assert!(err.to_string().contains("exactly 3 components"));
    }

    #[test]
    fn rejects_mistyped_fields() {
        let json = r#"{"device_id":"node-7","timestamp_ms":"soon","accel_rms":[1.0,2.0,2.0],"spl_db":60.5,"wifi_rssi":-70}"#;
        assert!(serde_json::from_str::<TelemetrySample>(json).is_err());

        let missing = r#"{"device_id":"node-7","accel_rms":[1.0,2.0,2.0],"spl_db":60.5,"wifi_rssi":-70}"#;
        assert!(serde_json::from_str::<TelemetrySample>(missing).is_err());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let sample = TelemetrySample::new("node-2", 5, [0.5, 0.25, 0.125], 61.0, -40);
        let value = serde_json::to_value(&sample).unwrap();

        assert_eq!(value["device_id"], "node-2");
        assert_eq!(value["accel_rms"][2], 0.125);
        assert_eq!(value["wifi_rssi"], -40);
    }
}
