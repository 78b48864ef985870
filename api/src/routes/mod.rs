pub mod api;
pub mod devices;
pub mod ota;
pub mod telemetry;
