pub mod device_registry;
pub mod firmware_service;
pub mod telemetry_service;
