pub mod config;
pub mod error;
pub mod messaging;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

use crate::{
    models::{
        responses::{IngestResponse, OtaResponse, StatusResponse},
        telemetry::DeviceStatus,
    },
    routes::{api, devices, ota, telemetry},
    services::{
        device_registry::DeviceRegistry, firmware_service::FirmwareStore,
        telemetry_service::TelemetryService,
    },
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use vibration::TelemetryPayload;

/// # API Documentation
///
/// `ApiDoc` generates the OpenAPI specification for the vibration telemetry
/// API: sample ingestion, recent-sample queries, device status and firmware
/// uploads.
#[derive(OpenApi)]
#[openapi(
    paths(
        api::root,
        telemetry::ingest,
        telemetry::latest,
        devices::list_devices,
        ota::ota_update
    ),
    components(
        schemas(TelemetryPayload, IngestResponse, OtaResponse, StatusResponse, DeviceStatus)
    ),
    tags(
        (name = "API", description = "Service status"),
        (name = "Telemetry", description = "Vibration telemetry ingestion and queries"),
        (name = "Devices", description = "Sensor nodes seen on the broker or over HTTP"),
        (name = "Firmware", description = "Over-the-air firmware images")
    )
)]
pub struct ApiDoc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub telemetry: Arc<TelemetryService>,
    pub devices: Arc<DeviceRegistry>,
    pub firmware: Arc<FirmwareStore>,
    /// Number of samples returned by `GET /telemetry` when `n` is absent.
    pub default_n: usize,
}

impl AppState {
    pub fn new(
        telemetry: Arc<TelemetryService>,
        devices: Arc<DeviceRegistry>,
        firmware: Arc<FirmwareStore>,
        default_n: usize,
    ) -> Self {
        Self {
            telemetry,
            devices,
            firmware,
            default_n,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let firmware_limit = state.firmware.max_bytes();

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::root))
        .route("/ingest", post(telemetry::ingest))
        .route("/telemetry", get(telemetry::latest))
        .route("/devices", get(devices::list_devices))
        .route(
            "/ota/update",
            post(ota::ota_update).layer(DefaultBodyLimit::max(firmware_limit)),
        )
        .with_state(state)
}
