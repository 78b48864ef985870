use crate::{AppState, models::telemetry::DeviceStatus};
use axum::{Json, extract::State};

/// Known sensor nodes and when they were last heard from
#[utoipa::path(
    get,
    path = "/devices",
    responses(
        (status = 200, description = "Known devices ordered by id", body = Vec<DeviceStatus>)
    ),
    tag = "Devices"
)]
pub async fn list_devices(State(state): State<AppState>) -> Json<Vec<DeviceStatus>> {
    Json(state.devices.list())
}
