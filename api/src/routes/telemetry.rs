use crate::{
    AppState,
    error::ApiError,
    models::{
        requests::LatestTelemetryQuery,
        responses::{IngestResponse, StatusResponse},
    },
};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use chrono::Utc;
use vibration::{TelemetryPayload, TelemetrySample};

/// Ingest one telemetry sample.
///
/// The sample is written to the data directory before it is acknowledged.
#[utoipa::path(
    post,
    path = "/ingest",
    request_body = TelemetryPayload,
    responses(
        (status = 200, description = "Sample stored", body = IngestResponse),
        (status = 400, description = "Malformed JSON", body = StatusResponse),
        (status = 422, description = "Invalid telemetry", body = StatusResponse),
        (status = 500, description = "Sample could not be persisted", body = StatusResponse)
    ),
    tag = "Telemetry"
)]
pub async fn ingest(
    State(state): State<AppState>,
    payload: Result<Json<TelemetryPayload>, JsonRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    let Json(payload) = payload?;
    let device_id = payload.device_id.clone();
    let path = state.telemetry.ingest_payload(payload).await?;
    state.devices.touch(&device_id, Utc::now());

    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Json(IngestResponse {
        status: "ok".to_string(),
        file,
    }))
}

/// Latest telemetry samples, most recent first
#[utoipa::path(
    get,
    path = "/telemetry",
    params(LatestTelemetryQuery),
    responses(
        (status = 200, description = "Up to `n` samples, most recent first", body = Vec<TelemetryPayload>),
        (status = 400, description = "Bad Request", body = StatusResponse)
    ),
    tag = "Telemetry"
)]
pub async fn latest(
    State(state): State<AppState>,
    query: Result<Query<LatestTelemetryQuery>, QueryRejection>,
) -> Result<Json<Vec<TelemetrySample>>, ApiError> {
    let Query(query) = query?;
    let n = query.n.unwrap_or(state.default_n);

    Ok(Json(state.telemetry.latest(n)))
}
