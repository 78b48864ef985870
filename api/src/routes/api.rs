use crate::models::responses::StatusResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", body = StatusResponse)
    ),
    tag = "API"
)]
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse::ok("Vibration telemetry API is running"))
}
