use crate::{
    AppState,
    error::ApiError,
    models::responses::{OtaResponse, StatusResponse},
};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use log::info;

/// Upload a firmware image for over-the-air updates.
///
/// Expects a multipart form with the image in the `file` field. The stored
/// image replaces the previous one.
#[utoipa::path(
    post,
    path = "/ota/update",
    request_body(content_type = "multipart/form-data", description = "Firmware image in the `file` field"),
    responses(
        (status = 200, description = "Image stored", body = OtaResponse),
        (status = 400, description = "Missing `file` field", body = StatusResponse),
        (status = 413, description = "Image too large", body = StatusResponse),
        (status = 500, description = "Image could not be written", body = StatusResponse)
    ),
    tag = "Firmware"
)]
pub async fn ota_update(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OtaResponse>, ApiError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("<unnamed>").to_string();
        let image = field.bytes().await?;
        info!("Received firmware upload {} ({} bytes)", file_name, image.len());

        let bytes = state.firmware.store(&image).await?;
        return Ok(Json(OtaResponse {
            status: "stored".to_string(),
            bytes,
        }));
    }

    Err(ApiError::BadRequest(
        "multipart field `file` is missing".to_string(),
    ))
}
