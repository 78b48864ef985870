use serde::Serialize;
use utoipa::ToSchema;

#[derive(ToSchema, Debug, Serialize)]
pub struct StatusResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

#[derive(ToSchema, Debug, Serialize)]
pub struct IngestResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// File the sample was persisted to.
    #[schema(example = "rest_1718000000000.json")]
    pub file: String,
}

#[derive(ToSchema, Debug, Serialize)]
pub struct OtaResponse {
    #[schema(example = "stored")]
    pub status: String,
    pub bytes: u64,
}
