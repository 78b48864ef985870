use crate::{
    models::responses::StatusResponse,
    repository::StorageError,
    services::telemetry_service::ServiceError,
};
use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use thiserror::Error;
use vibration::SampleError;

/// Errors returned by HTTP handlers, rendered as
/// `{"status": "error", "message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be extracted (bad JSON, query or multipart body).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("{0}")]
    Validation(#[from] SampleError),

    #[error("{0}")]
    BadRequest(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected { status, .. } => *status,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(e) => ApiError::Validation(e),
            ServiceError::Storage(e) => ApiError::Storage(e),
            ServiceError::Decode(e) => ApiError::BadRequest(e.to_string()),
            ServiceError::Encode(e) => ApiError::Internal(e.to_string()),
        }
    }
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    ApiError::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

impl_from_rejection!(JsonRejection, QueryRejection, MultipartRejection, MultipartError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, Json(StatusResponse::error(self.to_string()))).into_response()
    }
}
