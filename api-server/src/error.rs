//! Error handling

use axum::{
    extract::multipart::MultipartError,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use dactylo_core::logic::analytics::AnalyticsError;
use dactylo_core::logic::classify::ClassifyError;
use dactylo_core::logic::dataset::DatasetError;
use dactylo_core::Cancelled;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Request errors
    BadRequest(String),
    PayloadTooLarge(String),

    // Analytics errors
    InsufficientData(String),

    // Availability errors
    ServiceUnavailable(String),
    Timeout,

    // Inference / processing errors (message is shown to the client)
    ProcessingFailed(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.as_str()),
            AppError::InsufficientData(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str()),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.as_str())
            }
            AppError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "Request timed out"),
            AppError::ProcessingFailed(msg) => {
                tracing::error!("Processing failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ClassifyError> for AppError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::NoModelLoaded(_) => AppError::ServiceUnavailable(err.to_string()),
            ClassifyError::Cancelled(_) => AppError::Timeout,
            other => AppError::ProcessingFailed(other.to_string()),
        }
    }
}

impl From<DatasetError> for AppError {
    fn from(err: DatasetError) -> Self {
        AppError::ServiceUnavailable(format!("Reference dataset unavailable: {}", err))
    }
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        AppError::InsufficientData(err.to_string())
    }
}

impl From<Cancelled> for AppError {
    fn from(_: Cancelled) -> Self {
        AppError::Timeout
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(err.body_text()),
            _ => AppError::BadRequest(format!("Invalid upload: {}", err.body_text())),
        }
    }
}
