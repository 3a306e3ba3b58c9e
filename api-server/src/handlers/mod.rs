//! HTTP handlers

pub mod health;
pub mod predict;
pub mod analytics;

use std::time::Duration;

use axum::extract::Multipart;
use dactylo_core::CancelToken;

use crate::{AppError, AppResult};

/// Run CPU-bound work on the blocking pool under `timeout`.
///
/// The worker gets a token that trips at the deadline, and is cancelled
/// explicitly once the caller stops waiting.
pub async fn run_blocking<T, E, F>(timeout: Duration, f: F) -> AppResult<T>
where
    F: FnOnce(&CancelToken) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    let cancel = CancelToken::with_deadline(timeout);
    let worker = cancel.clone();
    let task = tokio::task::spawn_blocking(move || f(&worker));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result.map_err(Into::into),
        Ok(Err(join_err)) => Err(AppError::InternalError(format!("Worker task failed: {}", join_err))),
        Err(_) => {
            cancel.cancel();
            tracing::warn!("Request exceeded {:?}, cancelling", timeout);
            Err(AppError::Timeout)
        }
    }
}

/// Bytes of the `file` field
pub async fn read_file_field(mut multipart: Multipart) -> AppResult<Vec<u8>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let bytes = field.bytes().await?;
            if bytes.is_empty() {
                return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
            }
            return Ok(bytes.to_vec());
        }
    }

    Err(AppError::BadRequest("Missing 'file' field".to_string()))
}
