//! Prediction handlers (multipart upload, field `file`)

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::Instrument;
use uuid::Uuid;

use dactylo_core::logic::classify::{BloodPrediction, FingerprintPrediction};

use super::{read_file_field, run_blocking};
use crate::{AppError, AppResult, AppState};

/// POST /predict/fingerprint
pub async fn fingerprint(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<FingerprintPrediction>> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("predict", kind = "fingerprint", %request_id);

    async move {
        let bytes = read_file_field(multipart).await?;
        tracing::info!("Received image ({} bytes)", bytes.len());

        let classifiers = state.classifiers.clone();
        let prediction = run_blocking(state.config.request_timeout, move |cancel| {
            classifiers.fingerprint.classify(&bytes, cancel)
        })
        .await?;

        tracing::info!(
            "Prediction: {} ({:.4}, {})",
            prediction.pattern,
            prediction.confidence,
            prediction.model_used
        );
        Ok::<_, AppError>(Json(prediction))
    }
    .instrument(span)
    .await
}

/// POST /predict/blood (alias /predict/bloodtype)
pub async fn blood(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<BloodPrediction>> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("predict", kind = "blood", %request_id);

    async move {
        let bytes = read_file_field(multipart).await?;
        tracing::info!("Received image ({} bytes)", bytes.len());

        let classifiers = state.classifiers.clone();
        let prediction = run_blocking(state.config.request_timeout, move |cancel| {
            classifiers.blood.classify(&bytes, cancel)
        })
        .await?;

        tracing::info!("Prediction: {} ({:.4})", prediction.blood_type, prediction.confidence);
        Ok::<_, AppError>(Json(prediction))
    }
    .instrument(span)
    .await
}
