//! Health check handler

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;

use dactylo_core::logic::model::EngineStatus;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    models_loaded: BTreeMap<String, bool>,
    dataset_loaded: bool,
    engines: Vec<EngineStatus>,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let models_loaded = state.classifiers.models_loaded();
    let status = if models_loaded.values().any(|&loaded| loaded) {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        models_loaded,
        dataset_loaded: state.reference.is_loaded(),
        engines: state.classifiers.engine_statuses(),
    })
}
