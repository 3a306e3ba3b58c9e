//! Analytics handler

use axum::{extract::State, Json};

use dactylo_core::logic::analytics::analyze;
use dactylo_core::logic::report::{assemble, AnalyticsPayload};

use super::run_blocking;
use crate::{AppError, AppResult, AppState};

/// GET /analytics
pub async fn run(State(state): State<AppState>) -> AppResult<Json<AnalyticsPayload>> {
    let reference = state.reference.clone();
    let renderer = state.renderer.clone();
    let options = state.config.analysis_options();

    let payload = run_blocking(state.config.request_timeout, move |cancel| {
        let dataset = reference.get()?;
        cancel.check()?;

        let report = analyze(&dataset.records, &options)?;
        let payload = assemble(&report, renderer.as_ref(), cancel)?;
        Ok::<_, AppError>(payload)
    })
    .await?;

    let rendered = payload.plots.values().filter(|p| p.is_some()).count();
    tracing::info!(
        "Analytics ready: chi2={:.4}, p={:.4e}, dof={}, {} plots",
        payload.tables.chi_square.chi2,
        payload.tables.chi_square.p,
        payload.tables.chi_square.dof,
        rendered
    );

    Ok(Json(payload))
}
