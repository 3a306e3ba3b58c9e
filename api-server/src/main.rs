//! DactyloAI Backend API Server
//!
//! Fingerprint pattern / blood group inference and dataset analytics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      DACTYLO API                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────────┐  ┌──────────────────┐  │
//! │  │  Axum     │  │  ClassifierSet   │  │  ReferenceData   │  │
//! │  │  Router   │─▶│  (ONNX Runtime)  │  │  + PngRenderer   │  │
//! │  └─────┬─────┘  └──────────────────┘  └────────┬─────────┘  │
//! │        │         spawn_blocking + timeout      │            │
//! │        └───────────────────────────────────────┘            │
//! │                       ▼                                     │
//! │                ┌─────────────┐                              │
//! │                │  /static    │  rendered analytics plots    │
//! │                └─────────────┘                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod error;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
    services::ServeDir,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dactylo_core::logic::classify::ClassifierSet;
use dactylo_core::logic::dataset::ReferenceData;
use dactylo_core::logic::model::{ModelProvider, OnnxProvider};
use dactylo_core::logic::report::{PngRenderer, Renderer};

pub use error::{AppError, AppResult};

/// URL prefix of rendered plots (served from `<static_dir>/analytics`)
const ANALYTICS_PREFIX: &str = "static/analytics";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize logging (also forwards the core's `log` records)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "dactylo_api=debug,dactylo_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();

    tracing::info!("DactyloAI API starting... ({})", config.environment);
    tracing::info!("Models: {}", config.models_dir.display());
    tracing::info!("Dataset: {}", config.dataset_path.display());

    // Model loading and the first dataset read are blocking
    let state = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || build_state(config, &OnnxProvider))
            .await
            .context("startup task failed")??
    };

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub classifiers: Arc<ClassifierSet>,
    pub reference: Arc<ReferenceData>,
    pub renderer: Arc<dyn Renderer>,
    pub config: config::Config,
}

/// Load models and try the reference dataset once.
///
/// Missing models and a missing dataset are not fatal: the affected
/// endpoints answer 503 until fixed.
fn build_state(config: config::Config, provider: &dyn ModelProvider) -> anyhow::Result<AppState> {
    let classifiers = ClassifierSet::load(
        config.fingerprint_specs(),
        config.blood_spec(),
        config.ensemble_weights()?,
        provider,
    )?;

    for (name, loaded) in classifiers.models_loaded() {
        tracing::info!("Model {}: {}", name, if loaded { "loaded" } else { "unavailable" });
    }

    let reference = ReferenceData::new(&config.dataset_path);
    if let Err(e) = reference.get() {
        tracing::warn!("Reference dataset not loaded yet: {}", e);
    }

    let renderer = PngRenderer::new(config.analytics_dir(), ANALYTICS_PREFIX);

    Ok(AppState {
        classifiers: Arc::new(classifiers),
        reference: Arc::new(reference),
        renderer: Arc::new(renderer),
        config,
    })
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let max_upload = state.config.max_upload_bytes;

    Router::new()
        // Health
        .route("/", get(handlers::health::check))
        .route("/health", get(handlers::health::check))

        // Inference
        .route("/predict/fingerprint", post(handlers::predict::fingerprint))
        .route("/predict/blood", post(handlers::predict::blood))
        .route("/predict/bloodtype", post(handlers::predict::blood))

        // Analytics
        .route("/analytics", get(handlers::analytics::run))
        .nest_service("/static", ServeDir::new(static_dir))

        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
