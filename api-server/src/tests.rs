use std::fs;
use std::io::Cursor;
use std::path::Path;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use image::{ImageFormat, RgbImage};
use ndarray::Array4;
use serde_json::Value;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

use dactylo_core::logic::model::{AdapterSpec, InferenceEngine, InferenceError, ModelProvider, OutputSlot};

use super::*;

// ============================================================================
// FIXTURES
// ============================================================================

/// Answers one-hot at index 1 (`class2_whorl` / `A-`)
struct FixedEngine(usize);

impl InferenceEngine for FixedEngine {
    fn run(&self, _: &str, _: &OutputSlot, _: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let mut answer = vec![0.0; self.0];
        answer[1] = 1.0;
        Ok(answer)
    }
}

struct FakeProvider {
    loaded: bool,
}

impl ModelProvider for FakeProvider {
    fn open(&self, spec: &AdapterSpec) -> Result<Box<dyn InferenceEngine>, InferenceError> {
        if !self.loaded {
            return Err(InferenceError::ModelNotFound(spec.model_path.display().to_string()));
        }
        let classes = if spec.name == "blood" { 8 } else { 3 };
        Ok(Box::new(FixedEngine(classes)))
    }
}

const SCENARIO_CSV: &str = "fingerprint_type,blood_group\n";

fn scenario_csv() -> String {
    let mut csv = SCENARIO_CSV.to_string();
    for (pattern, blood, n) in [
        ("class1_arc", "A+", 10),
        ("class2_whorl", "A+", 5),
        ("class2_whorl", "O-", 5),
        ("class3_loop", "O-", 10),
    ] {
        for _ in 0..n {
            csv.push_str(&format!("{},{}\n", pattern, blood));
        }
    }
    csv
}

struct TestApp {
    router: Router,
    dir: TempDir,
}

/// `dataset`: CSV content written to the dataset path, `None` leaves it missing
fn app(models_loaded: bool, dataset: Option<&str>, extra: &[(&str, &str)]) -> TestApp {
    let dir = tempdir().unwrap();
    let dataset_path = dir.path().join("dataset.csv");
    if let Some(content) = dataset {
        fs::write(&dataset_path, content).unwrap();
    }

    let mut vars: Vec<(String, String)> = vec![
        ("DATASET_PATH".to_string(), dataset_path.display().to_string()),
        ("STATIC_DIR".to_string(), dir.path().join("static").display().to_string()),
    ];
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    let config = config::Config::from_lookup(|key| {
        vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    });

    let state = build_state(config, &FakeProvider { loaded: models_loaded }).unwrap();
    TestApp {
        router: create_router(state),
        dir,
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| image::Rgb([(x * 5) as u8, (y * 9) as u8, 77]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn multipart(uri: &str, field: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "dactyloTestBoundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"scan.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// ============================================================================
// HEALTH
// ============================================================================

#[tokio::test]
async fn test_health_reports_models() {
    let app = app(true, None, &[]);
    let (status, json) = send(&app.router, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["models_loaded"]["efficientnet"], true);
    assert_eq!(json["models_loaded"]["inception"], true);
    assert_eq!(json["models_loaded"]["blood"], true);
    assert_eq!(json["dataset_loaded"], false);
    assert_eq!(json["engines"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_root_is_health_without_models() {
    let app = app(false, None, &[]);
    let (status, json) = send(&app.router, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["models_loaded"]["blood"], false);
}

// ============================================================================
// PREDICT
// ============================================================================

#[tokio::test]
async fn test_fingerprint_prediction() {
    let app = app(true, None, &[]);
    let (status, json) = send(&app.router, multipart("/predict/fingerprint", "file", &png(300, 260))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pattern"], "class2_whorl");
    assert_eq!(json["class"], 1);
    assert_eq!(json["model_used"], "weighted_ensemble");
    assert_eq!(json["confidence"].as_f64(), Some(1.0));
    assert_eq!(json["probabilities"].as_object().map(|m| m.len()), Some(3));
    assert_eq!(json["per_model_confidence"]["inception"].as_f64(), Some(1.0));
}

#[tokio::test]
async fn test_blood_prediction_and_alias() {
    let app = app(true, None, &[]);

    for uri in ["/predict/blood", "/predict/bloodtype"] {
        let (status, json) = send(&app.router, multipart(uri, "file", &png(64, 64))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["blood_type"], "A-");
        assert_eq!(json["probabilities"].as_object().map(|m| m.len()), Some(8));
    }
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = app(true, None, &[]);
    let (status, json) = send(&app.router, multipart("/predict/fingerprint", "image", &png(8, 8))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap_or("").contains("file"));
}

#[tokio::test]
async fn test_no_models_is_unavailable() {
    let app = app(false, None, &[]);
    let (status, json) = send(&app.router, multipart("/predict/fingerprint", "file", &png(8, 8))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "No fingerprint models available");

    let (status, _) = send(&app.router, multipart("/predict/blood", "file", &png(8, 8))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_undecodable_upload_is_processing_failure() {
    let app = app(true, None, &[]);
    let (status, json) = send(&app.router, multipart("/predict/fingerprint", "file", b"definitely not an image")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap_or("").contains("decode"));
}

#[tokio::test]
async fn test_oversized_upload() {
    let app = app(true, None, &[("MAX_UPLOAD_BYTES", "1024")]);
    let (status, _) = send(&app.router, multipart("/predict/fingerprint", "file", &vec![7u8; 8192])).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

// ============================================================================
// ANALYTICS
// ============================================================================

#[tokio::test]
async fn test_analytics_tables_and_plots() {
    let csv = scenario_csv();
    let app = app(true, Some(&csv), &[]);
    let (status, json) = send(&app.router, get("/analytics")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tables"]["chi_square"]["dof"], 2);
    assert_eq!(json["tables"]["frequency"]["A+"]["class1_arc"], 10);
    assert_eq!(json["tables"]["expected"]["A+"]["class1_arc"].as_f64(), Some(5.0));
    assert!(json["tables"]["log_odds"]["O-"]["class1_arc"].is_null());
    assert_eq!(json["plots"]["heatmap"], "static/analytics/heatmap.png");
    assert!(json["plots"]["probability_distribution"].is_null());

    assert!(app.dir.path().join("static/analytics/heatmap.png").exists());

    let response = app.router.clone().oneshot(get("/static/analytics/heatmap.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_analytics_without_dataset() {
    let app = app(true, None, &[]);
    let (status, json) = send(&app.router, get("/analytics")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], 503);
}

#[tokio::test]
async fn test_analytics_with_empty_dataset() {
    let app = app(true, Some(SCENARIO_CSV), &[]);
    let (status, _) = send(&app.router, get("/analytics")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_dataset_created_after_startup_is_picked_up() {
    let app = app(true, None, &[]);
    assert_eq!(send(&app.router, get("/analytics")).await.0, StatusCode::SERVICE_UNAVAILABLE);

    fs::write(app.dir.path().join("dataset.csv"), scenario_csv()).unwrap();
    assert_eq!(send(&app.router, get("/analytics")).await.0, StatusCode::OK);
}

#[test]
fn test_build_state_rejects_bad_weights() {
    let dir = tempdir().unwrap();
    let static_dir = dir.path().join("static");
    let config = config::Config::from_lookup(|key| match key {
        "ENSEMBLE_WEIGHT_EFFICIENTNET" => Some("nan".to_string()),
        "STATIC_DIR" => Some(static_dir.display().to_string()),
        _ => None,
    });

    assert!(build_state(config, &FakeProvider { loaded: true }).is_err());
    assert!(!Path::new(&static_dir).exists());
}
