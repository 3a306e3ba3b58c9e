//! Logic Module - Business Logic & Engines
//!
//! ## Inference
//! - `imaging/` - raw bytes → canonical image tensor
//! - `model/` - classifier adapters over ONNX Runtime
//! - `ensemble/` - weighted fusion of probability vectors
//! - `classify/` - fingerprint & blood pipelines
//!
//! ## Analytics
//! - `dataset/` - reference dataset loading (load-once)
//! - `analytics/` - contingency, chi-square, residuals, log-odds, correlation
//! - `report/` - named tables + rendered plots

pub mod cancel;

// Inference
pub mod imaging;
pub mod model;
pub mod ensemble;
pub mod classify;

// Analytics
pub mod dataset;
pub mod analytics;
pub mod report;
