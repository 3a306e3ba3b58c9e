//! Engine status & latency counters (per adapter)

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lock-free counters updated on every predict call
#[derive(Debug, Default)]
pub struct InferenceStats {
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
    failure_count: AtomicU64,
}

impl InferenceStats {
    pub fn record(&self, elapsed: Duration, ok: bool) {
        self.latency_sum_us.fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn inference_count(&self) -> u64 {
        self.inference_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn avg_latency_ms(&self) -> f32 {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count();
        if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 }
    }
}

/// Engine Status for the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub name: String,
    pub model_loaded: bool,
    pub model_path: String,
    pub checksum: Option<String>,
    pub inference_device: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
    pub failure_count: u64,
}
