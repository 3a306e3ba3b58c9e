//! Model Module - classifier adapters over an inference engine
//!
//! Tách logic inference khỏi pipeline: mỗi adapter giữ tên input slot,
//! cách chọn output và bước preprocessing riêng của model.

pub mod engine;
pub mod onnx;
pub mod adapter;
pub mod preprocess;
pub mod probability;
pub mod status;

// Re-export common types
pub use engine::{InferenceEngine, InferenceError, ModelMetadata, ModelProvider, OutputSlot};
pub use onnx::{OnnxEngine, OnnxProvider};
pub use adapter::{AdapterSpec, ClassifierAdapter, ModelAdapter};
pub use preprocess::Preprocessing;
pub use probability::ProbabilityVector;
pub use status::{EngineStatus, InferenceStats};
