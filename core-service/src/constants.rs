//! Central Configuration Constants
//!
//! Single source of truth for labels, input sizes and ensemble defaults.
//! Deployment-specific values (paths, ports) are read by the API server.

/// Fingerprint pattern labels, in model output order
pub const PATTERN_TYPES: [&str; 3] = ["class1_arc", "class2_whorl", "class3_loop"];

/// Blood group labels, in model output order
pub const BLOOD_TYPES: [&str; 8] = ["A+", "A-", "AB+", "AB-", "B+", "B-", "O+", "O-"];

/// Fingerprint input size (height, width)
pub const FINGERPRINT_INPUT: (u32, u32) = (224, 224);

/// Blood group input size (height, width)
pub const BLOOD_INPUT: (u32, u32) = (256, 256);

// ============================================
// Adapter names
// ============================================

pub const EFFICIENTNET: &str = "efficientnet";
pub const INCEPTION: &str = "inception";
pub const BLOOD: &str = "blood";

/// Strategy reported when more than one model contributed
pub const WEIGHTED_ENSEMBLE: &str = "weighted_ensemble";

/// Default ensemble weights (renormalized over the models that answered)
pub const DEFAULT_EFFICIENTNET_WEIGHT: f32 = 0.55;
pub const DEFAULT_INCEPTION_WEIGHT: f32 = 0.45;

// ============================================
// Model input slots & files
// ============================================

pub const DEFAULT_EFFICIENTNET_INPUT: &str = "input_layer_2";
pub const DEFAULT_INCEPTION_INPUT: &str = "input_layer_3";
pub const DEFAULT_BLOOD_INPUT: &str = "input_layer";

pub const DEFAULT_EFFICIENTNET_FILE: &str = "efficientnet.onnx";
pub const DEFAULT_INCEPTION_FILE: &str = "inceptionv3.onnx";
pub const DEFAULT_BLOOD_FILE: &str = "blood_group_detection.onnx";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
