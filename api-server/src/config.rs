//! Configuration module

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dactylo_core::constants;
use dactylo_core::logic::analytics::AnalysisOptions;
use dactylo_core::logic::ensemble::{EnsembleError, EnsembleWeights};
use dactylo_core::logic::model::{AdapterSpec, OutputSlot};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Model files
    pub models_dir: PathBuf,
    pub efficientnet_model: PathBuf,
    pub inception_model: PathBuf,
    pub blood_model: PathBuf,

    /// Model input slot names
    pub efficientnet_input: String,
    pub inception_input: String,
    pub blood_input: String,

    /// Model output slot names; unset reads the first output
    pub efficientnet_output: Option<String>,
    pub inception_output: Option<String>,
    pub blood_output: Option<String>,

    /// Fingerprint ensemble weights
    pub weight_efficientnet: f32,
    pub weight_inception: f32,

    /// Reference dataset (CSV)
    pub dataset_path: PathBuf,

    /// Served under `/static`; plots go to `<static_dir>/analytics`
    pub static_dir: PathBuf,

    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    pub yates_correction: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let models_dir = PathBuf::from(string("MODELS_DIR", "models"));
        let model = |key: &str, file: &str| lookup(key).map(PathBuf::from).unwrap_or_else(|| models_dir.join(file));

        Self {
            port: parse_var(&lookup, "PORT").unwrap_or(8000),

            environment: string("ENVIRONMENT", "development"),

            efficientnet_model: model("EFFICIENTNET_MODEL", constants::DEFAULT_EFFICIENTNET_FILE),
            inception_model: model("INCEPTION_MODEL", constants::DEFAULT_INCEPTION_FILE),
            blood_model: model("BLOOD_MODEL", constants::DEFAULT_BLOOD_FILE),

            efficientnet_input: string("EFFICIENTNET_INPUT", constants::DEFAULT_EFFICIENTNET_INPUT),
            inception_input: string("INCEPTION_INPUT", constants::DEFAULT_INCEPTION_INPUT),
            blood_input: string("BLOOD_INPUT", constants::DEFAULT_BLOOD_INPUT),

            efficientnet_output: lookup("EFFICIENTNET_OUTPUT"),
            inception_output: lookup("INCEPTION_OUTPUT"),
            blood_output: lookup("BLOOD_OUTPUT"),

            weight_efficientnet: parse_var(&lookup, "ENSEMBLE_WEIGHT_EFFICIENTNET").unwrap_or(constants::DEFAULT_EFFICIENTNET_WEIGHT),
            weight_inception: parse_var(&lookup, "ENSEMBLE_WEIGHT_INCEPTION").unwrap_or(constants::DEFAULT_INCEPTION_WEIGHT),

            dataset_path: PathBuf::from(string("DATASET_PATH", "blood_fingerprint_FULL.csv")),
            static_dir: PathBuf::from(string("STATIC_DIR", "static")),

            request_timeout: Duration::from_secs(parse_var(&lookup, "REQUEST_TIMEOUT_SECS").unwrap_or(60)),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES").unwrap_or(20 * 1024 * 1024),
            yates_correction: lookup("YATES_CORRECTION")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false),

            models_dir,
        }
    }

    pub fn fingerprint_specs(&self) -> Vec<AdapterSpec> {
        let mut efficientnet = AdapterSpec::efficientnet(&self.models_dir).with_output(output_slot(&self.efficientnet_output));
        efficientnet.model_path = self.efficientnet_model.clone();
        efficientnet.input_slot = self.efficientnet_input.clone();

        let mut inception = AdapterSpec::inception(&self.models_dir).with_output(output_slot(&self.inception_output));
        inception.model_path = self.inception_model.clone();
        inception.input_slot = self.inception_input.clone();

        vec![efficientnet, inception]
    }

    pub fn blood_spec(&self) -> AdapterSpec {
        let mut blood = AdapterSpec::blood(&self.models_dir).with_output(output_slot(&self.blood_output));
        blood.model_path = self.blood_model.clone();
        blood.input_slot = self.blood_input.clone();
        blood
    }

    pub fn ensemble_weights(&self) -> Result<EnsembleWeights, EnsembleError> {
        EnsembleWeights::new([
            (constants::EFFICIENTNET, self.weight_efficientnet),
            (constants::INCEPTION, self.weight_inception),
        ])
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            yates_correction: self.yates_correction,
            ..AnalysisOptions::default()
        }
    }

    pub fn analytics_dir(&self) -> PathBuf {
        self.static_dir.join("analytics")
    }
}

fn output_slot(name: &Option<String>) -> OutputSlot {
    match name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => OutputSlot::Named(name.to_string()),
        _ => OutputSlot::First,
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
