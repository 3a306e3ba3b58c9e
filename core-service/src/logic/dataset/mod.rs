//! Dataset Module - labeled reference dataset (load-once)
//!
//! Reads the CSV of (fingerprint type, blood group) pairs the analytics
//! engine runs on. The parsed dataset is cached in an explicit
//! `ReferenceData` handle and never reloaded.

pub mod record;
pub mod loader;


use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;

pub use loader::{load_csv, read_csv};
pub use record::{Dataset, LabeledRecord};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Dataset IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid probability '{value}' in column {column} (row {row})")]
    InvalidProbability {
        row: usize,
        column: String,
        value: String,
    },
}

// ============================================================================
// REFERENCE DATA HANDLE
// ============================================================================

/// Thread-safe init-once access to the reference dataset.
///
/// A failed load is not cached: the next `get()` reads the file again.
pub struct ReferenceData {
    path: PathBuf,
    cell: OnceCell<Arc<Dataset>>,
}

impl ReferenceData {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    /// Handle over an already parsed dataset (tests, embedded data)
    pub fn preloaded(dataset: Dataset) -> Self {
        Self {
            path: PathBuf::new(),
            cell: OnceCell::with_value(Arc::new(dataset)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<Dataset>, DatasetError> {
        self.cell
            .get_or_try_init(|| {
                let dataset = load_csv(&self.path)?;
                log::info!(
                    "Reference dataset loaded: {} records, {} skipped ({})",
                    dataset.records.len(),
                    dataset.skipped_rows,
                    self.path.display()
                );
                Ok::<_, DatasetError>(Arc::new(dataset))
            })
            .cloned()
    }
}
