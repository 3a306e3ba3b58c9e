//! CSV loader with case-insensitive header aliases

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::record::{Dataset, LabeledRecord};
use super::DatasetError;

pub const FINGERPRINT_COLUMN: &str = "fingerprint_type";
pub const BLOOD_COLUMN: &str = "blood_group";
pub const PROBABILITY_PREFIX: &str = "prob_";

const FINGERPRINT_ALIASES: &[&str] = &["fingerprint_type", "fingerprinttype", "fingerprint", "pattern"];
const BLOOD_ALIASES: &[&str] = &["blood_type", "bloodgroup", "blood_group", "bloodtype"];
const FILE_PATH_ALIASES: &[&str] = &["file_path", "filepath"];
const FILE_NAME_ALIASES: &[&str] = &["filename", "file_name"];

/// Column positions resolved from the header row
#[derive(Debug, Default)]
struct Columns {
    fingerprint: Option<usize>,
    blood: Option<usize>,
    file_path: Option<usize>,
    file_name: Option<usize>,
    /// (index, class name)
    probabilities: Vec<(usize, String)>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Self {
        let mut columns = Columns::default();

        for (idx, raw) in headers.iter().enumerate() {
            let header = raw.trim();
            let key = header.to_lowercase();

            // First matching column wins
            if FINGERPRINT_ALIASES.contains(&key.as_str()) {
                columns.fingerprint.get_or_insert(idx);
            } else if BLOOD_ALIASES.contains(&key.as_str()) {
                columns.blood.get_or_insert(idx);
            } else if FILE_PATH_ALIASES.contains(&key.as_str()) {
                columns.file_path.get_or_insert(idx);
            } else if FILE_NAME_ALIASES.contains(&key.as_str()) {
                columns.file_name.get_or_insert(idx);
            } else if key.starts_with(PROBABILITY_PREFIX) && key.len() > PROBABILITY_PREFIX.len() {
                columns.probabilities.push((idx, header[PROBABILITY_PREFIX.len()..].to_string()));
            }
        }

        columns
    }

    fn required(&self) -> Result<(usize, usize), DatasetError> {
        match (self.fingerprint, self.blood) {
            (Some(fp), Some(bg)) => Ok((fp, bg)),
            (fp, bg) => {
                let mut missing = Vec::new();
                if fp.is_none() {
                    missing.push(FINGERPRINT_COLUMN.to_string());
                }
                if bg.is_none() {
                    missing.push(BLOOD_COLUMN.to_string());
                }
                Err(DatasetError::MissingColumns(missing))
            }
        }
    }
}

/// Load the reference dataset from a CSV file
pub fn load_csv(path: &Path) -> Result<Dataset, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::NotFound(path.display().to_string()));
    }

    log::info!("Loading reference dataset from {}", path.display());
    read_csv(File::open(path)?)
}

/// Parse CSV from any reader
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::resolve(reader.headers()?);
    let (fp_idx, bg_idx) = columns.required()?;

    let mut dataset = Dataset {
        probability_columns: columns.probabilities.iter().map(|(_, name)| name.clone()).collect(),
        ..Dataset::default()
    };

    for (i, row) in reader.records().enumerate() {
        let row = row?;
        // header is line 1
        let line = i + 2;

        let fingerprint = row.get(fp_idx).unwrap_or("");
        let blood = row.get(bg_idx).unwrap_or("");
        if fingerprint.is_empty() || blood.is_empty() {
            log::warn!("Skipping dataset row {}: blank fingerprint or blood value", line);
            dataset.skipped_rows += 1;
            continue;
        }

        let mut probabilities = BTreeMap::new();
        for (idx, class) in &columns.probabilities {
            let value = row.get(*idx).unwrap_or("");
            if value.is_empty() {
                continue;
            }
            let parsed: f64 = value.parse().map_err(|_| DatasetError::InvalidProbability {
                row: line,
                column: format!("{}{}", PROBABILITY_PREFIX, class),
                value: value.to_string(),
            })?;
            probabilities.insert(class.clone(), parsed);
        }

        dataset.records.push(LabeledRecord {
            fingerprint_type: fingerprint.to_string(),
            blood_group: blood.to_string(),
            file_path: optional(&row, columns.file_path),
            file_name: optional(&row, columns.file_name),
            probabilities,
        });
    }

    if dataset.skipped_rows > 0 {
        log::warn!("{} dataset rows skipped", dataset.skipped_rows);
    }

    Ok(dataset)
}

fn optional(row: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
