use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use super::domain::{CrimeGradeRecord, LetterGrade};
use super::repository::InMemoryCrimeGradeStore;

/// Outcome of one batch import. Malformed rows are counted, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetImportError {
    #[error("failed to open dataset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),
}

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_record_id() -> String {
    let id = RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("cg-{id:06}")
}

/// Load the 13-column reference dataset into the store.
///
/// Rows that fail to parse are skipped with a warning so one bad line cannot
/// sink the batch.
pub fn import_reference_dataset<R: Read>(
    reader: R,
    store: &InMemoryCrimeGradeStore,
) -> Result<ImportSummary, DatasetImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut summary = ImportSummary {
        imported: 0,
        skipped: 0,
    };

    for (index, row) in csv_reader.deserialize::<DatasetRow>().enumerate() {
        match row {
            Ok(row) => {
                store.insert(row.into_record());
                summary.imported += 1;
            }
            Err(err) => {
                warn!(line = index + 2, %err, "skipping malformed dataset row");
                summary.skipped += 1;
            }
        }
    }

    info!(
        imported = summary.imported,
        skipped = summary.skipped,
        "reference dataset import finished"
    );
    Ok(summary)
}

/// Convenience wrapper for the startup/CLI path.
pub fn import_reference_dataset_from_path(
    path: &Path,
    store: &InMemoryCrimeGradeStore,
) -> Result<ImportSummary, DatasetImportError> {
    let file = File::open(path)?;
    import_reference_dataset(file, store)
}

#[derive(Debug, Deserialize)]
struct DatasetRow {
    zip_code: String,
    city: String,
    state: String,
    address_example: String,
    overall_grade: LetterGrade,
    violent_crime_grade: LetterGrade,
    property_crime_grade: LetterGrade,
    violent_crimes_per_1000: f64,
    property_crimes_per_1000: f64,
    total_crimes_per_1000: f64,
    cost_of_crime_per_household_usd: i64,
    confidence: f64,
    #[serde(rename = "retrievedAtUtc")]
    retrieved_at_utc: String,
}

impl DatasetRow {
    fn into_record(self) -> CrimeGradeRecord {
        CrimeGradeRecord {
            id: next_record_id(),
            zip_code: self.zip_code,
            city: self.city,
            state: self.state,
            address_example: self.address_example,
            overall_grade: self.overall_grade,
            violent_crime_grade: self.violent_crime_grade,
            property_crime_grade: self.property_crime_grade,
            violent_crimes_per_1000: self.violent_crimes_per_1000,
            property_crimes_per_1000: self.property_crimes_per_1000,
            total_crimes_per_1000: self.total_crimes_per_1000,
            cost_of_crime_per_household_usd: self.cost_of_crime_per_household_usd,
            confidence: self.confidence,
            retrieved_at_utc: self.retrieved_at_utc,
            created_at: Utc::now(),
        }
    }
}
