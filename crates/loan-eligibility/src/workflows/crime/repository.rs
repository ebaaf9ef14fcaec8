use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::error;

use super::domain::{CrimeGradeRecord, CrimeGradeResult, EvidenceItem, GradeComponents, LetterGrade};
use super::postal::extract_postal_code;
use super::{CrimeGrader, GraderError};

/// Source label stamped on evidence drawn from the reference dataset.
pub const DATASET_SOURCE: &str = "CrimeGrade Database";

/// Read-only lookup over the pre-seeded crime statistics.
pub trait CrimeGradeStore: Send + Sync {
    /// All records for a postal code, ordered by confidence descending.
    /// Ties keep storage order.
    fn find_by_zip(&self, zip_code: &str) -> Result<Vec<CrimeGradeRecord>, StoreError>;
}

/// Error enumeration for reference-store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("crime grade store unavailable: {0}")]
    Unavailable(String),
}

/// In-memory store backing the reference dataset after the offline import.
#[derive(Default, Clone)]
pub struct InMemoryCrimeGradeStore {
    records: Arc<Mutex<Vec<CrimeGradeRecord>>>,
}

impl InMemoryCrimeGradeStore {
    pub fn insert(&self, record: CrimeGradeRecord) {
        let mut guard = self.records.lock().expect("crime store mutex poisoned");
        guard.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("crime store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CrimeGradeStore for InMemoryCrimeGradeStore {
    fn find_by_zip(&self, zip_code: &str) -> Result<Vec<CrimeGradeRecord>, StoreError> {
        let guard = self.records.lock().expect("crime store mutex poisoned");
        let mut matches: Vec<_> = guard
            .iter()
            .filter(|record| record.zip_code == zip_code)
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(matches)
    }
}

/// Resolves a grade for an address purely from the reference dataset.
///
/// Never fails to its caller: every error path degrades into a default "F"
/// result with the reason in `notes`.
pub struct DatasetGrader<S> {
    store: Arc<S>,
}

impl<S: CrimeGradeStore> DatasetGrader<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn resolve_by_address(&self, address: &str) -> CrimeGradeResult {
        let Some(zip) = extract_postal_code(address) else {
            return default_result(address, None, "Unable to extract zip code from address");
        };

        let records = match self.store.find_by_zip(&zip) {
            Ok(records) => records,
            Err(err) => {
                error!(%zip, %err, "crime grade lookup failed");
                return default_result(address, Some(zip), &err.to_string());
            }
        };

        let Some(best) = records.first() else {
            return default_result(address, Some(zip), "No crime data found for this zip code");
        };

        CrimeGradeResult {
            address: address.to_string(),
            zip: Some(zip.clone()),
            overall_grade: best.overall_grade,
            components: Some(GradeComponents {
                violent_crime: Some(best.violent_crime_grade),
                property_crime: Some(best.property_crime_grade),
            }),
            notes: Some(format!(
                "Crime data for {}, {} (Zip: {}). Confidence: {:.1}%",
                best.city,
                best.state,
                zip,
                best.confidence * 100.0
            )),
            evidence: Some(vec![EvidenceItem {
                source: Some(DATASET_SOURCE.to_string()),
                snippet: format!(
                    "Violent crimes: {:.1} per 1,000 residents. Property crimes: {:.1} per 1,000 residents. Total: {:.1} per 1,000 residents.",
                    best.violent_crimes_per_1000,
                    best.property_crimes_per_1000,
                    best.total_crimes_per_1000
                ),
            }]),
        }
    }
}

#[async_trait]
impl<S: CrimeGradeStore> CrimeGrader for DatasetGrader<S> {
    async fn grade_address(&self, address: &str) -> Result<CrimeGradeResult, GraderError> {
        Ok(self.resolve_by_address(address))
    }
}

fn default_result(address: &str, zip: Option<String>, reason: &str) -> CrimeGradeResult {
    CrimeGradeResult {
        address: address.to_string(),
        zip,
        overall_grade: LetterGrade::F,
        components: None,
        notes: Some(reason.to_string()),
        evidence: None,
    }
}
