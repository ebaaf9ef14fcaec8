//! Crime-grade resolution for property addresses.
//!
//! Two resolution philosophies coexist on purpose. The resolver chain
//! (dataset lookup, scraper, geocode heuristic) degrades gracefully and always
//! produces a grade; the chat-model agent fails hard on malformed output. The
//! eligibility engine consumes either through the [`CrimeGrader`] seam.

pub mod agent;
pub mod domain;
pub mod geocode;
pub mod import;
pub mod postal;
pub mod repository;
pub mod resolver;
pub mod scraper;

use async_trait::async_trait;

pub use domain::{
    AnalysisSource, CoarseGrade, CrimeAnalysisResult, CrimeGradeRecord, CrimeGradeResult,
    EvidenceItem, GradeComponents, LetterGrade,
};
pub use import::{import_reference_dataset, import_reference_dataset_from_path, ImportSummary};
pub use postal::{extract_postal_code, validate_address, AddressValidation};
pub use repository::{CrimeGradeStore, DatasetGrader, InMemoryCrimeGradeStore, StoreError};
pub use resolver::{CrimeAnalysisResolver, ResolverGrader};

/// Resolves the crime grade the eligibility rules consume.
#[async_trait]
pub trait CrimeGrader: Send + Sync {
    async fn grade_address(&self, address: &str) -> Result<CrimeGradeResult, GraderError>;
}

/// Failure from a grade resolution backend. Only the agent path produces
/// these; the resolver-backed graders degrade internally instead.
#[derive(Debug, thiserror::Error)]
pub enum GraderError {
    #[error(transparent)]
    Agent(#[from] agent::AgentError),
}
