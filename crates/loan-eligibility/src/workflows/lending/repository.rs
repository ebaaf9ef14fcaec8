use super::domain::{LoanApplication, LoanApplicationId};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// The store is treated as an opaque key-value repository: create once,
/// fetch by id. `Ok(None)` from `fetch` is the ordinary not-found outcome,
/// never an error.
pub trait LoanApplicationRepository: Send + Sync {
    fn insert(&self, application: LoanApplication) -> Result<LoanApplication, RepositoryError>;
    fn fetch(&self, id: &LoanApplicationId) -> Result<Option<LoanApplication>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
