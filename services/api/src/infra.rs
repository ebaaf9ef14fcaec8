use async_trait::async_trait;
use loan_eligibility::workflows::crime::{CrimeGradeResult, CrimeGrader, GraderError};
use loan_eligibility::workflows::lending::{
    LoanApplication, LoanApplicationId, LoanApplicationRepository, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Object-safe grader handle so the loan service keeps a single concrete type
/// while the backend is selected at runtime from configuration.
pub(crate) struct DynGrader(pub(crate) Arc<dyn CrimeGrader>);

#[async_trait]
impl CrimeGrader for DynGrader {
    async fn grade_address(&self, address: &str) -> Result<CrimeGradeResult, GraderError> {
        self.0.grade_address(address).await
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLoanApplicationRepository {
    records: Arc<Mutex<HashMap<LoanApplicationId, LoanApplication>>>,
}

impl LoanApplicationRepository for InMemoryLoanApplicationRepository {
    fn insert(&self, application: LoanApplication) -> Result<LoanApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &LoanApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}
