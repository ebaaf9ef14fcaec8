use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::crime::agent::AgentError;
use crate::workflows::crime::{CrimeGradeResult, CrimeGrader, GraderError, LetterGrade};
use crate::workflows::lending::domain::{LoanApplication, LoanApplicationData, LoanApplicationId};
use crate::workflows::lending::repository::{LoanApplicationRepository, RepositoryError};
use crate::workflows::lending::LoanApplicationService;

pub(super) fn submission() -> LoanApplicationData {
    LoanApplicationData {
        applicant_name: "John Doe".to_string(),
        property_address: "123 Main St, New York, NY 10001".to_string(),
        credit_score: 750,
        monthly_income: 5000.0,
        requested_amount: 200_000.0,
        loan_term_months: 360,
    }
}

pub(super) fn missing_credit_submission() -> LoanApplicationData {
    let mut submission = submission();
    submission.credit_score = 0;
    submission
}

/// Grader stub that always reports the same overall grade.
pub(super) struct StaticGrader(pub(super) LetterGrade);

#[async_trait]
impl CrimeGrader for StaticGrader {
    async fn grade_address(&self, address: &str) -> Result<CrimeGradeResult, GraderError> {
        Ok(CrimeGradeResult {
            address: address.to_string(),
            zip: None,
            overall_grade: self.0,
            components: None,
            notes: None,
            evidence: None,
        })
    }
}

pub(super) struct FailingGrader;

#[async_trait]
impl CrimeGrader for FailingGrader {
    async fn grade_address(&self, _address: &str) -> Result<CrimeGradeResult, GraderError> {
        Err(GraderError::Agent(AgentError::NoResponse))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<LoanApplicationId, LoanApplication>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl LoanApplicationRepository for MemoryRepository {
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

pub(super) struct UnavailableRepository;

impl LoanApplicationRepository for UnavailableRepository {
    fn insert(&self, _application: LoanApplication) -> Result<LoanApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &LoanApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service(
    grade: LetterGrade,
) -> (
    Arc<LoanApplicationService<MemoryRepository, StaticGrader>>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(LoanApplicationService::new(
        repository.clone(),
        Arc::new(StaticGrader(grade)),
    ));
    (service, repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
