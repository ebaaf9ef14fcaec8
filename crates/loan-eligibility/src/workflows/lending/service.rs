use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::{LoanApplication, LoanApplicationData, LoanApplicationId};
use super::eligibility::EligibilityEngine;
use super::repository::{LoanApplicationRepository, RepositoryError};
use crate::workflows::crime::{CrimeGrader, GraderError};

/// Outcome of the lightweight falsy-field submission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// All six fields are required and zero counts as missing. Known looseness:
/// a legitimate credit score or income of 0 is indistinguishable from absent
/// and is rejected.
pub fn validate_loan_application_data(data: &LoanApplicationData) -> ValidationOutcome {
    let missing = data.applicant_name.is_empty()
        || data.property_address.is_empty()
        || data.credit_score == 0
        || data.monthly_income == 0.0
        || data.requested_amount == 0.0
        || data.loan_term_months == 0;

    if missing {
        ValidationOutcome {
            is_valid: false,
            error: Some("All fields are required".to_string()),
        }
    } else {
        ValidationOutcome {
            is_valid: true,
            error: None,
        }
    }
}

static LOAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_loan_id() -> LoanApplicationId {
    let id = LOAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LoanApplicationId(format!("loan-{id:06}"))
}

/// Service composing validation, the eligibility engine, and the repository.
pub struct LoanApplicationService<R, G> {
    repository: Arc<R>,
    engine: EligibilityEngine<G>,
}

impl<R, G> LoanApplicationService<R, G>
where
    R: LoanApplicationRepository + 'static,
    G: CrimeGrader + 'static,
{
    pub fn new(repository: Arc<R>, grader: Arc<G>) -> Self {
        Self {
            repository,
            engine: EligibilityEngine::new(grader),
        }
    }

    /// Evaluate a submission and persist the resulting record.
    ///
    /// No transactional coupling: if persistence fails after a successful
    /// eligibility computation, the verdict is discarded and the error
    /// propagates.
    pub async fn create(
        &self,
        data: LoanApplicationData,
    ) -> Result<LoanApplication, LoanServiceError> {
        let validation = validate_loan_application_data(&data);
        if !validation.is_valid {
            return Err(LoanServiceError::Validation(
                validation
                    .error
                    .unwrap_or_else(|| "invalid submission".to_string()),
            ));
        }

        let eligibility = self.engine.calculate(&data).await?;

        let now = Utc::now();
        let record = LoanApplication {
            id: next_loan_id(),
            applicant_name: data.applicant_name,
            property_address: data.property_address,
            credit_score: data.credit_score,
            monthly_income: data.monthly_income,
            requested_amount: data.requested_amount,
            loan_term_months: data.loan_term_months,
            eligible: eligibility.eligible,
            reason: eligibility.reason,
            crime_grade: eligibility.crime_grade,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(record)?;
        Ok(stored)
    }

    /// Direct lookup by primary key; `None` means not found.
    pub fn get(
        &self,
        id: &LoanApplicationId,
    ) -> Result<Option<LoanApplication>, LoanServiceError> {
        Ok(self.repository.fetch(id)?)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum LoanServiceError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Grader(#[from] GraderError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
