//! Loan application intake, eligibility evaluation, and persistence.

pub mod domain;
pub mod eligibility;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    EligibilityReason, EligibilityResult, LoanApplication, LoanApplicationData, LoanApplicationId,
};
pub use eligibility::EligibilityEngine;
pub use repository::{LoanApplicationRepository, RepositoryError};
pub use router::loan_router;
pub use service::{
    validate_loan_application_data, LoanApplicationService, LoanServiceError, ValidationOutcome,
};
