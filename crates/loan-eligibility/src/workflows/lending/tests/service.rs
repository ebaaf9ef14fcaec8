use std::sync::Arc;

use super::common::*;
use crate::workflows::crime::LetterGrade;
use crate::workflows::lending::domain::{EligibilityReason, LoanApplicationId};
use crate::workflows::lending::{
    validate_loan_application_data, LoanApplicationService, LoanServiceError,
};

#[test]
fn complete_submissions_validate() {
    let outcome = validate_loan_application_data(&submission());
    assert!(outcome.is_valid);
    assert!(outcome.error.is_none());
}

#[test]
fn zero_credit_score_counts_as_missing() {
    let outcome = validate_loan_application_data(&missing_credit_submission());
    assert!(!outcome.is_valid);
    assert_eq!(outcome.error.as_deref(), Some("All fields are required"));
}

#[test]
fn blank_applicant_name_counts_as_missing() {
    let mut data = submission();
    data.applicant_name = String::new();
    let outcome = validate_loan_application_data(&data);
    assert!(!outcome.is_valid);
    assert_eq!(outcome.error.as_deref(), Some("All fields are required"));
}

#[tokio::test]
async fn create_persists_the_evaluated_record() {
    let (service, repository) = build_service(LetterGrade::BPlus);

    let record = service.create(submission()).await.expect("created");

    assert!(record.id.0.starts_with("loan-"));
    assert!(record.eligible);
    assert_eq!(record.reason, EligibilityReason::PassedAllChecks);
    assert_eq!(record.crime_grade, LetterGrade::BPlus);
    assert_eq!(record.created_at, record.updated_at);

    let fetched = service.get(&record.id).expect("fetch").expect("stored");
    assert_eq!(fetched, record);
    assert_eq!(repository.len(), 1);
}

#[tokio::test]
async fn invalid_submissions_are_rejected_before_grading() {
    let (service, repository) = build_service(LetterGrade::A);

    let error = service
        .create(missing_credit_submission())
        .await
        .expect_err("rejected");

    match error {
        LoanServiceError::Validation(message) => {
            assert_eq!(message, "All fields are required");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn grader_failures_surface_and_nothing_is_persisted() {
    let repository = Arc::new(MemoryRepository::default());
    let service = LoanApplicationService::new(repository.clone(), Arc::new(FailingGrader));

    let error = service.create(submission()).await.expect_err("failed");
    assert!(matches!(error, LoanServiceError::Grader(_)));
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn repository_failures_surface() {
    let service = LoanApplicationService::new(
        Arc::new(UnavailableRepository),
        Arc::new(StaticGrader(LetterGrade::A)),
    );

    let error = service.create(submission()).await.expect_err("failed");
    assert!(matches!(error, LoanServiceError::Repository(_)));
}

#[test]
fn unknown_ids_read_as_none() {
    let repository = Arc::new(MemoryRepository::default());
    let service = LoanApplicationService::new(repository, Arc::new(StaticGrader(LetterGrade::A)));

    let found = service
        .get(&LoanApplicationId("loan-999999".to_string()))
        .expect("fetch");
    assert!(found.is_none());
}
