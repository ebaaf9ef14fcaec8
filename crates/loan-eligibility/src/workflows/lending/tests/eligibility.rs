use std::sync::Arc;

use super::common::*;
use crate::workflows::crime::LetterGrade;
use crate::workflows::lending::domain::EligibilityReason;
use crate::workflows::lending::EligibilityEngine;

fn engine(grade: LetterGrade) -> EligibilityEngine<StaticGrader> {
    EligibilityEngine::new(Arc::new(StaticGrader(grade)))
}

#[tokio::test]
async fn low_credit_score_is_rejected_first() {
    let mut data = submission();
    data.credit_score = 650;
    data.monthly_income = 100.0;

    let verdict = engine(LetterGrade::F)
        .calculate(&data)
        .await
        .expect("verdict");

    assert!(!verdict.eligible);
    assert_eq!(verdict.reason, EligibilityReason::CreditScoreTooLow);
    assert_eq!(verdict.crime_grade, LetterGrade::F);
}

#[tokio::test]
async fn credit_score_at_threshold_passes_the_credit_rule() {
    let mut data = submission();
    data.credit_score = 700;

    let verdict = engine(LetterGrade::B)
        .calculate(&data)
        .await
        .expect("verdict");

    assert!(verdict.eligible);
    assert_eq!(verdict.reason, EligibilityReason::PassedAllChecks);
}

#[tokio::test]
async fn income_equal_to_the_requirement_is_rejected() {
    // 180000 over 360 months is a 500 payment, so 750 income is required.
    let mut data = submission();
    data.requested_amount = 180_000.0;
    data.loan_term_months = 360;
    data.monthly_income = 750.0;

    let verdict = engine(LetterGrade::B)
        .calculate(&data)
        .await
        .expect("verdict");

    assert!(!verdict.eligible);
    assert_eq!(verdict.reason, EligibilityReason::MonthlyIncomeTooLow);
}

#[tokio::test]
async fn income_rejection_wins_over_a_failing_crime_grade() {
    let mut data = submission();
    data.requested_amount = 180_000.0;
    data.loan_term_months = 360;
    data.monthly_income = 750.0;

    let verdict = engine(LetterGrade::F)
        .calculate(&data)
        .await
        .expect("verdict");

    assert!(!verdict.eligible);
    assert_eq!(verdict.reason, EligibilityReason::MonthlyIncomeTooLow);
    assert_eq!(verdict.crime_grade, LetterGrade::F);
}

#[tokio::test]
async fn income_just_above_the_requirement_passes() {
    let mut data = submission();
    data.requested_amount = 180_000.0;
    data.loan_term_months = 360;
    data.monthly_income = 750.01;

    let verdict = engine(LetterGrade::B)
        .calculate(&data)
        .await
        .expect("verdict");

    assert!(verdict.eligible);
}

#[tokio::test]
async fn failing_crime_grade_rejects_an_otherwise_qualified_applicant() {
    let verdict = engine(LetterGrade::F)
        .calculate(&submission())
        .await
        .expect("verdict");

    assert!(!verdict.eligible);
    assert_eq!(verdict.reason, EligibilityReason::CrimeGradeTooLow);
    assert_eq!(verdict.crime_grade, LetterGrade::F);
}

#[tokio::test]
async fn every_non_failing_grade_is_accepted() {
    for grade in LetterGrade::ALL {
        if grade.is_failing() {
            continue;
        }
        let verdict = engine(grade).calculate(&submission()).await.expect("verdict");
        assert!(verdict.eligible, "grade {} should pass", grade.label());
        assert_eq!(verdict.crime_grade, grade);
    }
}

#[tokio::test]
async fn grader_failure_propagates() {
    let engine = EligibilityEngine::new(Arc::new(FailingGrader));
    let result = engine.calculate(&submission()).await;
    assert!(result.is_err());
}
