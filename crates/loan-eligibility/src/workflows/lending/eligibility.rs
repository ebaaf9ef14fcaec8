use std::sync::Arc;

use super::domain::{EligibilityReason, EligibilityResult, LoanApplicationData};
use crate::workflows::crime::{CrimeGrader, GraderError};

/// Income must cover the naive monthly payment with this much headroom.
const INCOME_HEADROOM: f64 = 1.5;

/// Minimum credit score accepted by the first rule.
const MINIMUM_CREDIT_SCORE: u16 = 700;

/// Applies the underwriting rules to a submission.
///
/// The crime grade is resolved up front because the verdict reports it no
/// matter which rule decides the outcome; rule evaluation itself is strictly
/// sequential and the first failing rule wins.
pub struct EligibilityEngine<G> {
    grader: Arc<G>,
}

impl<G: CrimeGrader> EligibilityEngine<G> {
    pub fn new(grader: Arc<G>) -> Self {
        Self { grader }
    }

    /// The only failure mode is the grader itself; with a resolver-backed
    /// grader this function effectively always returns a verdict.
    pub async fn calculate(
        &self,
        data: &LoanApplicationData,
    ) -> Result<EligibilityResult, GraderError> {
        let grade_result = self.grader.grade_address(&data.property_address).await?;
        let crime_grade = grade_result.overall_grade;

        let monthly_payment = data.requested_amount / f64::from(data.loan_term_months);
        let required_income = monthly_payment * INCOME_HEADROOM;

        let (eligible, reason) = if data.credit_score < MINIMUM_CREDIT_SCORE {
            (false, EligibilityReason::CreditScoreTooLow)
        } else if data.monthly_income <= required_income {
            // Exact comparison on purpose: income equal to the requirement
            // is rejected.
            (false, EligibilityReason::MonthlyIncomeTooLow)
        } else if crime_grade.is_failing() {
            (false, EligibilityReason::CrimeGradeTooLow)
        } else {
            (true, EligibilityReason::PassedAllChecks)
        };

        Ok(EligibilityResult {
            eligible,
            reason,
            crime_grade,
        })
    }
}
