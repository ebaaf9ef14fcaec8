use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::crime::LetterGrade;

/// Identifier wrapper for persisted loan applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanApplicationId(pub String);

/// Raw applicant submission. Field names follow the HTTP contract.
///
/// Defaults stand in for missing JSON fields so the falsy-field validation in
/// the service can report them uniformly instead of failing at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanApplicationData {
    pub applicant_name: String,
    pub property_address: String,
    pub credit_score: u16,
    pub monthly_income: f64,
    pub requested_amount: f64,
    pub loan_term_months: u32,
}

impl Default for LoanApplicationData {
    fn default() -> Self {
        Self {
            applicant_name: String::new(),
            property_address: String::new(),
            credit_score: 0,
            monthly_income: 0.0,
            requested_amount: 0.0,
            loan_term_months: 0,
        }
    }
}

/// Closed set of verdict explanations, serialized as the exact strings the
/// API has always returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EligibilityReason {
    #[serde(rename = "Credit score too low")]
    CreditScoreTooLow,
    #[serde(rename = "Monthly income too low")]
    MonthlyIncomeTooLow,
    #[serde(rename = "Crime grade too low")]
    CrimeGradeTooLow,
    #[serde(rename = "Passed all checks")]
    PassedAllChecks,
}

impl EligibilityReason {
    pub const fn label(self) -> &'static str {
        match self {
            EligibilityReason::CreditScoreTooLow => "Credit score too low",
            EligibilityReason::MonthlyIncomeTooLow => "Monthly income too low",
            EligibilityReason::CrimeGradeTooLow => "Crime grade too low",
            EligibilityReason::PassedAllChecks => "Passed all checks",
        }
    }
}

impl fmt::Display for EligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict produced by the eligibility engine. Derived, never stored on its
/// own; the fields are embedded into the persisted application record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    pub reason: EligibilityReason,
    #[serde(rename = "crimeGrade")]
    pub crime_grade: LetterGrade,
}

/// Persisted application record. Immutable after creation; there is no update
/// endpoint in the current scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: LoanApplicationId,
    pub applicant_name: String,
    pub property_address: String,
    pub credit_score: u16,
    pub monthly_income: f64,
    pub requested_amount: f64,
    pub loan_term_months: u32,
    pub eligible: bool,
    pub reason: EligibilityReason,
    pub crime_grade: LetterGrade,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
