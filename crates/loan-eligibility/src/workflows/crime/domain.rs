use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fine-grained letter scale carried by resolver output and persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D-")]
    DMinus,
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    pub const ALL: [LetterGrade; 12] = [
        LetterGrade::A,
        LetterGrade::AMinus,
        LetterGrade::BPlus,
        LetterGrade::B,
        LetterGrade::BMinus,
        LetterGrade::CPlus,
        LetterGrade::C,
        LetterGrade::CMinus,
        LetterGrade::DPlus,
        LetterGrade::D,
        LetterGrade::DMinus,
        LetterGrade::F,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::DMinus => "D-",
            LetterGrade::F => "F",
        }
    }

    /// The eligibility rules only ever test for the bottom of the scale.
    pub const fn is_failing(self) -> bool {
        matches!(self, LetterGrade::F)
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|grade| grade.label() == value.trim())
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse five-value scale produced by the scraper and the geocode heuristic.
///
/// Kept distinct from [`LetterGrade`]: widening into the fine scale is explicit
/// via [`CoarseGrade::widen`], never implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoarseGrade {
    A,
    B,
    C,
    D,
    F,
}

impl CoarseGrade {
    pub fn from_char(value: char) -> Option<Self> {
        match value {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'F' => Some(Self::F),
            _ => None,
        }
    }

    pub const fn widen(self) -> LetterGrade {
        match self {
            CoarseGrade::A => LetterGrade::A,
            CoarseGrade::B => LetterGrade::B,
            CoarseGrade::C => LetterGrade::C,
            CoarseGrade::D => LetterGrade::D,
            CoarseGrade::F => LetterGrade::F,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CoarseGrade::A => "A",
            CoarseGrade::B => "B",
            CoarseGrade::C => "C",
            CoarseGrade::D => "D",
            CoarseGrade::F => "F",
        }
    }
}

impl fmt::Display for CoarseGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which tier of the fallback chain produced a [`CrimeAnalysisResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisSource {
    #[serde(rename = "crimegrade.org")]
    CrimeGradeOrg,
    #[serde(rename = "coordinates-analysis")]
    CoordinatesAnalysis,
    #[serde(rename = "fallback")]
    Fallback,
    /// Reserved for failures outside the fallback chain; the resolver
    /// itself always degrades to [`AnalysisSource::Fallback`].
    #[serde(rename = "error")]
    Error,
}

impl AnalysisSource {
    pub const fn label(self) -> &'static str {
        match self {
            AnalysisSource::CrimeGradeOrg => "crimegrade.org",
            AnalysisSource::CoordinatesAnalysis => "coordinates-analysis",
            AnalysisSource::Fallback => "fallback",
            AnalysisSource::Error => "error",
        }
    }
}

/// Output of the tiered fallback chain in [`super::resolver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeAnalysisResult {
    pub crime_grade: CoarseGrade,
    pub crime_score: u32,
    pub confidence: f32,
    pub source: AnalysisSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrimeAnalysisResult {
    /// Lift a coarse analysis into the resolver's uniform output shape.
    pub fn into_grade_result(self, address: &str) -> CrimeGradeResult {
        let notes = match &self.error {
            Some(error) => format!("{} ({})", self.source.label(), error),
            None => format!(
                "Resolved via {} with confidence {:.2}",
                self.source.label(),
                self.confidence
            ),
        };

        CrimeGradeResult {
            address: address.to_string(),
            zip: super::postal::extract_postal_code(address),
            overall_grade: self.crime_grade.widen(),
            components: None,
            notes: Some(notes),
            evidence: None,
        }
    }
}

/// Violent/property sub-grades attached to a resolved result when known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeComponents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violent_crime: Option<LetterGrade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_crime: Option<LetterGrade>,
}

/// Citation attached to a resolved grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub snippet: String,
}

/// Uniform grade result returned by every resolution path.
///
/// `overall_grade` is always present; everything else is best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeGradeResult {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    pub overall_grade: LetterGrade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<GradeComponents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<EvidenceItem>>,
}

/// Pre-seeded crime statistics row keyed by postal code.
///
/// Reference data only: populated by the offline CSV import and read-only at
/// request time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeGradeRecord {
    pub id: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
    pub address_example: String,
    pub overall_grade: LetterGrade,
    pub violent_crime_grade: LetterGrade,
    pub property_crime_grade: LetterGrade,
    pub violent_crimes_per_1000: f64,
    pub property_crimes_per_1000: f64,
    pub total_crimes_per_1000: f64,
    pub cost_of_crime_per_household_usd: i64,
    pub confidence: f64,
    pub retrieved_at_utc: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_grade_serializes_with_modifiers() {
        let json = serde_json::to_string(&LetterGrade::BMinus).expect("serializes");
        assert_eq!(json, "\"B-\"");
        let parsed: LetterGrade = serde_json::from_str("\"A-\"").expect("deserializes");
        assert_eq!(parsed, LetterGrade::AMinus);
    }

    #[test]
    fn letter_grade_parse_matches_labels() {
        for grade in LetterGrade::ALL {
            assert_eq!(LetterGrade::parse(grade.label()), Some(grade));
        }
        assert_eq!(LetterGrade::parse("E"), None);
    }

    #[test]
    fn only_f_is_failing() {
        let failing: Vec<_> = LetterGrade::ALL
            .into_iter()
            .filter(|grade| grade.is_failing())
            .collect();
        assert_eq!(failing, vec![LetterGrade::F]);
    }

    #[test]
    fn coarse_grade_widens_to_plain_letters() {
        assert_eq!(CoarseGrade::B.widen(), LetterGrade::B);
        assert_eq!(CoarseGrade::from_char('C'), Some(CoarseGrade::C));
        assert_eq!(CoarseGrade::from_char('E'), None);
    }

    #[test]
    fn grade_result_omits_absent_fields() {
        let result = CrimeGradeResult {
            address: "10001".to_string(),
            zip: Some("10001".to_string()),
            overall_grade: LetterGrade::A,
            components: None,
            notes: None,
            evidence: None,
        };
        let json = serde_json::to_value(&result).expect("serializes");
        assert!(json.get("components").is_none());
        assert!(json.get("notes").is_none());
        assert_eq!(json["overall_grade"], "A");
    }
}
