use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

fn zip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Exactly five digits at word boundaries; a trailing -#### extension is
    // left behind by the boundary match itself.
    PATTERN.get_or_init(|| Regex::new(r"\b(\d{5})\b").expect("static pattern compiles"))
}

/// Extract the first 5-digit postal code from a free-text address.
///
/// No locale awareness and no validation that the code exists; `None` when the
/// address carries no standalone 5-digit run.
pub fn extract_postal_code(address: &str) -> Option<String> {
    zip_pattern()
        .captures(address)
        .and_then(|captures| captures.get(1))
        .map(|code| code.as_str().to_string())
}

/// Result of the lightweight address pre-check used by the analysis endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressValidation {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AddressValidation {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(reason: &str) -> Self {
        Self {
            is_valid: false,
            error: Some(reason.to_string()),
        }
    }
}

/// Reject empty/whitespace-only addresses and anything shorter than 5
/// characters after trimming.
pub fn validate_address(address: &str) -> AddressValidation {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return AddressValidation::invalid("Address is required");
    }
    if trimmed.len() < 5 {
        return AddressValidation::invalid("Address is too short");
    }
    AddressValidation::valid()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_five_digit_run() {
        assert_eq!(
            extract_postal_code("123 Main St, New York, NY 10001"),
            Some("10001".to_string())
        );
        assert_eq!(extract_postal_code("10001"), Some("10001".to_string()));
    }

    #[test]
    fn ignores_zip_plus_four_extension() {
        assert_eq!(
            extract_postal_code("500 5th Ave, New York, NY 10110-1234"),
            Some("10110".to_string())
        );
    }

    #[test]
    fn skips_runs_that_are_not_exactly_five_digits() {
        assert_eq!(extract_postal_code("PO Box 123456"), None);
        assert_eq!(extract_postal_code("Suite 402"), None);
        assert_eq!(extract_postal_code("no digits here"), None);
    }

    #[test]
    fn first_match_wins_over_later_codes() {
        assert_eq!(
            extract_postal_code("10001 or maybe 94105"),
            Some("10001".to_string())
        );
    }

    #[test]
    fn rejects_empty_and_short_addresses() {
        assert_eq!(
            validate_address("   "),
            AddressValidation {
                is_valid: false,
                error: Some("Address is required".to_string()),
            }
        );
        assert_eq!(
            validate_address("abc "),
            AddressValidation {
                is_valid: false,
                error: Some("Address is too short".to_string()),
            }
        );
    }

    #[test]
    fn accepts_reasonable_addresses() {
        assert!(validate_address("123 Main St").is_valid);
    }
}
