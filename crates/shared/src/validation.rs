//! Common validation utilities.

use validator::ValidationError;

/// Validates that a string contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Parses a positive integer identifier from text.
///
/// Surrounding whitespace is ignored; signs, decimals and trailing garbage are not.
pub fn parse_positive_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i64>().ok().filter(|id| *id > 0)
}

/// Trims a free-text field and collapses an empty result to `None`.
pub fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("hello").is_ok());
        assert!(validate_not_blank("  x ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
    }

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id("7"), Some(7));
        assert_eq!(parse_positive_id(" 12 "), Some(12));
        assert_eq!(parse_positive_id("0"), None);
        assert_eq!(parse_positive_id("-3"), None);
        assert_eq!(parse_positive_id("+3"), None);
        assert_eq!(parse_positive_id("7abc"), None);
        assert_eq!(parse_positive_id("1.5"), None);
        assert_eq!(parse_positive_id(""), None);
        assert_eq!(parse_positive_id("99999999999999999999"), None);
    }

    #[test]
    fn test_normalize_optional_text() {
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(
            normalize_optional_text(Some("  done  ")),
            Some("done".to_string())
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = validate_not_blank(" ").unwrap_err();
        assert_eq!(err.code, "blank");
        assert!(err.message.is_some());
    }
}
