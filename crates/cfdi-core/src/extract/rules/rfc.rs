//! RFC (Mexican tax identification number) validation.

use chrono::NaiveDate;

use super::patterns::RFC_PATTERN;

/// Taxpayer category implied by the RFC length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfcKind {
    /// Persona moral: 12 characters.
    LegalEntity,
    /// Persona física: 13 characters.
    Individual,
}

/// Classify a well-formed RFC, or return `None` if it is malformed.
///
/// Format: 3 or 4 letters, a `YYMMDD` registration or birth date, and a
/// 3-character homoclave.
pub fn classify_rfc(rfc: &str) -> Option<RfcKind> {
    let caps = RFC_PATTERN.captures(rfc.trim())?;

    let year: i32 = caps[2].parse().ok()?;
    let month: u32 = caps[3].parse().ok()?;
    let day: u32 = caps[4].parse().ok()?;

    // The century is not encoded; 2000-based years accept every valid YYMMDD.
    NaiveDate::from_ymd_opt(2000 + year, month, day)?;

    match caps[1].chars().count() {
        3 => Some(RfcKind::LegalEntity),
        _ => Some(RfcKind::Individual),
    }
}

/// Check whether an RFC is well-formed.
pub fn validate_rfc(rfc: &str) -> bool {
    classify_rfc(rfc).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rfc_valid() {
        assert!(validate_rfc("AAA010101AAA"));
        assert!(validate_rfc("XAXX010101000")); // Público en general
        assert!(validate_rfc("ÑAÑ800229AB1"));
        assert!(validate_rfc(" GODE561231GR8 "));
    }

    #[test]
    fn test_validate_rfc_invalid() {
        assert!(!validate_rfc("AAA011301AAA")); // Month 13
        assert!(!validate_rfc("AAA010230AAA")); // February 30
        assert!(!validate_rfc("AA010101AAA")); // Too few letters
        assert!(!validate_rfc("aaa010101aaa")); // Lowercase
        assert!(!validate_rfc(""));
    }

    #[test]
    fn test_classify_rfc() {
        assert_eq!(classify_rfc("AAA010101AAA"), Some(RfcKind::LegalEntity));
        assert_eq!(classify_rfc("GODE561231GR8"), Some(RfcKind::Individual));
        assert_eq!(classify_rfc("ÑAÑ800229AB1"), Some(RfcKind::LegalEntity));
    }
}
