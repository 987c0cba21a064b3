//! Common validation utilities.

use validator::ValidationError;

/// Pin durations that can be bought in one request, in days.
pub const ALLOWED_PIN_DURATIONS: [i32; 3] = [1, 3, 7];

/// Validates that a requested pin duration is one of the offered lengths.
pub fn validate_pin_duration(days: i32) -> Result<(), ValidationError> {
    if ALLOWED_PIN_DURATIONS.contains(&days) {
        Ok(())
    } else {
        let mut err = ValidationError::new("pin_duration");
        err.message = Some("Pin duration must be 1, 3, or 7 days".into());
        err.add_param("value".into(), &days);
        Err(err)
    }
}

/// Validates a two-letter uppercase state code such as `CA`.
pub fn validate_state_code(state: &str) -> Result<(), ValidationError> {
    if state.len() == 2 && state.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("state_code");
        err.message = Some("State must be a two-letter uppercase code".into());
        Err(err)
    }
}

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pin_duration() {
        assert!(validate_pin_duration(1).is_ok());
        assert!(validate_pin_duration(3).is_ok());
        assert!(validate_pin_duration(7).is_ok());
    }

    #[test]
    fn test_validate_pin_duration_rejects_other_lengths() {
        for days in [-1, 0, 2, 4, 5, 6, 8, 14] {
            assert!(validate_pin_duration(days).is_err(), "{} accepted", days);
        }
    }

    #[test]
    fn test_validate_pin_duration_error_message() {
        let err = validate_pin_duration(2).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Pin duration must be 1, 3, or 7 days"
        );
    }

    #[test]
    fn test_validate_state_code() {
        assert!(validate_state_code("CA").is_ok());
        assert!(validate_state_code("NY").is_ok());
        assert!(validate_state_code("ca").is_err());
        assert!(validate_state_code("CAL").is_err());
        assert!(validate_state_code("").is_err());
        assert!(validate_state_code("C1").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("hello").is_ok());
        assert!(validate_not_blank("  x ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
    }
}
