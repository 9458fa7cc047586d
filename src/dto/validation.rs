use validator::ValidationError;

const PHONE_MAX_LENGTH: usize = 20;

/// Validate a phone number: non-empty, bounded, digits with optional
/// separating dashes.
pub fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.len() > PHONE_MAX_LENGTH {
        return Err(ValidationError::new("phone_number_length"));
    }
    if !value.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return Err(ValidationError::new("phone_number_format"));
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("phone_number_format"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_number_valid() {
        assert!(validate_phone_number("01011112222").is_ok());
        assert!(validate_phone_number("010-1111-2222").is_ok());
        assert!(validate_phone_number("010-1").is_ok());
    }

    #[test]
    fn test_validate_phone_number_invalid_length() {
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number(&"0".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_phone_number_invalid_format() {
        assert!(validate_phone_number("010 1111 2222").is_err()); // spaces
        assert!(validate_phone_number("phone").is_err());
        assert!(validate_phone_number("---").is_err()); // no digits
    }
}
