//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a display name is 1 to 32 visible characters.
///
/// # Examples
///
/// ```ignore
/// validate_username("ada")       // Ok
/// validate_username("")          // Err - empty
/// validate_username("   ")       // Err - whitespace only
/// ```
pub fn validate_username(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("username_empty");
        err.message = Some("Username must contain at least one visible character".into());
        return Err(err);
    }

    if name.chars().count() > 32 {
        let mut err = ValidationError::new("username_length");
        err.message = Some(
            format!(
                "Username must be at most 32 characters (got {})",
                name.chars().count()
            )
            .into(),
        );
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("username_format");
        err.message = Some("Username must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("ada").is_ok());
        assert!(validate_username("Grace Hopper").is_ok());
        assert!(validate_username("x").is_ok());
    }

    #[test]
    fn test_validate_username_invalid_length() {
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_username_invalid_format() {
        assert!(validate_username("ada\nlovelace").is_err());
        assert!(validate_username("tab\there").is_err());
    }
}
