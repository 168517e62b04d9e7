//! Input validation utilities.
//!
//! Pure functions, no state. Services call these before any write; the
//! first failing check short-circuits the operation.

use validator::ValidateEmail;

use crate::error::{CoreError, CoreResult};

/// Reject a blank (empty or whitespace-only) required string field.
///
/// Returns the trimmed value on success so callers can persist the
/// canonical form.
pub fn require_non_blank<'a>(field: &str, value: &'a str) -> CoreResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_argument(format!(
            "{field} must not be blank"
        )));
    }
    Ok(trimmed)
}

/// Validate an email address against the RFC-style rules used across
/// the platform.
pub fn require_valid_email(email: &str) -> CoreResult<&str> {
    let email = require_non_blank("email", email)?;
    if !email.validate_email() {
        return Err(CoreError::invalid_argument(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_rejected() {
        assert!(require_non_blank("name", "").is_err());
        assert!(require_non_blank("name", "   ").is_err());
        assert!(require_non_blank("name", "\t\n").is_err());
    }

    #[test]
    fn non_blank_values_trimmed() {
        assert_eq!(require_non_blank("name", "  Acme  ").unwrap(), "Acme");
        assert_eq!(require_non_blank("name", "x").unwrap(), "x");
    }

    #[test]
    fn valid_emails_accepted() {
        assert!(require_valid_email("alice@example.com").is_ok());
        assert!(require_valid_email("a.b+tag@sub.example.co").is_ok());
    }

    #[test]
    fn invalid_emails_rejected() {
        assert!(require_valid_email("").is_err());
        assert!(require_valid_email("not-an-email").is_err());
        assert!(require_valid_email("missing@tld@double").is_err());
        assert!(require_valid_email("@example.com").is_err());
    }

    #[test]
    fn blank_field_error_names_the_field() {
        let err = require_non_blank("title", " ").unwrap_err();
        assert!(err.to_string().contains("title"));
    }
}
