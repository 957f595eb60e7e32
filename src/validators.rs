/// Input validators for account credentials
///
/// Emails must look like `local@domain.tld`. Passwords need at least one
/// lowercase letter, uppercase letter, digit and special character, and
/// must fit bcrypt's 72-byte input limit.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 72; // bcrypt ignores anything longer
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    static ref SPECIAL_CHARACTER: Regex = Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap();
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates password strength. Checks run in a fixed order and the first
/// failure is reported.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        ));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        ));
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(weak("should contain at least one lowercase letter"));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(weak("should contain at least one uppercase letter"));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(weak("should contain at least one digit"));
    }

    if !SPECIAL_CHARACTER.is_match(password) {
        return Err(weak("should contain at least one special character"));
    }

    Ok(())
}

fn weak(reason: &str) -> ValidationError {
    ValidationError::WeakPassword(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert_eq!(is_valid_email("a@x.com").unwrap(), "a@x.com");
        assert_eq!(is_valid_email("  first.last+tag@mail.example.org ").unwrap(), "first.last+tag@mail.example.org");
    }

    #[test]
    fn test_invalid_emails() {
        assert!(matches!(is_valid_email(""), Err(ValidationError::EmptyField(_))));
        assert!(matches!(is_valid_email("   "), Err(ValidationError::EmptyField(_))));
        assert!(matches!(is_valid_email("plainaddress"), Err(ValidationError::InvalidFormat(_))));
        assert!(matches!(is_valid_email("a@x"), Err(ValidationError::InvalidFormat(_))));
        assert!(matches!(is_valid_email("a@x.c"), Err(ValidationError::InvalidFormat(_))));
        assert!(matches!(is_valid_email("a b@x.com"), Err(ValidationError::InvalidFormat(_))));
    }

    #[test]
    fn test_email_too_long() {
        let email = format!("{}@x.com", "a".repeat(250));
        assert!(matches!(is_valid_email(&email), Err(ValidationError::TooLong(_, 254))));
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("Secret123!").is_ok());
        assert!(validate_password("aA1!aa").is_ok());
    }

    #[test]
    fn test_password_length_bounds() {
        assert!(matches!(validate_password(""), Err(ValidationError::EmptyField(_))));
        assert!(matches!(validate_password("aA1!a"), Err(ValidationError::TooShort(_, 6))));

        let longest = format!("aA1!{}", "a".repeat(68));
        assert!(validate_password(&longest).is_ok());
        let too_long = format!("aA1!{}", "a".repeat(69));
        assert!(matches!(validate_password(&too_long), Err(ValidationError::TooLong(_, 72))));
    }

    #[test]
    fn test_password_character_classes() {
        assert!(matches!(validate_password("SECRET123!"), Err(ValidationError::WeakPassword(msg)) if msg.contains("lowercase")));
        assert!(matches!(validate_password("secret123!"), Err(ValidationError::WeakPassword(msg)) if msg.contains("uppercase")));
        assert!(matches!(validate_password("Secretabc!"), Err(ValidationError::WeakPassword(msg)) if msg.contains("digit")));
        assert!(matches!(validate_password("Secret123"), Err(ValidationError::WeakPassword(msg)) if msg.contains("special")));
        // space is not a special character
        assert!(validate_password("Secret 123").is_err());
    }

    #[test]
    fn test_weak_password_message() {
        let err = validate_password("secret123!").unwrap_err();
        assert_eq!(err.to_string(), "password should contain at least one uppercase letter");
    }
}
