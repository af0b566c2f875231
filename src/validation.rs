// Validation utilities module
// Provides custom validation functions for domain-specific rules

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use validator::ValidationError;

/// Characters of which a password must contain at least one
pub const PASSWORD_SPECIAL_CHARACTERS: &str = "!@#$&*";

pub const PASSWORD_MIN_LENGTH: usize = 8;

fn zip_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // US ZIP or ZIP+4, whole value
    PATTERN.get_or_init(|| Regex::new(r"^\d{5}(?:[-\s]\d{4})?$").expect("zip code pattern is valid"))
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Validates password strength
/// At least 8 characters, one uppercase letter, one digit and one of !@#$&*
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(error_with_message(
            "password_too_short",
            "The length of Password must be at least 8 characters",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(error_with_message(
            "password_missing_uppercase",
            "Password must have at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(error_with_message(
            "password_missing_digit",
            "Password must have at least one number",
        ));
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARACTERS.contains(c)) {
        return Err(error_with_message(
            "password_missing_special",
            "Password must have at least one special character: !@#$&*",
        ));
    }
    Ok(())
}

/// Rejects values that are empty or only whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error_with_message("blank", "Value must not be empty or whitespace"))
    } else {
        Ok(())
    }
}

/// Validates a US ZIP code ("12345", "12345-6789" or "12345 6789")
pub fn validate_zip_code(zip_code: &str) -> Result<(), ValidationError> {
    if zip_code_pattern().is_match(zip_code) {
        Ok(())
    } else {
        Err(error_with_message("invalid_zip_code", "Zip code must look like 12345 or 12345-6789"))
    }
}
