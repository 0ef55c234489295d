/// Input validators for account and catalog requests
/// Features:
/// 1. DoS Protection: Input length limits
/// 2. Data Theft Protection: Control character rejection
/// 3. Format checks: email and phone shape

use lazy_static::lazy_static;
use regex::Regex;
use secrecy::{ExposeSecret, Secret};

use crate::auth::MAX_PASSWORD_BYTES;
use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 30;
const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 30;
const MAX_SEARCH_LENGTH: usize = 100;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    // Optional leading '+', then 6 to 20 digits
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9]{6,20}$").unwrap();
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email".to_string(), MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    if has_suspicious_email_patterns(trimmed) {
        return Err(ValidationError::SuspiciousContent("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a first or last name (2 to 30 characters)
pub fn is_valid_name(field: &str, name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }

    let length = trimmed.chars().count();
    if length < MIN_NAME_LENGTH {
        return Err(ValidationError::TooShort(field.to_string(), MIN_NAME_LENGTH));
    }

    if length > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong(field.to_string(), MAX_NAME_LENGTH));
    }

    if has_suspicious_name_patterns(trimmed) {
        return Err(ValidationError::SuspiciousContent(field.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Checks password length (6 to 30 characters, at most 72 bytes so bcrypt
/// reads all of it). The password itself is never echoed in the error.
pub fn is_valid_password(password: &Secret<String>) -> Result<(), ValidationError> {
    let length = password.expose_secret().chars().count();

    if length == 0 {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password".to_string(), MIN_PASSWORD_LENGTH));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_LENGTH));
    }

    if password.expose_secret().len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES));
    }

    Ok(())
}

/// Validates a phone number and strips spaces and dashes
pub fn is_valid_phone(phone: &str) -> Result<String, ValidationError> {
    let normalized: String = phone
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();

    if normalized.is_empty() {
        return Err(ValidationError::EmptyField("phone".to_string()));
    }

    if !PHONE_REGEX.is_match(&normalized) {
        return Err(ValidationError::InvalidFormat("phone".to_string()));
    }

    Ok(normalized)
}

/// Validates a product search pattern; must be a compilable regex
pub fn is_valid_search_pattern(pattern: &str) -> Result<String, ValidationError> {
    let trimmed = pattern.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("name".to_string()));
    }

    if trimmed.len() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong("name".to_string(), MAX_SEARCH_LENGTH));
    }

    if Regex::new(trimmed).is_err() {
        return Err(ValidationError::InvalidFormat("name".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Detects suspicious patterns in email addresses
fn has_suspicious_email_patterns(email: &str) -> bool {
    if let Some(at_pos) = email.find('@') {
        let local_part = &email[..at_pos];
        if local_part.len() > 64 {
            return true;
        }
    }

    if email.matches('@').count() != 1 {
        return true;
    }

    email.contains('\0')
}

/// Detects suspicious patterns in names
fn has_suspicious_name_patterns(name: &str) -> bool {
    if name.chars().any(|c| c.is_control()) {
        return true;
    }

    let special_char_count = name
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace() && *c != '-' && *c != '.' && *c != '\'')
        .count();

    special_char_count > 3
}
