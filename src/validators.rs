/// Input validators for session requests
/// Features:
/// 1. Required-field checks (empty input is `InvalidArgument`)
/// 2. DoS Protection: length limits on emails, user ids and tokens
/// 3. Email format validation

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_TOKEN_LENGTH: usize = 4096;
const MAX_USER_ID_LENGTH: usize = 128;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

fn require(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    if value.len() > max {
        return Err(ValidationError::TooLong(field, max));
    }
    Ok(())
}

/// Validates a login email and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();
    require("email", trimmed, MAX_EMAIL_LENGTH)?;

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    Ok(trimmed.to_string())
}

/// Passwords are taken verbatim; whitespace is significant and any
/// non-empty length is accepted
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password"));
    }
    Ok(())
}

pub fn is_valid_user_id(user_id: &str) -> Result<String, ValidationError> {
    let trimmed = user_id.trim();
    require("user_id", trimmed, MAX_USER_ID_LENGTH)?;
    Ok(trimmed.to_string())
}

pub fn is_valid_token(field: &'static str, token: &str) -> Result<(), ValidationError> {
    require(field, token, MAX_TOKEN_LENGTH)
}
