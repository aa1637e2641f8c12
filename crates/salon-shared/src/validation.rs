//! Form field validation.
//!
//! Every check here runs client-side before a remote call is made, so
//! obviously-invalid input never costs a round trip.  Checks are applied
//! in the same order the forms present them: email, password, password
//! confirmation, display name.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{MAX_DISPLAY_NAME_CHARS, MAX_MESSAGE_CHARS, MIN_PASSWORD_CHARS};
use crate::error::ValidationError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email regex"));

/// Check that the email matches `\S+@\S+\.\S+`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::MalformedEmail)
    }
}

/// Check the minimum password length.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        Err(ValidationError::PasswordTooShort)
    } else {
        Ok(())
    }
}

/// Check that both password fields agree.
pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    if password != confirmation {
        Err(ValidationError::PasswordMismatch)
    } else {
        Ok(())
    }
}

/// Check that a display name is present and within the length limit.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::MissingDisplayName);
    }
    if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(ValidationError::DisplayNameTooLong(MAX_DISPLAY_NAME_CHARS));
    }
    Ok(())
}

/// Check the message body length limit.
pub fn validate_message_body(body: &str) -> Result<(), ValidationError> {
    if body.chars().count() > MAX_MESSAGE_CHARS {
        Err(ValidationError::MessageTooLong(MAX_MESSAGE_CHARS))
    } else {
        Ok(())
    }
}

/// All signup pre-checks, in form order.  The first failure wins.
pub fn validate_signup(
    email: &str,
    password: &str,
    confirmation: &str,
    display_name: &str,
) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password)?;
    validate_password_confirmation(password, confirmation)?;
    validate_display_name(display_name)?;
    Ok(())
}

/// Login pre-checks: email shape, then password length.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password)?;
    Ok(())
}
