//! Input validation functions
//!
//! This module provides validation utilities for signup and login input.
//! Email syntax checks are delegated to the `validator` crate.

use validator::ValidateEmail;

/// Maximum accepted length for a display name
pub const MAX_USERNAME_LEN: usize = 50;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum accepted password length
pub const MAX_PASSWORD_LEN: usize = 128;

/// Canonical form used for storage and lookup of email addresses
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate a display name
///
/// Letters, digits, spaces and `_ - .` are accepted. Leading or trailing
/// whitespace is rejected rather than silently trimmed.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.trim() != username {
        return Err("Username cannot start or end with whitespace".to_string());
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' '))
    {
        return Err("Username contains invalid characters".to_string());
    }
    Ok(())
}

/// Validate password strength
///
/// Bounds count characters, not bytes.
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err("Password too long".to_string());
    }
    Ok(())
}
