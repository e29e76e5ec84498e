//! Field rules for registration and task input. Pure functions, no I/O.

use thiserror::Error;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const TITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 200;

/// A failed rule, carrying the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

pub type Verdict = Result<(), ValidationError>;

pub fn validate_username(username: &str) -> Verdict {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(ValidationError::new(
            "Username must be at least 3 characters long",
        ));
    }
    if len > USERNAME_MAX_LEN {
        return Err(ValidationError::new(
            "Username must be less than 20 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ValidationError::new(
            "Username can only contain letters, numbers, and underscores",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Verdict {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::new(
            "Password must be at least 8 characters long",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::new(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "Password must contain at least one number",
        ));
    }
    Ok(())
}

/// Expects already-trimmed input.
pub fn validate_task_fields(title: &str, description: &str) -> Verdict {
    if title.is_empty() {
        return Err(ValidationError::new("Task title is required."));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ValidationError::new(
            "Task title must be less than 200 characters.",
        ));
    }
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(ValidationError::new(
            "Task description must be less than 200 characters.",
        ));
    }
    Ok(())
}
