//! Everything the app keeps in the server-side session: the signed-in
//! identity, one-shot flash notices and the form CSRF token.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::errors::{AppError, AppResult};
use crate::models::{CurrentUser, User};

const USER_KEY: &str = "user";
const FLASH_KEY: &str = "flash";
const CSRF_KEY: &str = "csrf_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Error, message: message.into() }
    }
}

pub async fn current_user(session: &Session) -> AppResult<Option<CurrentUser>> {
    Ok(session.get::<CurrentUser>(USER_KEY).await?)
}

/// Anonymous -> Authenticated. The session id is rotated so an id planted
/// before login is worthless afterwards.
pub async fn sign_in(session: &Session, user: &User) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_KEY, CurrentUser::from(user)).await?;
    Ok(())
}

/// Authenticated -> Anonymous. Drops everything, including the CSRF token.
pub async fn sign_out(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}

pub async fn push_flash(session: &Session, flash: Flash) -> AppResult<()> {
    let mut queued = session
        .get::<Vec<Flash>>(FLASH_KEY)
        .await?
        .unwrap_or_default();
    queued.push(flash);
    session.insert(FLASH_KEY, queued).await?;
    Ok(())
}

/// Drains queued notices; each is shown once.
pub async fn take_flashes(session: &Session) -> AppResult<Vec<Flash>> {
    Ok(session
        .remove::<Vec<Flash>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}

/// Returns the session's CSRF token, creating one on first use.
pub async fn csrf_token(session: &Session) -> AppResult<String> {
    if let Some(token) = session.get::<String>(CSRF_KEY).await? {
        return Ok(token);
    }
    let token = uuid::Uuid::new_v4().simple().to_string();
    session.insert(CSRF_KEY, token.clone()).await?;
    Ok(token)
}

pub async fn verify_csrf(session: &Session, submitted: &str) -> AppResult<()> {
    match session.get::<String>(CSRF_KEY).await? {
        Some(expected) if !submitted.is_empty() && expected == submitted => Ok(()),
        _ => Err(AppError::Csrf),
    }
}
