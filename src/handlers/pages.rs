use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::errors::{AppError, AppResult};
use crate::render::{self, IndexPage};
use crate::session;

pub async fn serve_index(session: Session) -> AppResult<Response> {
    if session::current_user(&session).await?.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let flashes = session::take_flashes(&session).await?;
    render::page(&IndexPage { user: None, flashes: &flashes })
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
