mod auth;
mod dashboard;
mod pages;
mod task;

use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::errors::AppResult;
use crate::session::{self, Flash};

pub use auth::{serve_register_page, handle_register, serve_login_page, handle_login, handle_logout};
pub use dashboard::serve_dashboard;
pub use pages::{serve_index, not_found};
pub use task::{add_task, serve_edit_task, handle_edit_task, toggle_task, delete_task};

// Queues a notice for the next page and redirects there.
async fn redirect_with(session: &Session, flash: Flash, to: &str) -> AppResult<Response> {
    session::push_flash(session, flash).await?;
    Ok(Redirect::to(to).into_response())
}
