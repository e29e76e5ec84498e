use axum::{
    extract::{Query, State},
    response::Response,
    Extension,
};
use tower_sessions::Session;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::models::{CurrentUser, SearchQuery};
use crate::render::{self, DashboardPage, DashboardView};
use crate::session::{self, Flash};
use super::redirect_with;

pub async fn serve_dashboard(
    State(state): State<AppState>,
    session: Session,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<Vec<(String, String)>>,
) -> AppResult<Response> {
    tracing::info!("Accessing dashboard for user: {}", user.username);

    // The session can outlive the account.
    if state.users.find_by_id(user.id).await?.is_none() {
        tracing::warn!("Session refers to missing user {}", user.id);
        session::sign_out(&session).await?;
        return redirect_with(&session, Flash::error("User not found. Please log in again."), "/login").await;
    }

    let query = SearchQuery::from_params(params);
    let search_query = query.search.trim();
    let tasks = state.tasks.list(user.id, Some(search_query)).await?;
    tracing::debug!("Listing {} tasks for {} (search: {:?})", tasks.len(), user.username, search_query);

    let flashes = session::take_flashes(&session).await?;
    let csrf_token = session::csrf_token(&session).await?;
    let offset = state.config.display_offset();

    render::page(&DashboardPage::from(DashboardView {
        user: &user,
        tasks: &tasks,
        search_query,
        flashes: &flashes,
        csrf_token: &csrf_token,
        offset: &offset,
    }))
}
