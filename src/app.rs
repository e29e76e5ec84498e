use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tower_sessions::cookie::{time::Duration, SameSite};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::errors::StoreResult;
use crate::services::{TaskService, UserService};
use crate::{handlers, middleware};

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub tasks: TaskService,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(pool: SqlitePool, config: Config) -> StoreResult<Self> {
        Ok(Self {
            users: UserService::new(pool.clone(), config.auth.bcrypt_cost).await?,
            tasks: TaskService::new(pool),
            config: Arc::new(config),
        })
    }
}

pub fn build_router(state: AppState) -> Result<Router, config::ConfigError> {
    let session_config = &state.config.session;
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(session_config.secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_name("session")
        .with_expiry(Expiry::OnInactivity(Duration::minutes(session_config.inactivity_minutes)))
        .with_signed(state.config.session_key()?);

    // Everything here requires a signed-in user
    let protected = Router::new()
        .route("/logout", get(handlers::handle_logout))
        .route("/dashboard", get(handlers::serve_dashboard))
        .route("/add_task", post(handlers::add_task))
        .route(
            "/edit_task/:task_id",
            get(handlers::serve_edit_task).post(handlers::handle_edit_task),
        )
        .route("/toggle_task/:task_id", post(handlers::toggle_task))
        .route("/delete_task/:task_id", post(handlers::delete_task))
        .route_layer(from_fn(middleware::require_auth));

    let max_body_bytes = state.config.server.max_body_bytes;

    let app = Router::new()
        .route("/", get(handlers::serve_index))
        .route(
            "/register",
            get(handlers::serve_register_page).post(handlers::handle_register),
        )
        .route(
            "/login",
            get(handlers::serve_login_page).post(handlers::handle_login),
        )
        .merge(protected)
        .nest_service("/static", ServeDir::new("static"))
        .fallback(handlers::not_found)
        .layer(session_layer)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state);

    Ok(app)
}
