use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::app::AppState;
use crate::errors::{AppResult, StoreError};
use crate::models::{LoginForm, RegisterForm};
use crate::render::{self, LoginPage, RegisterPage};
use crate::session::{self, Flash};
use crate::validation::{validate_password, validate_username};
use super::redirect_with;

// Renders the register form with queued notices plus an optional inline error.
async fn register_form(session: &Session, error: Option<String>, username: &str) -> AppResult<Response> {
    let mut flashes = session::take_flashes(session).await?;
    flashes.extend(error.map(Flash::error));
    let csrf_token = session::csrf_token(session).await?;
    render::page(&RegisterPage {
        user: None,
        flashes: &flashes,
        csrf_token: &csrf_token,
        username,
    })
}

async fn login_form(session: &Session, error: Option<String>, username: &str) -> AppResult<Response> {
    let mut flashes = session::take_flashes(session).await?;
    flashes.extend(error.map(Flash::error));
    let csrf_token = session::csrf_token(session).await?;
    render::page(&LoginPage {
        user: None,
        flashes: &flashes,
        csrf_token: &csrf_token,
        username,
    })
}

pub async fn serve_register_page(session: Session) -> AppResult<Response> {
    if session::current_user(&session).await?.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    register_form(&session, None, "").await
}

// First failing check wins, in the order the form is read.
fn registration_problem(username: &str, form: &RegisterForm) -> Option<String> {
    if username.is_empty() {
        return Some("Username is required.".into());
    }
    if form.password.is_empty() {
        return Some("Password is required.".into());
    }
    if let Err(e) = validate_username(username) {
        return Some(e.message().to_string());
    }
    if let Err(e) = validate_password(&form.password) {
        return Some(e.message().to_string());
    }
    if form.password != form.confirm_password {
        return Some("Passwords do not match.".into());
    }
    None
}

pub async fn handle_register(
    State(state): State<AppState>,
    session: Session,
    Form(register_form_data): Form<RegisterForm>,
) -> AppResult<Response> {
    session::verify_csrf(&session, &register_form_data.csrf_token).await?;
    if session::current_user(&session).await?.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let username = register_form_data.username.trim();
    if let Some(problem) = registration_problem(username, &register_form_data) {
        tracing::debug!("Registration rejected: {}", problem);
        return register_form(&session, Some(problem), username).await;
    }

    match state.users.register(username, &register_form_data.password).await {
        Ok(_) => {
            redirect_with(&session, Flash::success("Registration successful! Please log in."), "/login").await
        }
        Err(StoreError::DuplicateUsername(_)) => {
            tracing::info!("Registration attempt for taken username {}", username);
            register_form(
                &session,
                Some("Username already exists. Please choose a different one.".into()),
                username,
            )
            .await
        }
        Err(StoreError::Validation(e)) => {
            register_form(&session, Some(e.message().to_string()), username).await
        }
        Err(e) if e.is_transient() => {
            tracing::error!("Failed to register {}: {}", username, e);
            register_form(
                &session,
                Some("An error occurred during registration. Please try again.".into()),
                username,
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn serve_login_page(session: Session) -> AppResult<Response> {
    if session::current_user(&session).await?.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    login_form(&session, None, "").await
}

#[axum::debug_handler]
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(login_form_data): Form<LoginForm>,
) -> AppResult<Response> {
    session::verify_csrf(&session, &login_form_data.csrf_token).await?;
    if session::current_user(&session).await?.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let username = login_form_data.username.trim();
    if username.is_empty() || login_form_data.password.is_empty() {
        return login_form(&session, Some("Username and password are required.".into()), username).await;
    }

    match state.users.authenticate(username, &login_form_data.password).await {
        Ok(Some(user)) => {
            session::sign_in(&session, &user).await?;
            tracing::info!("User {} logged in", user.username);
            redirect_with(
                &session,
                Flash::success(format!("Welcome back, {}!", user.username)),
                "/dashboard",
            )
            .await
        }
        Ok(None) => {
            tracing::warn!("Failed login attempt for {}", username);
            login_form(&session, Some("Invalid username or password.".into()), username).await
        }
        Err(e) if e.is_transient() => {
            tracing::error!("Login failed for {}: {}", username, e);
            login_form(
                &session,
                Some("An error occurred during login. Please try again.".into()),
                username,
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn handle_logout(session: Session) -> AppResult<Response> {
    if let Some(user) = session::current_user(&session).await? {
        tracing::info!("User {} logged out", user.username);
    }
    session::sign_out(&session).await?;
    redirect_with(&session, Flash::success("You have been logged out successfully."), "/").await
}
