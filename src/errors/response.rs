use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use crate::errors::AppError;
use crate::render::ErrorPage;

// Converts AppError into an HTML error page. Details go to the log, never to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                tracing::debug!("Responding with not-found page");
                error_page(StatusCode::NOT_FOUND, ErrorPage::not_found())
            }

            AppError::Csrf => {
                tracing::warn!("Rejected form submission with bad CSRF token");
                error_page(StatusCode::BAD_REQUEST, ErrorPage::bad_request())
            }

            // Anything else is unexpected: open transactions were already
            // rolled back when they were dropped.
            AppError::Session(e) => {
                tracing::error!("Session error: {}", e);
                server_error()
            }

            AppError::Store(e) => {
                tracing::error!("Unhandled store error: {}", e);
                server_error()
            }

            AppError::Template(e) => {
                tracing::error!("Template error: {}", e);
                server_error()
            }
        }
    }
}

fn server_error() -> Response {
    error_page(StatusCode::INTERNAL_SERVER_ERROR, ErrorPage::server_error())
}

fn error_page(status: StatusCode, page: ErrorPage<'_>) -> Response {
    match page.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            (
                status,
                Html(format!("<h1>{}</h1><p>{}</p>", status, page.message)),
            )
                .into_response()
        }
    }
}
