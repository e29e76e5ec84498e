use axum::{
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    extract::Request,
};
use tower_sessions::Session;

use crate::session::{self, Flash};

/// Gate for protected routes. Resolves the signed-in user from the session
/// and hands it to the handler as an `Extension<CurrentUser>`; anonymous
/// requests are sent to the login page with a notice.
pub async fn require_auth(
    session: Session,
    mut req: Request,
    next: Next,
) -> Response {
    match session::current_user(&session).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => {
            tracing::debug!("Anonymous request to {} redirected to login", req.uri().path());
            if let Err(e) = session::push_flash(&session, Flash::error("Please log in to access this page.")).await {
                return e.into_response();
            }
            Redirect::to("/login").into_response()
        }
        Err(e) => e.into_response(),
    }
}
