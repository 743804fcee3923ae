//! Route guards

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::debug;

use crate::{error::AppError, session::current_user};

/// Only let requests through when the session carries a logged-in user.
/// Anonymous visitors are sent to the login page.
pub async fn require_login(session: Session, req: Request<Body>, next: Next) -> Response {
    match current_user(&session).await {
        Ok(Some(_)) => next.run(req).await,
        Ok(None) => {
            debug!("Anonymous request to {}, redirecting to login", req.uri().path());
            Redirect::to("/login").into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}
