//! Recipe service routes

use axum::{
    Json, Router,
    middleware,
    response::{IntoResponse, Redirect},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;

use crate::{AppState, middleware::require_login, session::KeyValueSessionStore};

pub mod auth;
pub mod recipes;
pub mod reviews;

/// Create the router for the recipe service
pub fn create_router(
    state: AppState,
    sessions: SessionManagerLayer<KeyValueSessionStore>,
) -> Router {
    let protected = Router::new()
        .route("/add-recipe", get(recipes::add_form).post(recipes::add))
        .route("/profile", get(auth::profile))
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/search-recipes", get(recipes::search))
        .route(
            "/edit-recipe/:id",
            get(recipes::edit_form).post(recipes::edit),
        )
        .route(
            "/delete-recipe/:id",
            get(recipes::delete_confirm).post(recipes::delete),
        )
        .route("/recipes/:id/reviews", get(reviews::list))
        .route(
            "/recipes/:id/reviews/add",
            get(reviews::add_form).post(reviews::add),
        )
        .route(
            "/recipes/:id/reviews/:review_id",
            get(reviews::edit_form).post(reviews::edit),
        )
        .route(
            "/recipes/:id/reviews/:review_id/delete",
            get(reviews::delete),
        )
        .route(
            "/users/create",
            get(auth::register_form).post(auth::register),
        )
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout_form).post(auth::logout))
        .merge(protected)
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> Redirect {
    Redirect::to("/search-recipes")
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "recipes"
    }))
}
