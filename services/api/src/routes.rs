//! API routes
//!
//! The whole resource surface hangs off `/api/v1`. Everything except the
//! health check and login runs behind the authentication middleware.

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde_json::json;

use crate::middleware::auth_middleware;
use crate::state::AppState;

pub mod answers;
pub mod auth;
pub mod customers;
pub mod events;
pub mod groups;
pub mod images;
pub mod recaps;
pub mod surveys;
pub mod users;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/logout", post(auth::logout))
        .route("/users", post(users::create_user))
        .route("/users/me", get(users::me))
        .route("/users/:uuid", patch(users::update_user))
        .route("/users/:uuid/close", delete(users::close_user))
        .nest("/groups", groups::router())
        .nest("/events", events::router())
        .nest("/survey", surveys::router())
        .nest("/answers", answers::router())
        .nest("/recaps", recaps::router())
        .nest("/customers", customers::router())
        .nest("/images", images::router())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .route("/login", post(auth::login))
        .merge(protected);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}
