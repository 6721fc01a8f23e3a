pub mod auth;
pub mod messages;
pub mod middleware;
pub mod state;
pub mod users;

pub use state::AppState;

use std::time::Duration;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/update", put(users::update_profile))
        .route("/api/messages/:peer_id", get(messages::get_conversation))
        .route("/api/messages/send/:receiver_id", post(messages::send_message))
        .route("/api/messages/delete/:id", delete(messages::delete_message))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        // Health check
        .route("/api/health", get(health))
        // Authentication endpoints
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        // Everything behind the session cookie
        .merge(protected)
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_secs,
        )))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
