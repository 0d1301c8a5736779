//! HTTP API surface.

pub mod dashboard;
pub mod events;
pub mod health;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .nest("/api/dashboard", dashboard::router())
        .route("/api/events", get(events::stream))
        .route("/api/health", get(health::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
