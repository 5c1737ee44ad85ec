mod accounts;
mod cards;
mod categories;
mod coupons;
mod entries;
mod plans;
mod session;
mod users;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::server::state::ServeState;

pub fn build_router(state: ServeState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/livez", get(livez))
        .route("/readyz", get(readyz))
        .nest("/api/session", session::router())
        .nest("/api/users", users::router())
        .nest("/api/accounts", accounts::router())
        .nest("/api/cards", cards::router())
        .nest("/api/categories", categories::router())
        .nest("/api/entries", entries::router())
        .nest("/api/coupons", coupons::router())
        .nest("/api/plans", plans::router())
        .fallback(fallback)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<ServeState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.health.uptime_secs(),
    }))
}

async fn livez() -> impl IntoResponse {
    Json(json!({"alive": true}))
}

async fn readyz(State(state): State<ServeState>) -> impl IntoResponse {
    if state.health.is_ready() {
        (StatusCode::OK, Json(json!({"ready": true})))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"ready": false})))
    }
}

async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"success": false, "message": "Resource not found."})),
    )
}
