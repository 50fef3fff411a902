//! The HTTP API.

use crate::infra::state::AppState;
use axum::Router;

pub mod fault;
pub mod health;
pub mod hello;

/// Routes versioned under `/api/v1`.
pub fn v1() -> Router<AppState> {
    Router::new()
        .merge(hello::hello_api::routes())
        .merge(fault::fault_api::routes())
}

/// Constructs the full API.
pub fn api(state: AppState) -> Router {
    Router::new()
        .merge(health::health_api::routes())
        .nest("/api/v1", v1())
        .with_state(state)
}
