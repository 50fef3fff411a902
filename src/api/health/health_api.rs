//! The health check.

use crate::infra::{extract::Json, state::AppState};
use axum::{routing::get, Router};

/// The health check endpoints.
pub fn routes() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Reports that the service is up.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Health",
    responses(
        (status = 200, description = "Healthy", body = String, example = json!("healthy")),
    )
)]
pub async fn healthz() -> Json<&'static str> {
    Json("healthy")
}

#[cfg(test)]
mod tests {
    use super::healthz;

    #[tokio::test]
    async fn always_healthy() {
        assert_eq!("healthy", healthz().await.0);
    }
}
