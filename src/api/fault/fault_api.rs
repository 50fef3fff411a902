//! An endpoint that always fails, for demonstrating how failures are handled.

use crate::infra::{
    config::FaultPolicy,
    error::{ApiResult, Fault, InternalError},
    state::AppState,
};
use axum::{extract::State, routing::get, Router};
use tracing::instrument;

/// The fault API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new().route("/force-panic", get(force_panic))
}

/// Raises a fault. Never succeeds.
///
/// With [`FaultPolicy::Recover`] the fault is returned as an internal error.
/// With [`FaultPolicy::Unwind`] the handler panics instead.
#[utoipa::path(
    get,
    path = "/api/v1/force-panic",
    tag = "Panic",
    responses(
        (status = 500, description = "Internal error", body = String, content_type = "text/plain"),
    )
)]
#[instrument(skip(state))]
pub async fn force_panic(State(state): State<AppState>) -> ApiResult<()> {
    match state.config().fault.policy {
        FaultPolicy::Recover => Err(InternalError::from(Fault::new(FORCED)).into()),
        FaultPolicy::Unwind => panic!("{FORCED}"),
    }
}

const FORCED: &str = "force panic";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{config::Config, error::ApiError};

    fn state(policy: FaultPolicy) -> State<AppState> {
        let mut config = Config::default();
        config.fault.policy = policy;
        State(AppState::new(config))
    }

    #[tokio::test]
    async fn recover_returns_fault() {
        let err = force_panic(state(FaultPolicy::Recover)).await.unwrap_err();
        let ApiError::InternalError(InternalError::Fault(fault)) = err else {
            panic!("expected a fault, got {err:?}");
        };
        assert_eq!("force panic", fault.message());
    }

    #[tokio::test]
    async fn unwind_panics() {
        let result = tokio::spawn(force_panic(state(FaultPolicy::Unwind))).await;
        assert!(result.unwrap_err().is_panic());
    }
}
