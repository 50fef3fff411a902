//! Implementation of the hello API. An API that greets whoever is named in the request body.

use crate::{
    core::greeting::greeting_service::{self, GreetingRequest, GreetingResponse},
    infra::{
        error::{ApiResult, InternalError},
        extract::Json,
        state::AppState,
    },
};
use axum::{extract::State, routing::post, Router};
use std::{future::Future, time::Duration};
use tracing::instrument;

/// The hello API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new().route("/sayHello", post(say_hello))
}

/// A handler for requests to the hello endpoint.
#[utoipa::path(
    post,
    path = "/api/v1/sayHello",
    tag = "Hello",
    request_body = GreetingRequest,
    responses(
        (status = 200, description = "Okay", body = GreetingResponse),
        (status = 400, description = "Invalid request", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal error", body = String, content_type = "text/plain"),
    )
)]
#[instrument(skip(state))]
pub async fn say_hello(
    State(state): State<AppState>,
    Json(request): Json<GreetingRequest>,
) -> ApiResult<Json<GreetingResponse>> {
    let deadline = state.config().greeting.timeout;
    let response = within(deadline, "greeting", async move {
        greeting_service::greet(request)
    })
    .await??;
    Ok(Json(response))
}

/// Runs `fut`, giving up once `deadline` has passed.
async fn within<F: Future>(
    deadline: Duration,
    operation: &'static str,
    fut: F,
) -> Result<F::Output, InternalError> {
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| InternalError::Timeout {
            operation,
            after: deadline,
        })
}
