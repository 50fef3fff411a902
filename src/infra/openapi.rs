//! OpenAPI configuration.

use crate::api::{fault::fault_api, health::health_api, hello::hello_api};
use crate::core::greeting::greeting_service;
use utoipa::OpenApi;

/// OpenApi configuration.
#[derive(OpenApi)]
#[openapi(
    info(title = "Say Hello API", version = "1.0.0"),
    paths(
        health_api::healthz,
        hello_api::say_hello,
        fault_api::force_panic,
    ),
    components(
        schemas(
            greeting_service::GreetingRequest,
            greeting_service::GreetingResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Hello", description = "Greetings"),
        (name = "Panic", description = "Failure demonstration"),
    )
)]
#[derive(Clone, Copy, Debug)]
pub struct ApiDoc;
