//! The axum application and its server.
//!
//! # Examples
//!
//! Health check.
//!
//! ```rust
//! # tokio_test::block_on(async {
//! # let url = say_hello::app::spawn_app(Default::default()).await;
//! let response = reqwest::get(format!("{url}/healthz")).await.unwrap();
//! assert_eq!(200, response.status());
//! assert_eq!("healthy", response.json::<String>().await.unwrap());
//! # });
//! ```
//!
//! Say hello.
//!
//! ```rust
//! # use say_hello::core::greeting::greeting_service::{GreetingRequest, GreetingResponse};
//! # tokio_test::block_on(async {
//! # let url = say_hello::app::spawn_app(Default::default()).await;
//! let client = reqwest::Client::new();
//! let response = client
//!     .post(format!("{url}/api/v1/sayHello"))
//!     .json(&GreetingRequest::new("Foo"))
//!     .send()
//!     .await
//!     .unwrap();
//! assert_eq!(200, response.status());
//! let greeting = response.json::<GreetingResponse>().await.unwrap();
//! assert_eq!(GreetingResponse::new("Hello, Foo!".to_string()), greeting);
//! # });
//! ```

use crate::infra::{
    config::Config,
    error::{handle_middleware_error, ClientError, PanicHandler},
    extract::Json,
    middleware::{log_request_response, MakeRequestIdSpan},
    openapi::ApiDoc,
    shutdown::shutdown_signal,
    state::AppState,
};
use axum::{error_handling::HandleErrorLayer, routing::get, Router};
use http::{header::AUTHORIZATION, header::LINK, Method};
use std::{iter, time::Duration};
use tokio::net::TcpListener;
use tower::{limit::GlobalConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

/// Permits every origin, method and header, credentials included.
///
/// Origins and headers are mirrored from the request, since a literal `*`
/// cannot be combined with credentials.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([LINK])
        .max_age(Duration::from_secs(300))
}

/// Constructs the full axum application.
pub fn app(state: AppState) -> Router {
    let request_timeout = state.config().server.request_timeout;
    let concurrency_limit = state.config().server.concurrency_limit;

    // Fallible middleware from tower, mapped to infallible response with [`HandleErrorLayer`].
    let tower_middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .load_shed()
        .layer(GlobalConcurrencyLimitLayer::new(concurrency_limit));

    let middleware = ServiceBuilder::new()
        .layer(SetSensitiveRequestHeadersLayer::new(iter::once(
            AUTHORIZATION,
        )))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(MakeRequestIdSpan)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(()),
        )
        .layer(axum::middleware::from_fn(log_request_response))
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .route("/api-doc/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .merge(crate::api::api(state))
        .fallback(|| async { ClientError::NotFound })
        .layer(middleware)
        .layer(tower_middleware)
        .layer(CatchPanicLayer::custom(PanicHandler))
        // Outermost, so that every response, panics included, carries CORS headers.
        .layer(cors())
}

/// Serves the application on an already bound listener until ctrl-c is pressed.
pub async fn run_app(listener: TcpListener, config: Config) -> std::io::Result<()> {
    let app = app(AppState::new(config)).into_make_service();

    tracing::info!("Starting axum on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Successfully shut down");
    Ok(())
}

/// Binds the configured address and serves the application.
pub async fn serve(config: Config) -> std::io::Result<()> {
    let address = format!("{}:{}", config.server.http_address, config.server.http_port);
    let listener = TcpListener::bind(&address).await?;
    run_app(listener, config).await
}

/// Spawn a server on a random port, returning its base url.
pub async fn spawn_app(config: Config) -> String {
    let address = "127.0.0.1";
    let listener = TcpListener::bind(format!("{address}:0")).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(run_app(listener, config));
    format!("http://{address}:{port}")
}
