//! Middleware for modifying requests and responses.

use crate::infra::error::{ApiError, ClientError, InternalError};
use axum::{body::Body, middleware::Next, response::IntoResponse};
use bytes::Bytes;
use http::{HeaderMap, Request, Response};
use http_body_util::BodyExt;
use hyper::body::Body as _;
use tower_http::trace::MakeSpan;

static X_REQUEST_ID: &str = "x-request-id";
static X_REAL_IP: &str = "x-real-ip";
static X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Creates a span per request carrying its id and the client's address.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct MakeRequestIdSpan;

impl<B> MakeSpan<B> for MakeRequestIdSpan {
    fn make_span(&mut self, request: &Request<B>) -> tracing::Span {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|id| id.to_str().ok())
            .unwrap_or("unknown");
        let real_ip = real_ip(request.headers()).unwrap_or("unknown");
        tracing::info_span!(
            "request",
            request_id = request_id,
            real_ip = real_ip,
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
        )
    }
}

/// The client's address as reported by a proxy in front of us.
///
/// `X-Real-IP` wins over the first entry of `X-Forwarded-For`.
pub(crate) fn real_ip(headers: &HeaderMap) -> Option<&str> {
    first_value(headers, X_REAL_IP).or_else(|| first_value(headers, X_FORWARDED_FOR))
}

fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// The maximum size of a body to log.
const MAX_BODY_SIZE: u64 = 8192;

/// Log small request and response bodies.
pub(crate) async fn log_request_response(
    req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let (parts, body) = req.into_parts();
    let req = if fits_in_log(&body) {
        let body_bytes = buffer_and_print("Request", body).await?;
        Request::from_parts(parts, Body::from(body_bytes))
    } else {
        Request::from_parts(parts, body)
    };

    let res = next.run(req).await;

    let (parts, body) = res.into_parts();
    let res = if fits_in_log(&body) {
        let body_bytes = buffer_and_print("Response", body).await?;
        Response::from_parts(parts, Body::from(body_bytes))
    } else {
        Response::from_parts(parts, body)
    };

    Ok(res)
}

fn fits_in_log(body: &Body) -> bool {
    match body.size_hint().upper() {
        Some(n) => n <= MAX_BODY_SIZE,
        None => false,
    }
}

/// Read the entire body stream and store it in memory.
async fn buffer_and_print(direction: &'static str, body: Body) -> Result<Bytes, ApiError> {
    let body: Bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if direction == "Request" => {
            return Err(ClientError::BadRequest(format!("failed to read body: {e}")).into())
        }
        Err(e) => {
            return Err(InternalError::Other(format!("failed to read {direction} body: {e}")).into())
        }
    };

    if let Ok(body) = std::str::from_utf8(&body) {
        tracing::trace!("{} body = {:?}", direction, body);
    }

    Ok(body)
}
