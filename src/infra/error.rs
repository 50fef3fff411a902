//! Types for reporting errors that happened during a request.
//!
//! Every error becomes a plain-text response. Client errors carry their
//! message to the caller, internal errors carry a short description and are
//! logged.

use crate::core::greeting::greeting_service::ValidationError;
use axum::{
    extract::rejection::BytesRejection,
    response::{IntoResponse, Response},
    BoxError,
};
use http::StatusCode;
use std::{any::Any, backtrace::Backtrace, fmt, time::Duration};
use tower_http::catch_panic::ResponseForPanic;
use tracing_error::SpanTrace;

/// An error from our API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An error caused by the client.
    #[error("{0}")]
    ClientError(#[from] ClientError),
    /// An internal error.
    #[error("{0}")]
    InternalError(#[from] InternalError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ClientError(e) => {
                tracing::debug!("client error: {}", e);
                e.into_response()
            }
            ApiError::InternalError(e) => {
                e.log();
                e.into_response()
            }
        }
    }
}

/// The result of calling API-related functions.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::ClientError(ClientError::BadRequest(e.reason().to_string()))
    }
}

/// Errors caused by the client.
/// The client can do something to fix these.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Input validation failed, or the body could not be decoded.
    #[error("{0}")]
    BadRequest(String),
    /// The resource was not found.
    #[error("not found")]
    NotFound,
    /// Custom error.
    #[error("{1}")]
    Custom(StatusCode, String),
}

impl Default for ClientError {
    fn default() -> Self {
        Self::BadRequest("Bad Request".to_string())
    }
}

impl From<BytesRejection> for ClientError {
    fn from(value: BytesRejection) -> Self {
        ClientError::Custom(value.status(), value.body_text())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(value: serde_json::Error) -> Self {
        ClientError::BadRequest(value.to_string())
    }
}

impl IntoResponse for ClientError {
    fn into_response(self) -> Response {
        let msg = self.to_string();
        let status = match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Custom(status, _) => status,
        };
        (status, msg).into_response()
    }
}

/// A deliberately raised failure.
///
/// Remembers the spans and the stack it was raised in, so that it can be
/// logged with them.
#[derive(Debug)]
pub struct Fault {
    message: String,
    span_trace: SpanTrace,
    backtrace: Backtrace,
}

impl Fault {
    /// Raises a fault here.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span_trace: SpanTrace::capture(),
            backtrace: Backtrace::force_capture(),
        }
    }

    /// What went wrong.
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    /// The spans that were active when the fault was raised.
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// The stack at the point the fault was raised.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fault: {}", self.message)
    }
}

impl std::error::Error for Fault {}

/// An internal error.
/// The client cannot do anything about this.
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    /// A call did not finish before its deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// What was being done.
        operation: &'static str,
        /// The deadline that passed.
        after: Duration,
    },
    /// A handler raised a fault.
    #[error("{0}")]
    Fault(#[from] Fault),
    /// A handler panicked.
    #[error("panic: {0}")]
    Panic(String),
    /// Other miscellaneous errors.
    #[error("{0}")]
    Other(String),
}

impl InternalError {
    /// Logs the error, with the traces of a fault when there is one.
    fn log(&self) {
        match self {
            Self::Fault(fault) => tracing::error!(
                span_trace = %fault.span_trace(),
                backtrace = %fault.backtrace(),
                "internal error: {}",
                fault
            ),
            e => tracing::error!("internal error: {}", e),
        }
    }
}

impl IntoResponse for InternalError {
    fn into_response(self) -> Response {
        let msg = match self {
            Self::Timeout { .. } => "request timed out",
            _ => "internal error",
        };
        (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
    }
}

/// A handler for converting panics into proper responses for the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanicHandler;

impl ResponseForPanic for PanicHandler {
    type ResponseBody = axum::body::Body;

    fn response_for_panic(
        &mut self,
        err: Box<dyn Any + Send + 'static>,
    ) -> http::Response<Self::ResponseBody> {
        ApiError::InternalError(InternalError::Panic(panic_message(err.as_ref()))).into_response()
    }
}

/// Maps errors from fallible tower middleware to a response.
pub(crate) async fn handle_middleware_error(e: BoxError) -> Response {
    ApiError::InternalError(InternalError::Other(format!("Tower middleware failed: {e}")))
        .into_response()
}

/// Extracts the message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
