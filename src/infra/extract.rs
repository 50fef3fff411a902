//! Custom axum extractors.

use super::error::ClientError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    response::IntoResponse,
};
use serde::{de::DeserializeOwned, Serialize};

/// A custom JSON extractor since axum's does not let us customize the response.
///
/// Unlike axum's, this one does not require a `Content-Type` header, and every
/// decoding failure is a `400 Bad Request`. Failing to read the body keeps the
/// status axum gives it, such as `413 Payload Too Large`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> AsRef<T> for Json<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ClientError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(Json(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> axum::response::Response {
        axum::extract::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::greeting::greeting_service::GreetingRequest;
    use axum::body::Body;
    use http::StatusCode;

    async fn extract(body: impl Into<Body>) -> Result<Json<GreetingRequest>, ClientError> {
        let req = http::Request::post("/").body(body.into()).unwrap();
        Json::from_request(req, &()).await
    }

    #[tokio::test]
    async fn decodes_without_content_type() {
        let Json(request) = extract(r#"{"name":"Foo"}"#).await.unwrap();
        assert_eq!(GreetingRequest::new("Foo"), request);
    }

    #[tokio::test]
    async fn empty_body_is_bad_request() {
        let err = extract("").await.unwrap_err();
        assert_eq!(StatusCode::BAD_REQUEST, err.into_response().status());
    }

    #[tokio::test]
    async fn wrong_type_is_bad_request() {
        let err = extract(r#"{"name": 42}"#).await.unwrap_err();
        assert!(matches!(err, ClientError::BadRequest(_)));
    }

    #[tokio::test]
    async fn oversized_body_is_payload_too_large() {
        let name = "a".repeat(3 * 1024 * 1024);
        let err = extract(format!(r#"{{"name":"{name}"}}"#)).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Custom(status, _) if status == StatusCode::PAYLOAD_TOO_LARGE
        ));
        assert_eq!(StatusCode::PAYLOAD_TOO_LARGE, err.into_response().status());
    }
}
