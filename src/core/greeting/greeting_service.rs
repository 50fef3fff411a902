//! A service for greeting someone.
//!
//! The service takes a [`GreetingRequest`], validates it and turns it into a
//! [`GreetingResponse`]. It never blocks and never suspends, so callers that
//! want a deadline enforce it themselves.

use crate::infra::validation::Valid;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::instrument;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

/// A request to be greeted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct GreetingRequest {
    /// The name of the one to greet.
    #[schema(example = "John Doe")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "name is required"),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
}

impl GreetingRequest {
    /// Constructs a request for the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Whitespace-only names are treated the same as empty ones.
fn not_blank(name: &str) -> Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        return Err(validator::ValidationError::new("blank")
            .with_message(Cow::Borrowed("name must not be empty")));
    }
    Ok(())
}

/// A greeting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GreetingResponse {
    /// A personal greeting.
    #[schema(example = "Hello, John Doe!")]
    message: String,
}

impl GreetingResponse {
    /// Constructs a new greeting.
    pub fn new(message: String) -> Self {
        Self { message }
    }

    /// Returns the greeting.
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }
}

/// The caller sent a request that cannot be greeted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ValidationError {
    reason: String,
}

impl ValidationError {
    /// A human-readable description of what was wrong.
    pub fn reason(&self) -> &str {
        self.reason.as_ref()
    }
}

impl From<ValidationErrors> for ValidationError {
    fn from(e: ValidationErrors) -> Self {
        let mut fields: Vec<_> = e.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        let reason = fields
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} ({})", e.code),
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        Self { reason }
    }
}

/// Returns a greeting based on someone's name.
#[instrument(ret, err(level = "debug"))]
pub fn greet(request: GreetingRequest) -> Result<GreetingResponse, ValidationError> {
    let request = Valid::new(request)?.into_inner();
    let name = request.name.unwrap_or_default();
    Ok(GreetingResponse::new(format!("Hello, {name}!")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greets_by_name() {
        let response = greet(GreetingRequest::new("John Doe")).unwrap();
        assert_eq!("Hello, John Doe!", response.message());
    }

    #[test]
    fn greeting_wraps_any_non_blank_name() {
        for name in ["a", "World", " padded ", "Zoë", "名前", "O'Brien", "!"] {
            let response = greet(GreetingRequest::new(name)).unwrap();
            assert_eq!(format!("Hello, {name}!"), response.message());
        }
    }

    #[test]
    fn missing_name_is_rejected() {
        let err = greet(GreetingRequest::default()).unwrap_err();
        assert_eq!("name is required", err.reason());
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = greet(GreetingRequest::new("")).unwrap_err();
        assert_eq!("name must not be empty", err.reason());
    }

    #[test]
    fn whitespace_name_is_rejected() {
        for name in [" ", "   ", "\t", "\n \t"] {
            assert!(greet(GreetingRequest::new(name)).is_err(), "{name:?}");
        }
    }

    #[test]
    fn derived_validation_reports_codes() {
        let code = |request: GreetingRequest| {
            let errors = request.validate().unwrap_err();
            errors.field_errors().get("name").unwrap()[0].code.to_string()
        };
        assert_eq!("required", code(GreetingRequest::default()));
        assert_eq!("blank", code(GreetingRequest::new(" \t")));
        assert!(GreetingRequest::new("Foo").validate().is_ok());
    }

    #[test]
    fn request_without_name_deserializes() {
        let request: GreetingRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(GreetingRequest::default(), request);
    }

    #[test]
    fn response_serialization_is_stable() {
        let response = greet(GreetingRequest::new("John Doe")).unwrap();
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(r#"{"message":"Hello, John Doe!"}"#, json);

        let decoded: GreetingResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(json, serde_json::to_string(&decoded).unwrap());
    }
}
