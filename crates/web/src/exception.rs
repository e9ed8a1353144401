//! An error that carries the HTTP response it should produce.

use http::StatusCode;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Application failure with a status code, a message and structured details.
///
/// Serializes to `{"status": 422, "error": "...", "errors": {...}, "extra": {...}}`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{status}: {message}")]
pub struct HttpException {
    status: StatusCode,
    message: String,
    errors: Map<String, Value>,
    extra: Map<String, Value>,
}

impl HttpException {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), errors: Map::new(), extra: Map::new() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn set_errors(mut self, errors: Map<String, Value>) -> Self {
        self.errors = errors;
        self
    }

    pub fn add_error(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.errors.insert(key.into(), value.into());
        self
    }

    pub fn set_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    pub fn add_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn errors(&self) -> &Map<String, Value> {
        &self.errors
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Uses the canonical reason phrase as message.
impl From<StatusCode> for HttpException {
    fn from(status: StatusCode) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("Unknown Status"))
    }
}

impl Serialize for HttpException {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HttpException", 4)?;
        state.serialize_field("status", &self.status.as_u16())?;
        state.serialize_field("error", &self.message)?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("extra", &self.extra)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serialize_shape() {
        let exception = HttpException::unprocessable("invalid input")
            .add_error("email", "is required")
            .add_error("age", json!(["too small"]))
            .add_extra("request_id", 42);

        assert_eq!(
            serde_json::to_value(&exception).unwrap(),
            json!({
                "status": 422,
                "error": "invalid input",
                "errors": {"email": "is required", "age": ["too small"]},
                "extra": {"request_id": 42}
            })
        );
    }

    #[test]
    fn setters_replace() {
        let mut errors = Map::new();
        errors.insert("a".into(), json!(1));
        let exception = HttpException::bad_request("bad").add_error("b", 2).set_errors(errors).set_extra(Map::new());

        assert_eq!(exception.errors().len(), 1);
        assert!(exception.errors().contains_key("a"));
        assert!(exception.extra().is_empty());
        assert_eq!(exception.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn display_and_from_status() {
        assert_eq!(HttpException::not_found("no such user").to_string(), "404 Not Found: no such user");

        let exception = HttpException::from(StatusCode::FORBIDDEN);
        assert_eq!(exception.message(), "Forbidden");
    }
}
