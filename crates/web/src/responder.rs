//! Conversion of handler results into responses.
//!
//! The [`Responder`] trait defines how a value fills a [`ResponseBuilder`]:
//! strings become `text/plain` bodies, [`Json`] serializes its content,
//! errors set their status code. Wrappers such as `Result`, `Option` and
//! `(StatusCode, T)` compose.

use std::convert::Infallible;

use http::StatusCode;
use serde::Serialize;
use tern_http::protocol::ParseError;
use tern_http::request::RequestContext;
use tern_http::response::ResponseBuilder;
use tracing::{error, warn};

use crate::exception::HttpException;

/// A value that can be turned into a response.
pub trait Responder {
    fn respond_to(self, response: &mut ResponseBuilder<'_>);

    /// Builds a fresh response for `request` from this value.
    fn into_response(self, request: &RequestContext) -> ResponseBuilder<'_>
    where
        Self: Sized,
    {
        let mut response = ResponseBuilder::new(request);
        self.respond_to(&mut response);
        response
    }
}

/// Serializes `T` as an `application/json` body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T: Responder, E: Responder> Responder for Result<T, E> {
    fn respond_to(self, response: &mut ResponseBuilder<'_>) {
        match self {
            Ok(t) => t.respond_to(response),
            Err(e) => e.respond_to(response),
        }
    }
}

/// `None` leaves the response empty.
impl<T: Responder> Responder for Option<T> {
    fn respond_to(self, response: &mut ResponseBuilder<'_>) {
        if let Some(t) = self {
            t.respond_to(response);
        }
    }
}

impl<T: Responder> Responder for (StatusCode, T) {
    fn respond_to(self, response: &mut ResponseBuilder<'_>) {
        let (status, responder) = self;
        responder.respond_to(response);
        response.set_status(status);
    }
}

impl<T: Responder> Responder for (T, StatusCode) {
    fn respond_to(self, response: &mut ResponseBuilder<'_>) {
        let (responder, status) = self;
        (status, responder).respond_to(response);
    }
}

impl<T: Responder> Responder for Box<T> {
    fn respond_to(self, response: &mut ResponseBuilder<'_>) {
        (*self).respond_to(response);
    }
}

impl Responder for () {
    fn respond_to(self, _response: &mut ResponseBuilder<'_>) {}
}

impl Responder for &'static str {
    fn respond_to(self, response: &mut ResponseBuilder<'_>) {
        response.set_mime(&mime::TEXT_PLAIN_UTF_8).set_body(self);
    }
}

impl Responder for String {
    fn respond_to(self, response: &mut ResponseBuilder<'_>) {
        response.set_mime(&mime::TEXT_PLAIN_UTF_8).set_body(self);
    }
}

impl<T: Serialize> Responder for Json<T> {
    fn respond_to(self, response: &mut ResponseBuilder<'_>) {
        match serde_json::to_vec(&self.0) {
            Ok(body) => {
                response.set_mime(&mime::APPLICATION_JSON).set_body(body);
            }
            Err(e) => {
                error!(cause = %e, "failed to serialize json response");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").respond_to(response);
            }
        }
    }
}

impl Responder for HttpException {
    fn respond_to(self, response: &mut ResponseBuilder<'_>) {
        let status = self.status();
        (status, Json(self)).respond_to(response);
    }
}

impl Responder for ParseError {
    fn respond_to(self, response: &mut ResponseBuilder<'_>) {
        warn!(cause = %self, "bad request data");
        let message = match self {
            ParseError::InvalidQuery { .. } => "invalid query string",
            ParseError::InvalidForm { .. } => "invalid form body",
            ParseError::InvalidJson { .. } => "invalid json body",
            ParseError::Io { .. } => "unable to read request body",
        };
        (StatusCode::BAD_REQUEST, message).respond_to(response);
    }
}

impl Responder for Infallible {
    fn respond_to(self, _response: &mut ResponseBuilder<'_>) {
        match self {}
    }
}
