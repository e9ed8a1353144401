//! A small HTTP message layer for CGI style request handling.
//!
//! One process (or one call) handles one request: a [`RequestContext`](request::RequestContext)
//! is built once from an explicit environment snapshot, a
//! [`ResponseBuilder`](response::ResponseBuilder) collects status, headers,
//! cookies and a body, and emits them through a [`Transport`](transport::Transport).
//!
//! # Example
//!
//! ```no_run
//! use tern_http::request::RequestContext;
//! use tern_http::response::ResponseBuilder;
//! use tern_http::transport::IoTransport;
//!
//! let request = RequestContext::from_process().unwrap();
//! let mut response = ResponseBuilder::new(&request);
//!
//! let name = request.query_param("name").unwrap_or("world");
//! response.set_content_type("text", "UTF-8").set_body(format!("Hello {name}!"));
//!
//! let mut transport = IoTransport::new(std::io::stdout().lock());
//! response.emit(&mut transport, None).unwrap();
//! ```
//!
//! # Architecture
//!
//! - [`stream`]: [`ByteStream`](stream::ByteStream), a capability checked byte source over
//!   memory, files or any reader
//! - [`header`]: canonical, multi-value header storage
//! - [`request`]: the request snapshot and its lazily parsed data
//! - [`response`]: the response builder and its emission pipeline
//! - [`transport`]: where emitted responses go
//! - [`protocol`]: status reasons, mime aliases, dates and the error types
//!
//! # Error Handling
//!
//! - [`protocol::StreamError`]: byte stream capability violations and io failures
//! - [`protocol::ParseError`]: request data parsing errors
//! - [`protocol::SendError`]: response emission errors
//! - [`protocol::HttpError`]: top-level error type
//!
//! Emitting a response after headers went out is not an error: the headers
//! are skipped and only the body is written.

pub mod header;
pub mod protocol;
pub mod request;
pub mod response;
pub mod stream;
pub mod transport;

mod utils;
pub(crate) use utils::ensure;
