//! Application level helpers on top of `tern-http`.
//!
//! - [`session`]: sessions with flash and temporary values over a pluggable
//!   [`SessionHandler`](session::SessionHandler)
//! - [`cookie`]: prefixed cookies with shared defaults
//! - [`HttpException`]: an error that renders as a JSON error response
//! - [`Responder`]: conversion of handler results into a
//!   [`ResponseBuilder`](tern_http::response::ResponseBuilder)

mod exception;
mod responder;

pub mod cookie;
pub mod session;

pub use cookie::CookieConfig;
pub use cookie::CookieJar;
pub use exception::HttpException;
pub use responder::Json;
pub use responder::Responder;
pub use session::SessionConfig;
pub use session::SessionError;
pub use session::SessionHandler;
pub use session::SessionStore;
