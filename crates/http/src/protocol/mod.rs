//! Protocol level building blocks shared by requests and responses.
//!
//! - **Lookup tables**: [`StatusReasons`] maps status codes to reason phrases and
//!   [`MimeTypes`] maps short aliases to mime types. Both are immutable,
//!   process wide services built once on first use.
//! - **Dates** ([`date`]): RFC 1123 formatting for `Expires`, `Last-Modified` and
//!   cookie expiry.
//! - **Error Handling** ([`error`]): the error taxonomy of the crate
//!   - [`HttpError`]: Top-level error type
//!   - [`StreamError`]: Byte stream capability and io failures
//!   - [`ParseError`]: Request data parsing errors
//!   - [`SendError`]: Response emission errors

pub mod date;

mod status;
pub use status::StatusReasons;
pub use status::UNKNOWN_STATUS;

mod mime_types;
pub use mime_types::MimeTypes;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
pub use error::StreamError;
pub use error::StreamOp;
