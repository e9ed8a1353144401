//! Inbound request data.
//!
//! - [`Environment`]: the raw snapshot a request is built from
//! - [`RequestContext`]: read-only accessors over it, with lazily parsed and
//!   cached query, form, json, upload and cookie data
//! - [`Params`] / [`FileField`]: the parsed representations

mod context;
mod environment;
mod params;

pub use context::CLI_METHOD;
pub use context::RequestContext;
pub use environment::Environment;
pub use params::FileField;
pub use params::Params;
pub use params::RawUpload;
pub use params::UploadedFile;
