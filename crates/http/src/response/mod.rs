//! Outgoing responses.
//!
//! A [`ResponseBuilder`] collects a status, headers, cookies and a
//! [`ByteStream`] body, then emits them through a [`Transport`]:
//!
//! ```
//! use tern_http::request::{Environment, RequestContext};
//! use tern_http::response::ResponseBuilder;
//! use tern_http::transport::IoTransport;
//!
//! let request = RequestContext::new(Environment::new().with_server("SERVER_PROTOCOL", "HTTP/1.1"));
//! let mut response = ResponseBuilder::new(&request);
//! response.set_status_code(201, None).set_content_type("json", "UTF-8").set_body(r#"{"id":1}"#);
//!
//! let mut transport = IoTransport::new(Vec::new());
//! response.emit(&mut transport, None).unwrap();
//!
//! let wire = String::from_utf8(transport.into_inner()).unwrap();
//! assert!(wire.starts_with("HTTP/1.1 201 Created\r\nContent-Type: application/json; charset=UTF-8\r\n"));
//! assert!(wire.ends_with("\r\n\r\n{\"id\":1}"));
//! ```

mod config;
mod cookie;

pub use config::CookieOptions;
pub use config::ResponseConfig;

use http::StatusCode;
use tracing::{debug, trace};

use crate::header::{HeaderTable, SET_COOKIE};
use crate::protocol::date::{http_date, http_date_now, unix_now};
use crate::protocol::{MimeTypes, SendError, StatusReasons};
use crate::request::RequestContext;
use crate::stream::ByteStream;
use crate::transport::Transport;
use config::CookieAttributes;
use cookie::set_cookie_value;

const DEFAULT_PROTOCOL_VERSION: &str = "1.0";

/// Fixed date in the past sent by `no_cache`.
const EXPIRED_DATE: &str = "Mon, 26 Jul 1990 05:00:00 GMT";

const CORS_DEFAULT_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const CORS_MAX_AGE: &str = "86400";

const ONE_DAY: i64 = 86400;

/// Builds and emits one response for the request it was created with.
#[derive(Debug)]
pub struct ResponseBuilder<'req> {
    request: &'req RequestContext,
    config: ResponseConfig,
    reasons: &'static StatusReasons,
    mimes: &'static MimeTypes,

    version: String,
    status: u16,
    reason: String,
    headers: HeaderTable,
    body: Option<ByteStream>,
}

impl<'req> ResponseBuilder<'req> {
    pub fn new(request: &'req RequestContext) -> Self {
        Self::with_config(request, ResponseConfig::default())
    }

    pub fn with_config(request: &'req RequestContext, config: ResponseConfig) -> Self {
        let mut builder = Self {
            request,
            config,
            reasons: StatusReasons::global(),
            mimes: MimeTypes::global(),
            version: String::new(),
            status: 0,
            reason: String::new(),
            headers: HeaderTable::new(),
            body: None,
        };
        builder.reset();
        builder
    }

    pub fn request(&self) -> &'req RequestContext {
        self.request
    }

    pub fn config(&self) -> &ResponseConfig {
        &self.config
    }

    /// Drops headers and body, and restores the default version and status.
    pub fn reset(&mut self) -> &mut Self {
        self.headers.clear();
        self.body = None;

        let request = self.request;
        let version = request.server("SERVER_PROTOCOL").unwrap_or(DEFAULT_PROTOCOL_VERSION);
        self.set_protocol_version(version);
        self.set_status_code(200, None)
    }

    pub fn protocol_version(&self) -> &str {
        &self.version
    }

    /// Stores a bare version number, `HTTP/1.1` is kept as `1.1`.
    pub fn set_protocol_version(&mut self, version: &str) -> &mut Self {
        self.version = version.strip_prefix("HTTP/").unwrap_or(version).to_string();
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn status_reason(&self) -> &str {
        &self.reason
    }

    /// Sets the status, with the registered reason phrase unless one is given.
    pub fn set_status_code(&mut self, code: u16, reason: Option<&str>) -> &mut Self {
        self.status = code;
        self.reason = match reason {
            Some(reason) => reason.to_string(),
            None => self.reasons.reason(code).to_string(),
        };
        self
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.set_status_code(status.as_u16(), None)
    }

    /// `HTTP/<version> <code> <reason>`
    pub fn status_line(&self) -> String {
        format!("HTTP/{} {} {}", self.version, self.status, self.reason)
    }

    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.headers.get(name)
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.set(name, value);
        self
    }

    pub fn add_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.add(name, value);
        self
    }

    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.headers.remove(name);
        self
    }

    /// Sets `Content-Type`, resolving aliases such as `json` or `html`.
    ///
    /// An empty `charset` omits the parameter.
    pub fn set_content_type(&mut self, mime: &str, charset: &str) -> &mut Self {
        let mime = self.mimes.resolve(mime);
        let value = if charset.is_empty() { mime.to_string() } else { format!("{mime}; charset={charset}") };
        self.set_header("content-type", value)
    }

    pub fn set_mime(&mut self, mime: &mime::Mime) -> &mut Self {
        self.set_header("content-type", mime.as_ref())
    }

    /// Adds a `Set-Cookie` header; earlier cookies are kept.
    ///
    /// `expire` is an absolute unix timestamp, `0` for a session cookie. The
    /// configured prefix is not applied here.
    pub fn add_cookie(&mut self, name: &str, value: &str, expire: i64, overrides: &CookieOptions) -> &mut Self {
        let attributes = CookieAttributes::merge(&self.config, self.request.is_secure(), overrides);
        let header = set_cookie_value(name, value, expire, &attributes);
        self.add_header(SET_COOKIE, header)
    }

    /// Asks the client to delete a cookie by expiring it a day ago.
    pub fn remove_cookie(&mut self, name: &str) -> &mut Self {
        self.add_cookie(name, "", unix_now() - ONE_DAY, &CookieOptions::default())
    }

    /// Replaces the response with a redirect to `url`, 302 when temporary, else 301.
    pub fn redirect(&mut self, url: &str, temporary: bool) -> &mut Self {
        self.reset();
        self.set_status(if temporary { StatusCode::FOUND } else { StatusCode::MOVED_PERMANENTLY });
        self.set_header("location", sanitize_url(url))
    }

    /// Lets clients cache the response for `max_age` seconds.
    pub fn cache(&mut self, max_age: i64) -> &mut Self {
        self.set_header("pragma", "public");
        self.set_header("cache-control", format!("max-age={max_age}"));
        self.set_header("expires", http_date(unix_now().saturating_add(max_age)))
    }

    pub fn no_cache(&mut self) -> &mut Self {
        self.set_header("expires", EXPIRED_DATE);
        self.set_header("last-modified", http_date_now());
        self.set_header("cache-control", "no-store, no-cache, must-revalidate");
        self.add_header("cache-control", "post-check=0, pre-check=0");
        self.set_header("pragma", "no-cache")
    }

    /// Allows cross origin requests, by default from the requesting origin.
    pub fn cors(&mut self, origin: Option<&str>, method: Option<&str>) -> &mut Self {
        let request = self.request;
        let origin = origin.or_else(|| request.server("HTTP_ORIGIN")).unwrap_or("*");
        let method =
            method.or_else(|| request.server("HTTP_ACCESS_CONTROL_REQUEST_METHOD")).unwrap_or(CORS_DEFAULT_METHODS);
        let headers = request.server("HTTP_ACCESS_CONTROL_REQUEST_HEADERS").unwrap_or("*");

        self.set_header("access-control-allow-origin", origin);
        self.set_header("access-control-allow-credentials", "true");
        self.set_header("access-control-max-age", CORS_MAX_AGE);
        self.set_header("access-control-allow-methods", method);
        self.set_header("access-control-allow-headers", headers);
        self.set_header("access-control-expose-headers", headers)
    }

    /// The body, an empty stream is allocated on first access.
    pub fn body(&mut self) -> &mut ByteStream {
        self.body.get_or_insert_with(ByteStream::empty)
    }

    /// Replaces the body. Bytes are copied into a new stream, a stream is taken over.
    pub fn set_body(&mut self, body: impl Into<ByteStream>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// Hands the body over to the caller.
    pub fn take_body(&mut self) -> Option<ByteStream> {
        self.body.take()
    }

    /// Emits headers then body. `None` uses the configured buffer size.
    pub fn emit<T: Transport + ?Sized>(&mut self, transport: &mut T, buffer: Option<usize>) -> Result<(), SendError> {
        self.emit_headers(transport)?;
        self.emit_body(transport, buffer.unwrap_or(self.config.buffer))?;
        transport.flush()?;
        Ok(())
    }

    /// Sends the status line and headers, unless the transport already sent its own.
    pub fn emit_headers<T: Transport + ?Sized>(&self, transport: &mut T) -> Result<(), SendError> {
        if transport.headers_sent() {
            debug!(status = self.status, "headers already sent, skip");
            return Ok(());
        }

        transport.send_status(&self.status_line(), self.status)?;
        for (name, values) in self.headers.iter() {
            let mut replace = name != SET_COOKIE;
            for value in values {
                transport.send_header(name, value, replace)?;
                replace = false;
            }
        }
        trace!(status = self.status, headers = self.headers.len(), "headers emitted");
        Ok(())
    }

    /// Writes the body: in one piece for a `buffer` of `0`, otherwise from the
    /// start in chunks of `buffer` bytes.
    pub fn emit_body<T: Transport + ?Sized>(&mut self, transport: &mut T, buffer: usize) -> Result<(), SendError> {
        let body = self.body();

        if buffer == 0 {
            let contents = body.render()?;
            transport.write_body(&contents)?;
            return Ok(());
        }

        if body.is_seekable() {
            body.rewind()?;
        }
        while !body.eof() {
            let chunk = body.read(buffer)?;
            if chunk.is_empty() {
                break;
            }
            transport.write_body(&chunk)?;
        }
        Ok(())
    }
}

/// Strips every character that can't appear in a URL.
fn sanitize_url(url: &str) -> String {
    const ALLOWED: &str = "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=";
    url.chars().filter(|c| c.is_ascii_alphanumeric() || ALLOWED.contains(*c)).collect()
}
