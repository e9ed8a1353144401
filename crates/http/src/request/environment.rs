//! The raw inputs a request is built from.
//!
//! An [`Environment`] is a plain snapshot: CGI style server variables, the
//! request body, the process arguments, and whatever data the host has already
//! decoded. Nothing in this crate reads process state behind the caller's back;
//! [`Environment::from_process`] is the single place that captures it.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::io::Read;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::protocol::ParseError;
use crate::request::params::{Params, RawUpload};

#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub server: HashMap<String, String>,
    /// Query parameters decoded by the host, if any.
    pub query: Option<Params>,
    /// Form parameters decoded by the host, if any.
    pub form: Option<Params>,
    /// Upload table keyed by field name.
    pub files: Vec<(String, RawUpload)>,
    /// Cookies decoded by the host. Without them `HTTP_COOKIE` is parsed.
    pub cookies: Option<Params>,
    pub body: Bytes,
    pub args: Vec<String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process as a CGI request.
    ///
    /// Server variables come from the environment, the body from stdin (at most
    /// `CONTENT_LENGTH` bytes, and only when `REQUEST_METHOD` is set).
    /// Variables and arguments that are not valid UTF-8 are decoded lossily.
    pub fn from_process() -> Result<Self, ParseError> {
        let server = server_vars(std::env::vars_os());
        let args: Vec<String> = std::env::args_os().map(lossy).collect();

        let body = if server.contains_key("REQUEST_METHOD") {
            let length = server.get("CONTENT_LENGTH").and_then(|value| value.trim().parse::<u64>().ok()).unwrap_or(0);
            read_body(io::stdin().lock(), length)?
        } else {
            Bytes::new()
        };

        debug!(vars = server.len(), body = body.len(), "captured process environment");
        Ok(Self { server, body, args, ..Self::default() })
    }

    pub fn with_server(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.server.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, query: Params) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_form(mut self, form: Params) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_file(mut self, field: impl Into<String>, upload: RawUpload) -> Self {
        self.files.push((field.into(), upload));
        self
    }

    pub fn with_cookies(mut self, cookies: Params) -> Self {
        self.cookies = Some(cookies);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

fn server_vars<I: IntoIterator<Item = (OsString, OsString)>>(vars: I) -> HashMap<String, String> {
    vars.into_iter().map(|(key, value)| (lossy(key), lossy(value))).collect()
}

fn lossy(value: OsString) -> String {
    value.into_string().unwrap_or_else(|raw| {
        let decoded = raw.to_string_lossy().into_owned();
        warn!(value = %decoded, "replaced invalid utf-8 in process environment");
        decoded
    })
}

fn read_body<R: Read>(reader: R, length: u64) -> Result<Bytes, ParseError> {
    let mut body = Vec::with_capacity(length.min(64 * 1024) as usize);
    reader.take(length).read_to_end(&mut body).map_err(ParseError::io)?;
    Ok(Bytes::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_bounded_by_content_length() {
        let body = read_body(&b"a=1&b=2trailing"[..], 7).unwrap();
        assert_eq!(&body[..], b"a=1&b=2");

        let body = read_body(&b"short"[..], 100).unwrap();
        assert_eq!(&body[..], b"short");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_variables_are_decoded_lossily() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from("HTTP_X_NAME"), OsString::from_vec(b"caf\xe9".to_vec())),
            (OsString::from_vec(b"HTTP_\xff".to_vec()), OsString::from("v")),
            (OsString::from("REQUEST_METHOD"), OsString::from("GET")),
        ];
        let server = server_vars(vars);

        assert_eq!(server.get("HTTP_X_NAME").map(String::as_str), Some("caf\u{fffd}"));
        assert_eq!(server.get("HTTP_\u{fffd}").map(String::as_str), Some("v"));
        assert_eq!(server.get("REQUEST_METHOD").map(String::as_str), Some("GET"));
        assert_eq!(lossy(OsString::from_vec(b"index\x80.php".to_vec())), "index\u{fffd}.php");
    }

    #[test]
    fn builder() {
        let env = Environment::new()
            .with_server("REQUEST_METHOD", "POST")
            .with_body("x=1")
            .with_args(["index.php", "users"])
            .with_cookies(Params::parse(b"sid=abc"));

        assert_eq!(env.server.get("REQUEST_METHOD").map(String::as_str), Some("POST"));
        assert_eq!(&env.body[..], b"x=1");
        assert_eq!(env.args, vec!["index.php", "users"]);
        assert!(env.query.is_none());
        assert_eq!(env.cookies.unwrap().get("sid"), Some("abc"));
    }
}
