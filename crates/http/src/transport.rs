//! The output side a response is emitted to.
//!
//! [`Transport`] models a CGI style output layer: a status line and headers are
//! registered first, with per-header replace semantics, and go out on the wire
//! together right before the first body byte. After that `headers_sent()`
//! reports true and the response builder skips header emission.
//!
//! [`IoTransport`] implements it over any [`std::io::Write`].

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use tracing::{trace, warn};

use crate::header::canonical_name;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

const DEFAULT_STATUS_LINE: &str = "HTTP/1.1 200 OK";

#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// True once the status line and headers have been written out.
    fn headers_sent(&self) -> bool;

    /// Registers the status line, e.g. `HTTP/1.1 404 Not Found`.
    fn send_status(&mut self, status_line: &str, code: u16) -> io::Result<()>;

    /// Registers a header. With `replace` every earlier value of the same name is dropped.
    fn send_header(&mut self, name: &str, value: &str, replace: bool) -> io::Result<()>;

    /// Writes a piece of the body, sending pending headers first.
    fn write_body(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Sends pending headers and flushes the underlying output.
    fn flush(&mut self) -> io::Result<()>;
}

/// A [`Transport`] writing the HTTP/1.x wire format to `W`.
#[derive(Debug)]
pub struct IoTransport<W> {
    writer: W,
    status_line: Option<String>,
    headers: Vec<(String, String)>,
    headers_sent: bool,
}

impl<W: Write> IoTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, status_line: None, headers: Vec::new(), headers_sent: false }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Headers registered but not yet sent.
    pub fn pending_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Serializes the status line and the pending headers.
    pub fn send_headers(&mut self) -> io::Result<()> {
        if self.headers_sent {
            return Ok(());
        }

        let mut dst = BytesMut::with_capacity(INIT_HEADER_SIZE);
        let status_line = self.status_line.as_deref().unwrap_or(DEFAULT_STATUS_LINE);
        write!(FastWrite(&mut dst), "{status_line}\r\n")?;

        for (name, value) in &self.headers {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");

        self.writer.write_all(&dst)?;
        self.headers_sent = true;
        self.headers.clear();
        trace!(size = dst.len(), "headers sent");
        Ok(())
    }

    fn ensure_pending(&self) -> io::Result<()> {
        if self.headers_sent {
            warn!("headers already sent");
            return Err(io::Error::other("headers already sent"));
        }
        Ok(())
    }
}

impl<W: Write> Transport for IoTransport<W> {
    fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    fn send_status(&mut self, status_line: &str, _code: u16) -> io::Result<()> {
        self.ensure_pending()?;
        self.status_line = Some(status_line.to_string());
        Ok(())
    }

    fn send_header(&mut self, name: &str, value: &str, replace: bool) -> io::Result<()> {
        self.ensure_pending()?;
        if value.contains(['\r', '\n']) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("header {name} contains a line break")));
        }

        if replace {
            let canonical = canonical_name(name);
            self.headers.retain(|(existing, _)| canonical_name(existing) != canonical);
        }
        self.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn write_body(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.send_headers()?;
        self.writer.write_all(chunk)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_headers()?;
        self.writer.flush()
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// This is an optimization to avoid unnecessary bounds checking when writing
/// to the bytes buffer, since we've already reserved enough space.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
