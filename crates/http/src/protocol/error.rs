use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },

    #[error("stream error: {source}")]
    StreamError {
        #[from]
        source: StreamError,
    },
}

/// The operation that failed on the underlying handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StreamOp {
    Read,
    Write,
    Seek,
    Tell,
    ReadContents,
}

impl StreamOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamOp::Read => "read from",
            StreamOp::Write => "write to",
            StreamOp::Seek => "seek in",
            StreamOp::Tell => "determine position of",
            StreamOp::ReadContents => "read contents of",
        }
    }
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("invalid stream source: {reason}")]
    InvalidArgument { reason: String },

    #[error("stream is detached")]
    Detached,

    #[error("cannot read from non-readable stream")]
    NotReadable,

    #[error("cannot write to a non-writable stream")]
    NotWritable,

    #[error("stream is not seekable")]
    NotSeekable,

    #[error("unable to {} stream: {source}", op.as_str())]
    Io { op: StreamOp, source: io::Error },
}

impl StreamError {
    pub fn invalid_argument<S: ToString>(str: S) -> Self {
        Self::InvalidArgument { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(op: StreamOp, e: E) -> Self {
        Self::Io { op, source: e.into() }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, StreamError::Detached)
    }
}

impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Io { source, .. } => source,
            StreamError::InvalidArgument { .. } => io::Error::new(io::ErrorKind::InvalidInput, e),
            StreamError::Detached => io::Error::new(io::ErrorKind::NotConnected, e),
            StreamError::NotReadable | StreamError::NotWritable | StreamError::NotSeekable => {
                io::Error::new(io::ErrorKind::Unsupported, e)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid query string: {reason}")]
    InvalidQuery { reason: String },

    #[error("invalid form body: {reason}")]
    InvalidForm { reason: String },

    #[error("invalid json body: {reason}")]
    InvalidJson { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn invalid_query<S: ToString>(str: S) -> Self {
        Self::InvalidQuery { reason: str.to_string() }
    }

    pub fn invalid_form<S: ToString>(str: S) -> Self {
        Self::InvalidForm { reason: str.to_string() }
    }

    pub fn invalid_json<S: ToString>(str: S) -> Self {
        Self::InvalidJson { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("body error: {source}")]
    Stream {
        #[from]
        source: StreamError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_error_messages() {
        assert_eq!(StreamError::Detached.to_string(), "stream is detached");
        assert_eq!(StreamError::NotSeekable.to_string(), "stream is not seekable");

        let e = StreamError::io(StreamOp::Write, io::Error::other("disk full"));
        assert_eq!(e.to_string(), "unable to write to stream: disk full");
    }

    #[test]
    fn stream_error_into_io_error() {
        let e: io::Error = StreamError::Detached.into();
        assert_eq!(e.kind(), io::ErrorKind::NotConnected);

        let e: io::Error = StreamError::NotWritable.into();
        assert_eq!(e.kind(), io::ErrorKind::Unsupported);

        let e: io::Error = StreamError::io(StreamOp::Read, io::Error::from(io::ErrorKind::BrokenPipe)).into();
        assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn http_error_wraps_sources() {
        let e: HttpError = SendError::from(StreamError::Detached).into();
        assert_eq!(e.to_string(), "response error: body error: stream is detached");

        let e: HttpError = ParseError::invalid_json("expected value").into();
        assert_eq!(e.to_string(), "request error: invalid json body: expected value");
    }
}
