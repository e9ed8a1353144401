use std::io;
use std::io::SeekFrom;

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace, warn};

use crate::ensure;
use crate::protocol::{StreamError, StreamOp};
use crate::stream::handle::{is_readable_mode, is_writable_mode, FileHandle, MemoryHandle, RawHandle};

/// Size of the scratch buffer used when draining a stream.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// What a [`ByteStream`] is created from.
#[derive(Debug)]
pub enum StreamSource {
    /// Copied into a fresh in-memory read/write store.
    Text(Bytes),
    /// Adopted as is; the stream owns the handle until it is detached.
    Handle(Box<dyn RawHandle>),
}

impl From<&str> for StreamSource {
    fn from(value: &str) -> Self {
        StreamSource::Text(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for StreamSource {
    fn from(value: String) -> Self {
        StreamSource::Text(Bytes::from(value))
    }
}

impl From<Bytes> for StreamSource {
    fn from(value: Bytes) -> Self {
        StreamSource::Text(value)
    }
}

impl From<Vec<u8>> for StreamSource {
    fn from(value: Vec<u8>) -> Self {
        StreamSource::Text(Bytes::from(value))
    }
}

impl From<Box<dyn RawHandle>> for StreamSource {
    fn from(handle: Box<dyn RawHandle>) -> Self {
        StreamSource::Handle(handle)
    }
}

impl From<MemoryHandle> for StreamSource {
    fn from(handle: MemoryHandle) -> Self {
        StreamSource::Handle(Box::new(handle))
    }
}

impl From<FileHandle> for StreamSource {
    fn from(handle: FileHandle) -> Self {
        StreamSource::Handle(Box::new(handle))
    }
}

/// A readable, writable and seekable byte source over a [`RawHandle`].
///
/// The capability flags are fixed when the stream is created: read and write
/// come from the handle's open mode, seek additionally requires a successful
/// no-op seek. Every operation checks them and fails fast with a
/// [`StreamError`]. Once the handle has been detached or closed all flags are
/// false and every operation fails with [`StreamError::Detached`].
#[derive(Debug)]
pub struct ByteStream {
    handle: Option<Box<dyn RawHandle>>,
    readable: bool,
    writable: bool,
    seekable: bool,
    size: Option<u64>,
    uri: Option<String>,
}

impl ByteStream {
    pub fn create<S: Into<StreamSource>>(source: S) -> Result<Self, StreamError> {
        match source.into() {
            StreamSource::Text(bytes) => Ok(Self::from_bytes(bytes)),
            StreamSource::Handle(handle) => Self::from_handle(handle),
        }
    }

    /// Creates an empty in-memory stream.
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// Copies `data` into a fresh in-memory stream, positioned after the data.
    pub fn from_bytes<B: Into<Bytes>>(data: B) -> Self {
        let data = data.into();
        let handle = MemoryHandle::with_data(&data);
        let mut stream = Self::adopt(Box::new(handle));
        stream.size = Some(data.len() as u64);
        stream
    }

    pub fn from_handle(handle: Box<dyn RawHandle>) -> Result<Self, StreamError> {
        ensure!(handle.is_open(), StreamError::invalid_argument("handle must be a string or an open handle"));
        Ok(Self::adopt(handle))
    }

    fn adopt(mut handle: Box<dyn RawHandle>) -> Self {
        let readable = is_readable_mode(handle.mode());
        let writable = is_writable_mode(handle.mode());
        let seekable = handle.is_seekable() && handle.seek(SeekFrom::Current(0)).is_ok();
        let uri = handle.uri().map(ToOwned::to_owned);

        debug!(mode = handle.mode(), readable, writable, seekable, "create byte stream");
        Self { handle: Some(handle), readable, writable, seekable, size: None, uri }
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    pub fn is_detached(&self) -> bool {
        self.handle.is_none()
    }

    /// The open mode of the handle, `None` once detached.
    pub fn mode(&self) -> Option<&str> {
        self.handle.as_ref().map(|handle| handle.mode())
    }

    /// The locator of the underlying resource, if it has one.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Reads up to `length` bytes from the current position.
    ///
    /// Memory grows with the data actually read, not with `length`.
    pub fn read(&mut self, length: usize) -> Result<Bytes, StreamError> {
        let mut buf = BytesMut::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let want = (length - buf.len()).min(READ_CHUNK_SIZE);
            let filled = self.read_into(&mut chunk[..want])?;
            buf.extend_from_slice(&chunk[..filled]);
            if filled < want || buf.len() == length {
                break;
            }
        }
        Ok(buf.freeze())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(StreamError::Detached);
        };
        ensure!(self.readable, StreamError::NotReadable);

        let mut filled = 0;
        while filled < buf.len() {
            match handle.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(StreamError::io(StreamOp::Read, e)),
            }
        }
        Ok(filled)
    }

    /// Writes all of `data`, returning the number of bytes written.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, StreamError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(StreamError::Detached);
        };
        ensure!(self.writable, StreamError::NotWritable);

        // the size can't be known after writing anything
        self.size = None;

        let mut written = 0;
        while written < data.len() {
            match handle.write(&data[written..]) {
                Ok(0) => return Err(StreamError::io(StreamOp::Write, io::ErrorKind::WriteZero)),
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(StreamError::io(StreamOp::Write, e)),
            }
        }
        Ok(written)
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, StreamError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(StreamError::Detached);
        };
        ensure!(self.seekable, StreamError::NotSeekable);

        handle.seek(pos).map_err(|e| {
            StreamError::io(StreamOp::Seek, io::Error::new(e.kind(), format!("unable to seek to {pos:?}: {e}")))
        })
    }

    pub fn rewind(&mut self) -> Result<(), StreamError> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Current position of the handle.
    pub fn tell(&mut self) -> Result<u64, StreamError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(StreamError::Detached);
        };
        handle.tell().map_err(|e| StreamError::io(StreamOp::Tell, e))
    }

    /// True when detached or when a read has reached the end of the data.
    pub fn eof(&self) -> bool {
        self.handle.as_ref().is_none_or(|handle| handle.eof())
    }

    /// Size of the underlying data, computed lazily and cached until the next write.
    pub fn size(&mut self) -> Option<u64> {
        if self.size.is_some() {
            return self.size;
        }

        let handle = self.handle.as_mut()?;
        if let Some(uri) = &self.uri {
            trace!(uri, "stat stream resource");
        }

        match handle.stat_size() {
            Ok(size) => {
                self.size = size;
                size
            }
            Err(e) => {
                trace!(cause = %e, "unable to stat stream");
                None
            }
        }
    }

    /// Reads everything from the current position to the end.
    pub fn get_contents(&mut self) -> Result<Bytes, StreamError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(StreamError::Detached);
        };

        let mut contents = BytesMut::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match handle.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => contents.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(StreamError::io(StreamOp::ReadContents, e)),
            }
        }
        Ok(contents.freeze())
    }

    /// Renders the whole stream, seeking to the start first when possible.
    pub fn render(&mut self) -> Result<Bytes, StreamError> {
        if self.seekable {
            self.rewind()?;
        }
        self.get_contents()
    }

    /// Closes the handle. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.detach() {
            if let Err(e) = handle.close() {
                warn!(cause = %e, "failed to close stream handle");
            }
        }
    }

    /// Releases the handle to the caller without closing it.
    pub fn detach(&mut self) -> Option<Box<dyn RawHandle>> {
        let handle = self.handle.take()?;
        self.size = None;
        self.uri = None;
        self.readable = false;
        self.writable = false;
        self.seekable = false;
        trace!("stream detached");
        Some(handle)
    }
}

impl Default for ByteStream {
    fn default() -> Self {
        Self::empty()
    }
}

impl Drop for ByteStream {
    fn drop(&mut self) {
        self.close();
    }
}

impl From<&str> for ByteStream {
    fn from(value: &str) -> Self {
        ByteStream::from_bytes(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for ByteStream {
    fn from(value: String) -> Self {
        ByteStream::from_bytes(value)
    }
}

impl From<Bytes> for ByteStream {
    fn from(value: Bytes) -> Self {
        ByteStream::from_bytes(value)
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(value: Vec<u8>) -> Self {
        ByteStream::from_bytes(value)
    }
}

impl io::Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}

impl io::Write for ByteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(ByteStream::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for ByteStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(ByteStream::seek(self, pos)?)
    }
}
