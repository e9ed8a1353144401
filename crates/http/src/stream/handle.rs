//! Handles a [`ByteStream`](super::ByteStream) can wrap.
//!
//! A handle is anything that can be opened with a mode string (`r`, `w+b`, ...).
//! The stream derives its capability flags from that mode, so a handle only has
//! to report it faithfully and fail with an io error on operations it can't do.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::protocol::StreamError;

/// Modes that permit reading.
pub const READ_MODES: &[&str] = &[
    "r", "w+", "r+", "x+", "c+", "rb", "w+b", "r+b", "x+b", "c+b", "rt", "w+t", "r+t", "x+t", "c+t", "a+",
];

/// Modes that permit writing.
pub const WRITE_MODES: &[&str] = &[
    "w", "w+", "rw", "r+", "x+", "c+", "wb", "w+b", "r+b", "x+b", "c+b", "w+t", "r+t", "x+t", "c+t", "a", "a+",
];

pub fn is_readable_mode(mode: &str) -> bool {
    READ_MODES.contains(&mode)
}

pub fn is_writable_mode(mode: &str) -> bool {
    WRITE_MODES.contains(&mode)
}

fn unsupported(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, format!("handle does not support {what}"))
}

/// An owned, open byte resource.
pub trait RawHandle: fmt::Debug + Send {
    /// The mode the handle was opened with.
    fn mode(&self) -> &str;

    fn is_open(&self) -> bool {
        true
    }

    /// Whether the underlying resource supports seeking at all.
    fn is_seekable(&self) -> bool {
        false
    }

    /// Locator of the underlying resource, e.g. a file path.
    fn uri(&self) -> Option<&str> {
        None
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(unsupported("writing"))
    }

    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(unsupported("seeking"))
    }

    fn tell(&mut self) -> io::Result<u64>;

    /// True once a read has hit the end of the data.
    fn eof(&self) -> bool;

    /// Current size of the resource, freshly queried.
    fn stat_size(&mut self) -> io::Result<Option<u64>> {
        Ok(None)
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A temporary in-memory read/write store.
#[derive(Debug, Default)]
pub struct MemoryHandle {
    inner: io::Cursor<Vec<u8>>,
    eof: bool,
}

impl MemoryHandle {
    pub const MODE: &'static str = "w+b";

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `data`, positioned at its end.
    pub fn with_data(data: &[u8]) -> Self {
        let mut handle = Self::new();
        handle.inner.get_mut().extend_from_slice(data);
        handle.inner.set_position(data.len() as u64);
        handle
    }

    pub fn get_ref(&self) -> &[u8] {
        self.inner.get_ref()
    }
}

impl RawHandle for MemoryHandle {
    fn mode(&self) -> &str {
        Self::MODE
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn uri(&self) -> Option<&str> {
        Some("memory://temp")
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.eof = true;
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let offset = self.inner.seek(pos)?;
        self.eof = false;
        Ok(offset)
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.inner.position())
    }

    fn eof(&self) -> bool {
        self.eof
    }

    fn stat_size(&mut self) -> io::Result<Option<u64>> {
        Ok(Some(self.inner.get_ref().len() as u64))
    }
}

/// A file opened with a mode string.
#[derive(Debug)]
pub struct FileHandle {
    file: Option<File>,
    mode: String,
    uri: Option<String>,
    eof: bool,
}

impl FileHandle {
    /// Opens `path` the way `fopen` interprets `mode`.
    pub fn open<P: AsRef<Path>>(path: P, mode: &str) -> Result<Self, StreamError> {
        let path = path.as_ref();
        let options = open_options(mode)?;
        let file = options
            .open(path)
            .map_err(|e| StreamError::invalid_argument(format!("unable to open {}: {e}", path.display())))?;
        Ok(Self::from_file(file, mode, Some(path.to_path_buf())))
    }

    /// Wraps an already opened file. `mode` must describe how it was opened.
    pub fn from_file(file: File, mode: &str, path: Option<PathBuf>) -> Self {
        let uri = path.as_ref().map(|p| p.to_string_lossy().into_owned());
        Self { file: Some(file), mode: mode.to_string(), uri, eof: false }
    }

    fn file(&mut self) -> io::Result<&mut File> {
        self.file.as_mut().ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "file is closed"))
    }
}

impl RawHandle for FileHandle {
    fn mode(&self) -> &str {
        &self.mode
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.file()?.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.eof = true;
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file()?.write(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let offset = self.file()?.seek(pos)?;
        self.eof = false;
        Ok(offset)
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.file()?.stream_position()
    }

    fn eof(&self) -> bool {
        self.eof
    }

    fn stat_size(&mut self) -> io::Result<Option<u64>> {
        // the open descriptor, not the path: the file may be unlinked or replaced
        Ok(Some(self.file()?.metadata()?.len()))
    }

    fn close(&mut self) -> io::Result<()> {
        // dropping the file releases the descriptor
        self.file.take();
        Ok(())
    }
}

fn open_options(mode: &str) -> Result<OpenOptions, StreamError> {
    let flags: String = mode.chars().filter(|c| *c != 'b' && *c != 't').collect();
    let mut options = OpenOptions::new();
    match flags.as_str() {
        "r" => options.read(true),
        "r+" => options.read(true).write(true),
        "w" => options.write(true).create(true).truncate(true),
        "w+" => options.read(true).write(true).create(true).truncate(true),
        "a" => options.append(true).create(true),
        "a+" => options.read(true).append(true).create(true),
        "x" => options.write(true).create_new(true),
        "x+" => options.read(true).write(true).create_new(true),
        "c" => options.write(true).create(true).truncate(false),
        "c+" => options.read(true).write(true).create(true).truncate(false),
        _ => return Err(StreamError::invalid_argument(format!("unsupported open mode '{mode}'"))),
    };
    Ok(options)
}

/// A forward-only, read-only handle over any reader.
pub struct ReadHandle<R> {
    reader: R,
    position: u64,
    eof: bool,
}

impl<R: Read> ReadHandle<R> {
    pub const MODE: &'static str = "rb";

    pub fn new(reader: R) -> Self {
        Self { reader, position: 0, eof: false }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R> fmt::Debug for ReadHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadHandle").field("position", &self.position).field("eof", &self.eof).finish_non_exhaustive()
    }
}

impl<R: Read + Send> RawHandle for ReadHandle<R> {
    fn mode(&self) -> &str {
        Self::MODE
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.eof = true;
        }
        self.position += n as u64;
        Ok(n)
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }

    fn eof(&self) -> bool {
        self.eof
    }
}
