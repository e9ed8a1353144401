//! Byte streams used as response bodies.
//!
//! [`ByteStream`] wraps a [`RawHandle`] and gates every operation on the
//! capabilities derived from the handle's open mode. Three handles are provided:
//!
//! - [`MemoryHandle`]: a temporary in-memory read/write store
//! - [`FileHandle`]: a file opened with an `fopen` style mode string
//! - [`ReadHandle`]: a forward-only reader such as stdin or a socket

mod byte_stream;
mod handle;

pub use byte_stream::ByteStream;
pub use byte_stream::StreamSource;
pub use handle::FileHandle;
pub use handle::MemoryHandle;
pub use handle::RawHandle;
pub use handle::ReadHandle;
pub use handle::{is_readable_mode, is_writable_mode, READ_MODES, WRITE_MODES};
