//! Content references and text decoding. Binary files never live inside a
//! binder item directly: the registry hands out a revocable handle instead,
//! much like an object URL, and text files are decoded off the UI thread.

mod decode;
mod registry;

use std::fs;
use std::io;
use std::path::PathBuf;

pub use decode::{DecodeError, DecodePoll, DecodedText, PendingDecode};
pub use registry::{ContentMetadata, ContentRef, ContentRegistry, ResolvedContent};

/// Where the bytes of a picked file come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Bytes already held in memory.
    Bytes(Vec<u8>),
    /// A file on disk, read lazily.
    Path(PathBuf),
}

impl FileSource {
    /// Load the full contents of the source.
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            FileSource::Bytes(bytes) => Ok(bytes),
            FileSource::Path(path) => fs::read(path),
        }
    }

    /// Human-readable origin used in error messages.
    pub fn describe(&self) -> String {
        match self {
            FileSource::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
            FileSource::Path(path) => path.display().to_string(),
        }
    }
}
