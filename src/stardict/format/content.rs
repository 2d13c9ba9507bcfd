//! # Definition Payload Access
//!
//! Resolves `(offset, size)` pairs from the index against the logical
//! definition payload. Plain `.dict` files are read by seeking; gzip/dictzip
//! payloads are inflated once and addressed in memory, so both layouts
//! return identical bytes for the same range.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

use log::debug;

use crate::stardict::codec::compression;
use crate::stardict::types::error::{Result, StardictError};

/// The logical (decompressed) definition payload of a dictionary.
#[derive(Debug)]
pub enum DictContent {
    /// Uncompressed `.dict`, read on demand.
    Plain { file: Mutex<File>, len: u64 },
    /// Inflated `.dict.dz` content.
    Inflated(Vec<u8>),
}

impl DictContent {
    /// Opens a definition file, detecting gzip by its magic bytes rather than
    /// trusting the extension.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;

        let mut magic = [0u8; 2];
        let peeked = read_prefix(&mut file, &mut magic)?;
        file.seek(SeekFrom::Start(0))?;

        if compression::is_gzip(&magic[..peeked]) {
            debug!("Inflating compressed payload {}", path.display());
            let bytes = compression::inflate_gzip(BufReader::new(file))?;
            Ok(DictContent::Inflated(bytes))
        } else {
            let len = file.metadata()?.len();
            debug!("Using plain payload {} ({} bytes)", path.display(), len);
            Ok(DictContent::Plain { file: Mutex::new(file), len })
        }
    }

    /// Length of the logical payload in bytes.
    pub fn len(&self) -> u64 {
        match self {
            DictContent::Plain { len, .. } => *len,
            DictContent::Inflated(bytes) => bytes.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the raw bytes at `[offset, offset + size)`.
    ///
    /// # Errors
    /// [`StardictError::OutOfBounds`] if the range extends past the payload.
    pub fn read_range(&self, offset: u64, size: u32) -> Result<Vec<u8>> {
        let len = self.len();
        let end = offset.checked_add(u64::from(size));
        if end.map_or(true, |end| end > len) {
            return Err(StardictError::OutOfBounds { offset, size, len });
        }

        match self {
            DictContent::Plain { file, .. } => {
                let mut file = file.lock().map_err(|_| StardictError::LockPoisoned)?;
                file.seek(SeekFrom::Start(offset))?;
                let mut buf = vec![0u8; size as usize];
                file.read_exact(&mut buf)?;
                Ok(buf)
            }
            DictContent::Inflated(bytes) => {
                let start = offset as usize;
                Ok(bytes[start..start + size as usize].to_vec())
            }
        }
    }
}

/// Reads up to `buf.len()` bytes, stopping early only at end of file.
fn read_prefix(file: &mut File, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
