//! Memory-mapped file access.

use std::fs::File;
use std::path::Path;

use memmap2::MmapOptions;

use crate::error::{BinError, Result};
use crate::storage::buffer::ByteBuffer;

/// Map a file read-only into memory.
///
/// Empty files produce an empty buffer instead of a zero-length mapping;
/// header validation rejects them afterwards.
pub fn map_file<P: AsRef<Path>>(path: P) -> Result<ByteBuffer> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| BinError::load(format!("Failed to open file {}: {e}", path.display())))?;

    let size = file
        .metadata()
        .map_err(|e| BinError::load(format!("Failed to get metadata: {e}")))?
        .len();
    if size == 0 {
        return Ok(ByteBuffer::from_bytes(Vec::new()));
    }

    // SAFETY: the image is opened read-only and treated as immutable for the
    // lifetime of the mapping.
    let mmap = unsafe {
        MmapOptions::new()
            .map(&file)
            .map_err(|e| BinError::load(format!("Failed to mmap file {}: {e}", path.display())))?
    };

    Ok(ByteBuffer::from_mmap(mmap))
}
