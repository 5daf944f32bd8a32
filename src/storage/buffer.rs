//! Bounds-checked byte buffer.

use std::fmt;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;

use crate::error::{BinError, Result};

/// Backing store of a [`ByteBuffer`].
enum Backing {
    /// A read-only memory map of a file.
    Mapped(Mmap),
    /// Bytes owned by the process.
    Owned(Box<[u8]>),
}

impl Backing {
    fn bytes(&self) -> &[u8] {
        match self {
            Backing::Mapped(mmap) => &mmap[..],
            Backing::Owned(bytes) => &bytes[..],
        }
    }
}

/// An immutable, cheaply clonable view of an image.
///
/// Every accessor takes an absolute offset and fails with
/// [`BinError::Bounds`] instead of reading past the end.
#[derive(Clone)]
pub struct ByteBuffer {
    backing: Arc<Backing>,
}

impl ByteBuffer {
    /// Wrap a memory map.
    pub(crate) fn from_mmap(mmap: Mmap) -> Self {
        ByteBuffer {
            backing: Arc::new(Backing::Mapped(mmap)),
        }
    }

    /// Wrap owned bytes.
    pub fn from_bytes<B: Into<Box<[u8]>>>(bytes: B) -> Self {
        ByteBuffer {
            backing: Arc::new(Backing::Owned(bytes.into())),
        }
    }

    /// Whether the buffer is a memory map.
    pub fn is_mapped(&self) -> bool {
        matches!(*self.backing, Backing::Mapped(_))
    }

    /// Total length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole buffer.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.backing.bytes()
    }

    /// `len` bytes starting at `offset`.
    #[inline]
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let bytes = self.as_slice();
        offset
            .checked_add(len)
            .and_then(|end| bytes.get(offset..end))
            .ok_or_else(|| BinError::bounds(offset, len, bytes.len()))
    }

    /// At most `len` bytes starting at `offset`, clipped to the end of the buffer.
    pub fn slice_clipped(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let available = self.len().saturating_sub(offset);
        if available == 0 {
            return Err(BinError::bounds(offset, len, self.len()));
        }
        self.slice(offset, len.min(available))
    }

    #[inline]
    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.as_slice()
            .get(offset)
            .copied()
            .ok_or_else(|| BinError::bounds(offset, 1, self.len()))
    }

    #[inline]
    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        self.slice(offset, 2).map(LittleEndian::read_u16)
    }

    #[inline]
    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        self.slice(offset, 4).map(LittleEndian::read_u32)
    }

    /// Read the `index`-th `u32` of the table starting at `base`.
    #[inline]
    pub fn read_u32_at_index(&self, base: usize, index: usize) -> Result<u32> {
        let offset = index
            .checked_mul(4)
            .and_then(|delta| base.checked_add(delta))
            .ok_or_else(|| BinError::bounds(base, 4, self.len()))?;
        self.read_u32(offset)
    }

    /// A NUL-terminated byte string starting at `offset`, without the terminator.
    pub fn read_cstr(&self, offset: usize) -> Result<&[u8]> {
        let tail = self
            .as_slice()
            .get(offset..)
            .ok_or_else(|| BinError::bounds(offset, 1, self.len()))?;
        match tail.iter().position(|&b| b == 0) {
            Some(end) => Ok(&tail[..end]),
            None => Err(BinError::bounds(offset, tail.len() + 1, self.len())),
        }
    }

    /// A byte string prefixed by a one-byte length.
    pub fn read_len_prefixed(&self, offset: usize) -> Result<&[u8]> {
        let len = self.read_u8(offset)? as usize;
        self.slice(offset + 1, len)
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.len())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}
