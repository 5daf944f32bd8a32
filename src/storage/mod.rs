//! Read-only storage for compressed dictionary images.
//!
//! Images are either memory-mapped from disk or held as owned bytes. Both
//! are exposed through [`ByteBuffer`], whose accessors validate every offset
//! against the buffer length before reading.

pub mod buffer;
pub mod mmap;

// Re-export commonly used types
pub use buffer::*;
pub use mmap::*;
