//! Entry records: result types, packed mapping words and their decoder.

pub mod decoder;
pub mod entry;
pub mod packed;

pub use decoder::{LemmaRecord, RecordDecoder};
pub use entry::{ExtendedAttributes, ExtendedEntry, MorphEntry};
pub use packed::PackedEntry;
