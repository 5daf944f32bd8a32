//! Conversion between caller-facing text and the single-byte image encoding.

use std::fmt::Debug;

/// Converts words to and from the 8-bit encoding used inside an image.
pub trait WordEncoding: Send + Sync + Debug {
    /// Encode a word, or `None` if it contains a character the encoding
    /// cannot represent (such a word can never be in the dictionary).
    fn encode(&self, text: &str) -> Option<Vec<u8>>;

    /// Decode bytes read from the image.
    fn decode(&self, bytes: &[u8]) -> String;
}

/// ISO 8859-1: every byte is the Unicode code point of the same value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latin1;

impl WordEncoding for Latin1 {
    fn encode(&self, text: &str) -> Option<Vec<u8>> {
        text.chars()
            .map(|c| u8::try_from(u32::from(c)).ok())
            .collect()
    }

    fn decode(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| char::from(b)).collect()
    }
}
