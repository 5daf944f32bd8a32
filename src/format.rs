//! Layout constants and header parsing for compressed dictionary images.
//!
//! An image starts with a 16-byte signature followed by eight little-endian
//! `u32` section offsets. Nothing past the header is trusted until the
//! signature has been checked and every section offset has been validated
//! against the image length.

use crate::error::{BinError, Result};
use crate::storage::ByteBuffer;

/// Signature of the supported image version.
pub const SIGNATURE: &[u8; 16] = b"Greynir 02.00.00";

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = SIGNATURE.len() + 8 * 4;

// Trie node header.
pub const NODE_SINGLE_CHAR: u32 = 0x8000_0000;
pub const NODE_CHILDLESS: u32 = 0x4000_0000;
pub const NODE_CHAR_SHIFT: u32 = 23;
pub const NODE_CHAR_MASK: u32 = 0x7F;
pub const NODE_VALUE_MASK: u32 = 0x007F_FFFF;
/// Value of interim nodes that do not end a word form.
pub const NODE_NO_VALUE: u32 = NODE_VALUE_MASK;

// Packed mapping words.
pub const ENTRY_LAST: u32 = 0x8000_0000;
pub const ENTRY_KIND_MASK: u32 = 0x6000_0000;
pub const ENTRY_KIND_COMPLETE: u32 = 0x6000_0000;
pub const ENTRY_KIND_CONTINUATION: u32 = 0x4000_0000;
pub const ENTRY_KIND_TAIL: u32 = 0x2000_0000;
pub const ENTRY_KIND_HEAD: u32 = 0x0000_0000;
pub const ENTRY_COMMON_KSNID: u32 = 0x1000_0000;
pub const LEMMA_ID_BITS: u32 = 20;
pub const LEMMA_ID_MASK: u32 = (1 << LEMMA_ID_BITS) - 1;
pub const COMPLETE_MEANING_BITS: u32 = 8;
pub const COMPLETE_MEANING_MASK: u32 = (1 << COMPLETE_MEANING_BITS) - 1;
pub const MEANING_BITS: u32 = 10;
pub const MEANING_MASK: u32 = (1 << MEANING_BITS) - 1;
pub const KSNID_BITS: u32 = 19;
pub const KSNID_MASK: u32 = (1 << KSNID_BITS) - 1;

/// Width of a meaning slot.
pub const MEANING_SLOT_LEN: usize = 24;

// Lemma record bitfield.
pub const LEMMA_HAS_TEMPLATE: u32 = 0x8000_0000;
pub const LEMMA_DOMAIN_MASK: u32 = 0x1F;

/// Lemma id of entries synthesized by the compound resolver.
pub const SYNTHESIZED_LEMMA_ID: u32 = 0;

/// Semantic-domain tags, indexed by the low five bits of a lemma record.
pub const DOMAINS: [&str; 32] = [
    "alm",
    "föð",
    "móð",
    "fyr",
    "ism",
    "gæl",
    "lönd",
    "örn",
    "erl",
    "tölv",
    "málfr",
    "tón",
    "íþr",
    "natt",
    "mat",
    "dýr",
    "gras",
    "efna",
    "föt",
    "mælieining",
    "bíl",
    "tími",
    "fjár",
    "bygg",
    "veð",
    "við",
    "líff",
    "bær",
    "heimilisfang",
    "lækn",
    "bibl",
    "entity",
];

/// Domain tag for a lemma bitfield index; index 0 and out-of-range
/// indices fall back to `alm`.
pub fn domain_tag(index: u32) -> &'static str {
    DOMAINS.get(index as usize).copied().unwrap_or(DOMAINS[0])
}

/// Section offsets read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub mappings: usize,
    pub forms: usize,
    pub lemmas: usize,
    pub templates: usize,
    pub meanings: usize,
    pub alphabet: usize,
    pub subcats: usize,
    pub ksnid: usize,
}

impl Header {
    /// Validate the signature and read the section offsets.
    pub fn parse(buf: &ByteBuffer) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(BinError::load(format!(
                "image of {} bytes is shorter than the {HEADER_SIZE}-byte header",
                buf.len()
            )));
        }
        let signature = buf.slice(0, SIGNATURE.len())?;
        if signature != SIGNATURE {
            return Err(BinError::signature(format!(
                "expected {:?}, found {:?}",
                String::from_utf8_lossy(SIGNATURE),
                String::from_utf8_lossy(signature)
            )));
        }

        let mut offsets = [0usize; 8];
        for (i, slot) in offsets.iter_mut().enumerate() {
            let offset = buf.read_u32(SIGNATURE.len() + i * 4)? as usize;
            if offset > buf.len() {
                return Err(BinError::load(format!(
                    "section {i} starts at {offset}, beyond the end of the {}-byte image",
                    buf.len()
                )));
            }
            *slot = offset;
        }

        let [mappings, forms, lemmas, templates, meanings, alphabet, subcats, ksnid] = offsets;
        Ok(Header {
            mappings,
            forms,
            lemmas,
            templates,
            meanings,
            alphabet,
            subcats,
            ksnid,
        })
    }
}

/// Read the compression alphabet (length-prefixed byte array).
pub fn read_alphabet(buf: &ByteBuffer, offset: usize) -> Result<Vec<u8>> {
    let len = buf.read_u32(offset)? as usize;
    let bytes = buf
        .slice(offset + 4, len)
        .map_err(|_| BinError::load(format!("alphabet of {len} bytes is truncated")))?;
    Ok(bytes.to_vec())
}
