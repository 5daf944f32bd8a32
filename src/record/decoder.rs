//! Turns mapping-table offsets into [`MorphEntry`] and [`ExtendedEntry`] values.

use std::sync::Arc;

use log::debug;

use crate::encoding::WordEncoding;
use crate::error::{BinError, Result};
use crate::format::{self, Header, LEMMA_DOMAIN_MASK, LEMMA_HAS_TEMPLATE, MEANING_SLOT_LEN};
use crate::record::entry::{ExtendedAttributes, ExtendedEntry, MorphEntry};
use crate::record::packed::{self, PackedEntry};
use crate::storage::ByteBuffer;

/// A lemma record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LemmaRecord {
    /// Headword bytes as stored in the image.
    pub raw: Vec<u8>,
    pub headword: String,
    pub domain: &'static str,
    /// Absolute offset of the inflection template, if the lemma has one.
    pub template: Option<usize>,
}

/// Decodes records of one image.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    buf: ByteBuffer,
    header: Header,
    encoding: Arc<dyn WordEncoding>,
}

impl RecordDecoder {
    pub fn new(buf: ByteBuffer, header: Header, encoding: Arc<dyn WordEncoding>) -> Self {
        RecordDecoder {
            buf,
            header,
            encoding,
        }
    }

    /// The packed entries stored for a trie value.
    pub fn meanings_for(&self, offset: u32) -> Vec<PackedEntry> {
        packed::read_sequence(&self.buf, self.header.mappings, offset)
    }

    /// Word class and inflection tag of a meaning slot.
    pub fn meaning(&self, index: u32) -> Result<(String, String)> {
        let at = self
            .buf
            .read_u32_at_index(self.header.meanings, index as usize)? as usize;
        let slot = self.buf.slice_clipped(at, MEANING_SLOT_LEN)?;
        let mut tokens = slot
            .split(|&b| b == b' ' || b == 0)
            .filter(|token| !token.is_empty());
        let class = tokens
            .next()
            .ok_or_else(|| BinError::decode(format!("meaning slot {index} is blank")))?;
        let tag = tokens.next().unwrap_or_default();
        Ok((self.encoding.decode(class), self.encoding.decode(tag)))
    }

    /// The record of a lemma. Lemma id 0 and ids without a record fail.
    pub fn lemma(&self, lemma_id: u32) -> Result<LemmaRecord> {
        let at = self
            .buf
            .read_u32_at_index(self.header.lemmas, lemma_id as usize)? as usize;
        if at == 0 {
            return Err(BinError::decode(format!("lemma {lemma_id} has no record")));
        }
        let bits = self.buf.read_u32(at)?;
        let raw = self.buf.read_len_prefixed(at + 4)?;
        let template = if bits & LEMMA_HAS_TEMPLATE != 0 {
            // Length byte and headword are padded to a whole number of words
            let block = (1 + raw.len()).next_multiple_of(4);
            Some(self.header.templates + self.buf.read_u32(at + 4 + block)? as usize)
        } else {
            None
        };
        Ok(LemmaRecord {
            raw: raw.to_vec(),
            headword: self.encoding.decode(raw),
            domain: format::domain_tag(bits & LEMMA_DOMAIN_MASK),
            template,
        })
    }

    /// Every inflected form of a lemma, ending with the headword itself.
    ///
    /// A lemma without a template yields just its headword.
    pub fn lemma_forms(&self, lemma_id: u32) -> Result<Vec<String>> {
        let lemma = self.lemma(lemma_id)?;
        let mut forms = match lemma.template {
            Some(at) => self.read_template(at, &lemma.raw)?,
            None => Vec::new(),
        };
        forms.push(lemma.raw);
        Ok(forms.iter().map(|f| self.encoding.decode(f)).collect())
    }

    fn read_template(&self, mut at: usize, headword: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut forms = Vec::new();
        let mut last = headword.to_vec();
        loop {
            let c = self.buf.read_u8(at)?;
            at += 1;
            if c == 0 {
                break;
            }
            let (cut, len) = if c & 0x80 != 0 {
                let len = self.buf.read_u8(at)? as usize;
                at += 1;
                ((c & 0x7F) as usize, len)
            } else {
                let cut = (c >> 3) as usize;
                let len = cut as isize + (c & 3) as isize - (c & 4) as isize;
                let len = usize::try_from(len)
                    .map_err(|_| BinError::decode(format!("template byte {c:#04x} at {at}")))?;
                (cut, len)
            };
            let keep = last.len().checked_sub(cut).ok_or_else(|| {
                BinError::decode(format!("template cuts {cut} bytes from a {}-byte form", last.len()))
            })?;
            let suffix = self.buf.slice(at, len)?;
            at += len;

            last.truncate(keep);
            last.extend_from_slice(suffix);
            forms.push(last.clone());
        }
        Ok(forms)
    }

    /// Extended attributes of a ksnid record; index 0 yields the defaults.
    pub fn attributes(&self, ksnid: u32) -> Result<ExtendedAttributes> {
        if ksnid == 0 {
            return Ok(ExtendedAttributes::default());
        }
        let at = self
            .buf
            .read_u32_at_index(self.header.ksnid, ksnid as usize)? as usize;
        let record = self.buf.read_len_prefixed(at)?;
        ExtendedAttributes::parse(&self.encoding.decode(record))
    }

    /// Decode one packed entry. `carried` holds the lemma id of the previous
    /// entry in the sequence and is updated.
    pub fn decode(
        &self,
        packed: &PackedEntry,
        carried: &mut Option<u32>,
        surface: &str,
    ) -> Result<MorphEntry> {
        let lemma_id = packed.resolve_lemma_id(carried)?;
        let (word_class, tag) = self.meaning(packed.meaning())?;
        let lemma = self.lemma(lemma_id)?;
        Ok(MorphEntry {
            headword: lemma.headword,
            lemma_id,
            word_class,
            domain: lemma.domain.to_string(),
            surface: surface.to_string(),
            tag,
        })
    }

    pub fn decode_extended(
        &self,
        packed: &PackedEntry,
        carried: &mut Option<u32>,
        surface: &str,
    ) -> Result<ExtendedEntry> {
        let entry = self.decode(packed, carried, surface)?;
        // A damaged attribute record must not hide the reading itself
        let attributes = self.attributes(packed.ksnid()).unwrap_or_else(|e| {
            debug!("default attributes for {surface:?}: {e}");
            ExtendedAttributes::default()
        });
        Ok(ExtendedEntry::new(entry, attributes))
    }

    /// All decodable entries for a trie value. Damaged entries are skipped.
    pub fn entries(&self, offset: u32, surface: &str) -> Vec<MorphEntry> {
        self.decode_all(offset, surface, |packed, carried| {
            self.decode(packed, carried, surface)
        })
    }

    pub fn extended_entries(&self, offset: u32, surface: &str) -> Vec<ExtendedEntry> {
        self.decode_all(offset, surface, |packed, carried| {
            self.decode_extended(packed, carried, surface)
        })
    }

    fn decode_all<T, F>(&self, offset: u32, surface: &str, decode: F) -> Vec<T>
    where
        F: Fn(&PackedEntry, &mut Option<u32>) -> Result<T>,
    {
        let mut carried = None;
        self.meanings_for(offset)
            .iter()
            .filter_map(|packed| match decode(packed, &mut carried) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("skipping entry of {surface:?}: {e}");
                    None
                }
            })
            .collect()
    }
}
