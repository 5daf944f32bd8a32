//! Decoding of the packed 32-bit words in the mapping table.

use crate::error::{BinError, Result};
use crate::format::{
    COMPLETE_MEANING_MASK, ENTRY_COMMON_KSNID, ENTRY_KIND_COMPLETE, ENTRY_KIND_CONTINUATION,
    ENTRY_KIND_HEAD, ENTRY_KIND_MASK, ENTRY_LAST, KSNID_BITS, KSNID_MASK, LEMMA_ID_BITS,
    LEMMA_ID_MASK, MEANING_MASK,
};
use crate::storage::ByteBuffer;

/// One logical entry of a mapping sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedEntry {
    /// Single word carrying lemma id, meaning index and ksnid selector.
    Complete { lemma_id: u32, meaning: u32, ksnid: u32 },
    /// Single word reusing the lemma id of the preceding entry.
    Continuation { meaning: u32, ksnid: u32 },
    /// The second half of a two-word entry. `lemma_id` is `None` when the
    /// head word was missing from the sequence.
    SecondHalf {
        lemma_id: Option<u32>,
        meaning: u32,
        ksnid: u32,
    },
}

impl PackedEntry {
    pub fn meaning(&self) -> u32 {
        match *self {
            PackedEntry::Complete { meaning, .. }
            | PackedEntry::Continuation { meaning, .. }
            | PackedEntry::SecondHalf { meaning, .. } => meaning,
        }
    }

    pub fn ksnid(&self) -> u32 {
        match *self {
            PackedEntry::Complete { ksnid, .. }
            | PackedEntry::Continuation { ksnid, .. }
            | PackedEntry::SecondHalf { ksnid, .. } => ksnid,
        }
    }

    /// Resolve the lemma id of this entry, updating the id carried to
    /// following continuation entries.
    pub fn resolve_lemma_id(&self, carried: &mut Option<u32>) -> Result<u32> {
        match *self {
            PackedEntry::Complete { lemma_id, .. }
            | PackedEntry::SecondHalf {
                lemma_id: Some(lemma_id),
                ..
            } => {
                *carried = Some(lemma_id);
                Ok(lemma_id)
            }
            PackedEntry::Continuation { .. } => carried.ok_or_else(|| {
                BinError::decode("continuation entry without a preceding lemma id")
            }),
            PackedEntry::SecondHalf { lemma_id: None, .. } => {
                Err(BinError::decode("second half of a two-word entry without its head"))
            }
        }
    }
}

fn tail_fields(word: u32) -> (u32, u32) {
    ((word >> KSNID_BITS) & MEANING_MASK, word & KSNID_MASK)
}

/// Read the entry sequence starting at mapping index `index`.
///
/// The sequence is cut short, without error, where it runs off the buffer.
pub fn read_sequence(buf: &ByteBuffer, mappings: usize, index: u32) -> Vec<PackedEntry> {
    let mut entries = Vec::new();
    let mut at = index as usize;
    while let Ok(word) = buf.read_u32_at_index(mappings, at) {
        at += 1;
        let mut last = word & ENTRY_LAST != 0;
        let entry = match word & ENTRY_KIND_MASK {
            ENTRY_KIND_COMPLETE => PackedEntry::Complete {
                lemma_id: word & LEMMA_ID_MASK,
                meaning: (word >> LEMMA_ID_BITS) & COMPLETE_MEANING_MASK,
                ksnid: u32::from(word & ENTRY_COMMON_KSNID != 0),
            },
            ENTRY_KIND_CONTINUATION => {
                let (meaning, ksnid) = tail_fields(word);
                PackedEntry::Continuation { meaning, ksnid }
            }
            ENTRY_KIND_HEAD => {
                let Ok(tail) = buf.read_u32_at_index(mappings, at) else {
                    break;
                };
                at += 1;
                last |= tail & ENTRY_LAST != 0;
                let (meaning, ksnid) = tail_fields(tail);
                PackedEntry::SecondHalf {
                    lemma_id: Some(word & LEMMA_ID_MASK),
                    meaning,
                    ksnid,
                }
            }
            _ => {
                let (meaning, ksnid) = tail_fields(word);
                PackedEntry::SecondHalf {
                    lemma_id: None,
                    meaning,
                    ksnid,
                }
            }
        };
        entries.push(entry);
        if last {
            break;
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ENTRY_KIND_TAIL;

    fn buffer(words: &[u32]) -> ByteBuffer {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        ByteBuffer::from_bytes(bytes)
    }

    fn complete(lemma_id: u32, meaning: u32) -> u32 {
        ENTRY_KIND_COMPLETE | ENTRY_COMMON_KSNID | (meaning << LEMMA_ID_BITS) | lemma_id
    }

    #[test]
    fn test_sequence_layouts() {
        let buf = buffer(&[
            0xDEAD_BEEF,
            complete(42, 3),
            ENTRY_KIND_CONTINUATION | (300 << KSNID_BITS) | 5,
            ENTRY_KIND_HEAD | 77,
            ENTRY_LAST | ENTRY_KIND_TAIL | (900 << KSNID_BITS) | 12,
            complete(1, 1),
        ]);
        let entries = read_sequence(&buf, 0, 1);
        assert_eq!(
            entries,
            vec![
                PackedEntry::Complete {
                    lemma_id: 42,
                    meaning: 3,
                    ksnid: 1
                },
                PackedEntry::Continuation {
                    meaning: 300,
                    ksnid: 5
                },
                PackedEntry::SecondHalf {
                    lemma_id: Some(77),
                    meaning: 900,
                    ksnid: 12
                },
            ]
        );
    }

    #[test]
    fn test_last_flag_on_head() {
        let buf = buffer(&[
            ENTRY_LAST | ENTRY_KIND_HEAD | 9,
            ENTRY_KIND_TAIL | (2 << KSNID_BITS),
            complete(1, 1),
        ]);
        let entries = read_sequence(&buf, 0, 0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].meaning(), 2);
        assert_eq!(entries[0].ksnid(), 0);
    }

    #[test]
    fn test_truncated_sequence() {
        let buf = buffer(&[complete(1, 1), ENTRY_KIND_HEAD | 9]);
        let entries = read_sequence(&buf, 0, 0);
        assert_eq!(entries.len(), 1);
        assert!(read_sequence(&buf, 0, 10).is_empty());
    }

    #[test]
    fn test_lemma_id_carry() {
        let mut carried = None;
        let orphan = PackedEntry::Continuation { meaning: 0, ksnid: 0 };
        assert!(orphan.resolve_lemma_id(&mut carried).is_err());

        let first = PackedEntry::Complete {
            lemma_id: 5,
            meaning: 0,
            ksnid: 1,
        };
        assert_eq!(first.resolve_lemma_id(&mut carried).unwrap(), 5);
        assert_eq!(orphan.resolve_lemma_id(&mut carried).unwrap(), 5);

        let headless = PackedEntry::SecondHalf {
            lemma_id: None,
            meaning: 0,
            ksnid: 0,
        };
        assert!(headless.resolve_lemma_id(&mut carried).is_err());
    }
}
