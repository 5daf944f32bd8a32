//! Radix trie mapping word forms to offsets into the mapping table.
//!
//! Nodes are variable-length records addressed by absolute offset. A node is
//! either a *single-character* node, whose character is an index into the
//! image alphabet packed into its header, or a *multi-character* node
//! carrying a NUL-terminated fragment. Children of a node are stored as an
//! array of absolute offsets, sorted by fragment so they can be
//! binary-searched.

use log::debug;

use crate::error::{BinError, Result};
use crate::format::{
    self, Header, NODE_CHAR_MASK, NODE_CHAR_SHIFT, NODE_CHILDLESS, NODE_NO_VALUE,
    NODE_SINGLE_CHAR, NODE_VALUE_MASK,
};
use crate::storage::ByteBuffer;

/// Outcome of comparing one child node against the remaining search word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The whole node fragment matched this many bytes of the word.
    Matched(usize),
    /// The node sorts after the word; search the lower half.
    Greater,
    /// The node sorts before the word; search the upper half.
    Lesser,
}

/// Read-only view of the form trie inside an image.
///
/// Lookups hold no state between calls and may run concurrently.
#[derive(Debug, Clone)]
pub struct PackedTrie {
    buf: ByteBuffer,
    root: usize,
    root_header: u32,
    alphabet: Vec<u8>,
}

impl PackedTrie {
    /// Prepare the trie of a validated image.
    pub fn new(buf: ByteBuffer, header: &Header) -> Result<Self> {
        let root = header.forms;
        let root_header = buf
            .read_u32(root)
            .map_err(|_| BinError::load(format!("trie root at {root} lies outside the image")))?;
        let alphabet = format::read_alphabet(&buf, header.alphabet)?;
        Ok(PackedTrie {
            buf,
            root,
            root_header,
            alphabet,
        })
    }

    /// Offset into the mapping table of the entries for `word`, or `None`
    /// if the word is not a dictionary form.
    ///
    /// Structural damage in the image reads as a miss.
    pub fn locate(&self, word: &[u8]) -> Option<u32> {
        match self.try_locate(word) {
            Ok(found) => found,
            Err(e) => {
                debug!("trie lookup of {} bytes aborted: {e}", word.len());
                None
            }
        }
    }

    pub fn contains(&self, word: &[u8]) -> bool {
        self.locate(word).is_some()
    }

    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }

    fn try_locate(&self, word: &[u8]) -> Result<Option<u32>> {
        let mut node = self.root;
        let mut header = self.root_header;
        let mut pos = 0;

        loop {
            if pos >= word.len() {
                let value = header & NODE_VALUE_MASK;
                return Ok((value != NODE_NO_VALUE).then_some(value));
            }
            if header & NODE_CHILDLESS != 0 {
                return Ok(None);
            }

            let count = self.buf.read_u32(node + 4)? as usize;
            let children = node + 8;
            let (mut lo, mut hi) = (0usize, count);
            loop {
                if lo >= hi {
                    return Ok(None);
                }
                let mid = lo + (hi - lo) / 2;
                let child = self.buf.read_u32_at_index(children, mid)? as usize;
                let child_header = self.buf.read_u32(child)?;
                match self.step(child, child_header, &word[pos..])? {
                    Step::Matched(len) => {
                        node = child;
                        header = child_header;
                        pos += len;
                        break;
                    }
                    Step::Greater => hi = mid,
                    Step::Lesser => lo = mid + 1,
                }
            }
        }
    }

    /// Compare the fragment of the node at `node` with the start of `rest`.
    /// `rest` is never empty.
    fn step(&self, node: usize, header: u32, rest: &[u8]) -> Result<Step> {
        if header & NODE_SINGLE_CHAR != 0 {
            let index = ((header >> NODE_CHAR_SHIFT) & NODE_CHAR_MASK) as usize;
            let ch = index
                .checked_sub(1)
                .and_then(|i| self.alphabet.get(i).copied())
                .ok_or_else(|| {
                    BinError::decode(format!("node at {node} has alphabet index {index}"))
                })?;
            return Ok(match ch.cmp(&rest[0]) {
                std::cmp::Ordering::Equal => Step::Matched(1),
                std::cmp::Ordering::Greater => Step::Greater,
                std::cmp::Ordering::Less => Step::Lesser,
            });
        }

        let fragment_at = if header & NODE_CHILDLESS != 0 {
            node + 4
        } else {
            let count = self.buf.read_u32(node + 4)? as usize;
            count
                .checked_mul(4)
                .and_then(|len| (node + 8).checked_add(len))
                .ok_or_else(|| BinError::decode(format!("node at {node} has {count} children")))?
        };
        let fragment = self.buf.read_cstr(fragment_at)?;

        let matched = fragment
            .iter()
            .zip(rest)
            .take_while(|(a, b)| a == b)
            .count();
        if matched == fragment.len() {
            // An empty fragment cannot advance the search
            return Ok(if matched > 0 {
                Step::Matched(matched)
            } else {
                Step::Greater
            });
        }
        if matched == rest.len() {
            // Word is a proper prefix of the fragment
            return Ok(Step::Greater);
        }
        Ok(if fragment[matched] > rest[matched] {
            Step::Greater
        } else {
            Step::Lesser
        })
    }
}
