//! Read-only DAWG automatons for compound-word prefixes and suffixes.
//!
//! A DAWG image is a 16-byte header followed by packed `u32` nodes. Each
//! node holds one letter, an end-of-word flag, an end-of-sibling-list flag
//! and the index of its first child. Siblings are stored contiguously, so a
//! level is scanned linearly until the letter matches or the list ends.

use std::path::Path;

use log::info;

use crate::error::{BinError, Result};
use crate::storage::{ByteBuffer, map_file};

pub const DAWG_MAGIC: u32 = 0x4441_5747;
pub const DAWG_VERSION: u32 = 1;
pub const DAWG_HEADER_SIZE: usize = 16;

const LETTER_MASK: u32 = 0x0000_00FF;
const CHILD_MASK: u32 = 0x3FFF_FF00;
const CHILD_SHIFT: u32 = 8;
const END_OF_WORD: u32 = 0x8000_0000;
const END_OF_LIST: u32 = 0x4000_0000;

/// An immutable word automaton.
#[derive(Debug, Clone)]
pub struct Dawg {
    buf: ByteBuffer,
    node_count: u32,
    root: usize,
}

impl Dawg {
    /// Map and validate a DAWG file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let dawg = Self::from_buffer(map_file(path)?)?;
        info!(
            "loaded DAWG {} with {} nodes",
            path.display(),
            dawg.node_count
        );
        Ok(dawg)
    }

    /// Validate an already loaded DAWG image.
    pub fn from_buffer(buf: ByteBuffer) -> Result<Self> {
        if buf.len() < DAWG_HEADER_SIZE {
            return Err(BinError::load(format!(
                "DAWG image of {} bytes is shorter than its header",
                buf.len()
            )));
        }
        let magic = buf.read_u32(0)?;
        if magic != DAWG_MAGIC {
            return Err(BinError::signature(format!(
                "expected DAWG magic {DAWG_MAGIC:#010x}, found {magic:#010x}"
            )));
        }
        let version = buf.read_u32(4)?;
        if version != DAWG_VERSION {
            return Err(BinError::load(format!(
                "unsupported DAWG version {version}"
            )));
        }
        Ok(Dawg {
            node_count: buf.read_u32(8)?,
            root: buf.read_u32(12)? as usize,
            buf,
        })
    }

    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    /// Whether `word` is accepted by the automaton.
    pub fn contains(&self, word: &[u8]) -> bool {
        if word.is_empty() {
            return false;
        }
        let mut list = self.root;
        for (i, &letter) in word.iter().enumerate() {
            let Some(node) = self.find_sibling(list, letter) else {
                return false;
            };
            if i + 1 == word.len() {
                return node & END_OF_WORD != 0;
            }
            let child = ((node & CHILD_MASK) >> CHILD_SHIFT) as usize;
            if child == 0 {
                return false;
            }
            list = child * 4;
        }
        false
    }

    /// Split `word` after the shortest non-empty proper prefix accepted by
    /// this automaton, i.e. the split with the longest suffix.
    pub fn find_best_split<'a>(&self, word: &'a [u8]) -> Option<(&'a [u8], &'a [u8])> {
        (1..word.len())
            .find(|&at| self.contains(&word[..at]))
            .map(|at| word.split_at(at))
    }

    /// Scan the sibling list at byte offset `list` for `letter`.
    fn find_sibling(&self, mut list: usize, letter: u8) -> Option<u32> {
        loop {
            let node = self.buf.read_u32(list).ok()?;
            if node & LETTER_MASK == u32::from(letter) {
                return Some(node);
            }
            if node & END_OF_LIST != 0 {
                return None;
            }
            list += 4;
        }
    }
}
