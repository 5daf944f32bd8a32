//! A loaded dictionary image: trie, record decoder and the lookup cache.

use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::cache::LruCache;
use crate::encoding::WordEncoding;
use crate::error::{BinError, Result};
use crate::format::Header;
use crate::record::{ExtendedEntry, MorphEntry, RecordDecoder};
use crate::storage::{ByteBuffer, map_file};
use crate::trie::PackedTrie;

/// Exact-form access to one dictionary image.
///
/// Trie hits are remembered in an LRU cache keyed by the encoded form.
#[derive(Debug)]
pub struct Database {
    trie: PackedTrie,
    decoder: RecordDecoder,
    encoding: Arc<dyn WordEncoding>,
    cache: LruCache<Vec<u8>, u32>,
}

impl Database {
    /// Map and validate an image file.
    pub fn open<P: AsRef<Path>>(
        path: P,
        encoding: Arc<dyn WordEncoding>,
        cache_capacity: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let db = Self::from_buffer(map_file(path)?, encoding, cache_capacity)?;
        info!("loaded dictionary {}", path.display());
        Ok(db)
    }

    /// Validate an image already held in memory.
    pub fn from_buffer(
        buf: ByteBuffer,
        encoding: Arc<dyn WordEncoding>,
        cache_capacity: usize,
    ) -> Result<Self> {
        if cache_capacity == 0 {
            return Err(BinError::config("lookup cache capacity must be positive"));
        }
        let header = Header::parse(&buf)?;
        let trie = PackedTrie::new(buf.clone(), &header)?;
        info!(
            "dictionary image of {} bytes, {} alphabet characters, forms at {}, mappings at {}",
            buf.len(),
            trie.alphabet().len(),
            header.forms,
            header.mappings
        );
        Ok(Database {
            trie,
            decoder: RecordDecoder::new(buf, header, Arc::clone(&encoding)),
            encoding,
            cache: LruCache::new(cache_capacity),
        })
    }

    pub fn decoder(&self) -> &RecordDecoder {
        &self.decoder
    }

    pub fn encoding(&self) -> &Arc<dyn WordEncoding> {
        &self.encoding
    }

    /// Trie value of an encoded form, consulting the cache first.
    pub fn locate(&self, word: &[u8]) -> Option<u32> {
        if let Some(offset) = self.cache.get(word) {
            return Some(offset);
        }
        let offset = self.trie.locate(word)?;
        self.cache.put(word.to_vec(), offset);
        Some(offset)
    }

    /// Trie value of a form; unencodable words are never found.
    pub fn locate_str(&self, word: &str) -> Option<u32> {
        self.locate(&self.encoding.encode(word)?)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.locate_str(word).is_some()
    }

    /// All entries of an exact form. The surface form of each entry is `word`.
    pub fn entries(&self, word: &str) -> Vec<MorphEntry> {
        match self.locate_str(word) {
            Some(offset) => self.decoder.entries(offset, word),
            None => Vec::new(),
        }
    }

    pub fn extended_entries(&self, word: &str) -> Vec<ExtendedEntry> {
        match self.locate_str(word) {
            Some(offset) => self.decoder.extended_entries(offset, word),
            None => Vec::new(),
        }
    }

    pub fn cache(&self) -> &LruCache<Vec<u8>, u32> {
        &self.cache
    }
}
