//! Synthesis of entries for compound words missing from the dictionary.
//!
//! A compound such as `sólarolía` is split into a prefix known to the prefix
//! automaton and a suffix known to the suffix automaton. The suffix is then
//! looked up as an ordinary form and every entry found for it is rewritten
//! into a compound entry (`sólar-olía`). Words that already contain a hyphen
//! keep their own split and skip the automatons.

use log::debug;

use crate::cache::LruCache;
use crate::database::Database;
use crate::dawg::Dawg;
use crate::format::SYNTHESIZED_LEMMA_ID;
use crate::record::{ExtendedEntry, MorphEntry};

/// Rewrite an entry of `suffix` as an entry of the compound `prefix-suffix`.
pub fn compound_entry(prefix: &str, suffix: &str, entry: MorphEntry) -> MorphEntry {
    MorphEntry {
        headword: format!("{prefix}-{}", entry.headword),
        lemma_id: SYNTHESIZED_LEMMA_ID,
        surface: format!("{prefix}-{suffix}"),
        ..entry
    }
}

/// Extended variant of [`compound_entry`]; the suffix attributes are kept
/// except for the cross-reference, which no longer applies.
pub fn compound_extended_entry(prefix: &str, suffix: &str, entry: ExtendedEntry) -> ExtendedEntry {
    let mut attributes = entry.attributes;
    attributes.cross_ref = 0;
    ExtendedEntry::new(compound_entry(prefix, suffix, entry.entry), attributes)
}

/// Split at the last hyphen, if both sides are non-empty.
pub fn hyphen_split(word: &str) -> Option<(&str, &str)> {
    word.rsplit_once('-')
        .filter(|(prefix, suffix)| !prefix.is_empty() && !suffix.is_empty())
}

/// An entry that can stand as the last part of a compound.
pub trait CompoundPart: Sized {
    /// Rewrite this entry of a suffix as an entry of `prefix-suffix`.
    fn into_compound(self, prefix: &str) -> Self;
}

impl CompoundPart for MorphEntry {
    fn into_compound(self, prefix: &str) -> Self {
        let suffix = self.surface.clone();
        compound_entry(prefix, &suffix, self)
    }
}

impl CompoundPart for ExtendedEntry {
    fn into_compound(self, prefix: &str) -> Self {
        let suffix = self.entry.surface.clone();
        compound_extended_entry(prefix, &suffix, self)
    }
}

/// Entries for a word that carries its own hyphenated split, with the part
/// after the last hyphen resolved by `lookup`.
pub fn resolve_hyphenated_with<T, F>(word: &str, lookup: F) -> Vec<T>
where
    T: CompoundPart,
    F: Fn(&str) -> Vec<T>,
{
    let Some((prefix, suffix)) = hyphen_split(word) else {
        return Vec::new();
    };
    lookup(suffix)
        .into_iter()
        .map(|entry| entry.into_compound(prefix))
        .collect()
}

pub fn resolve_hyphenated(db: &Database, word: &str) -> Vec<MorphEntry> {
    resolve_hyphenated_with(word, |suffix| db.entries(suffix))
}

pub fn resolve_hyphenated_extended(db: &Database, word: &str) -> Vec<ExtendedEntry> {
    resolve_hyphenated_with(word, |suffix| db.extended_entries(suffix))
}

/// Splits compounds with a prefix and a suffix automaton.
///
/// Split decisions, including "no split", are cached per word.
#[derive(Debug)]
pub struct CompoundResolver {
    prefixes: Dawg,
    suffixes: Dawg,
    splits: LruCache<Vec<u8>, Option<usize>>,
}

impl CompoundResolver {
    pub fn new(prefixes: Dawg, suffixes: Dawg, cache_capacity: usize) -> Self {
        CompoundResolver {
            prefixes,
            suffixes,
            splits: LruCache::new(cache_capacity),
        }
    }

    pub fn prefixes(&self) -> &Dawg {
        &self.prefixes
    }

    pub fn suffixes(&self) -> &Dawg {
        &self.suffixes
    }

    pub fn cache(&self) -> &LruCache<Vec<u8>, Option<usize>> {
        &self.splits
    }

    /// Length of the prefix of the best split of an encoded word, when the
    /// remaining suffix is itself a known suffix.
    pub fn split(&self, word: &[u8]) -> Option<usize> {
        if let Some(cached) = self.splits.get(word) {
            return cached;
        }
        let split = self
            .prefixes
            .find_best_split(word)
            .filter(|(_, suffix)| self.suffixes.contains(suffix))
            .map(|(prefix, _)| prefix.len());
        self.splits.put(word.to_vec(), split);
        split
    }

    /// Best split of a word into prefix and suffix text.
    pub fn split_word(&self, db: &Database, word: &str) -> Option<(String, String)> {
        let encoding = db.encoding();
        let bytes = encoding.encode(word)?;
        let at = self.split(&bytes)?;
        let (prefix, suffix) = bytes.split_at(at);
        let (prefix, suffix) = (encoding.decode(prefix), encoding.decode(suffix));
        debug!("compound {word:?} split as {prefix:?} + {suffix:?}");
        Some((prefix, suffix))
    }

    /// Entries synthesized for a compound from the entries `lookup` finds
    /// for its suffix; empty when no split qualifies.
    pub fn resolve_with<T, F>(&self, db: &Database, word: &str, lookup: F) -> Vec<T>
    where
        T: CompoundPart,
        F: Fn(&str) -> Vec<T>,
    {
        let Some((prefix, suffix)) = self.split_word(db, word) else {
            return Vec::new();
        };
        lookup(&suffix)
            .into_iter()
            .map(|entry| entry.into_compound(&prefix))
            .collect()
    }

    /// Entries synthesized for a compound; empty when no split qualifies or
    /// the suffix is not a dictionary form.
    pub fn resolve(&self, db: &Database, word: &str) -> Vec<MorphEntry> {
        self.resolve_with(db, word, |suffix| db.entries(suffix))
    }

    pub fn resolve_extended(&self, db: &Database, word: &str) -> Vec<ExtendedEntry> {
        self.resolve_with(db, word, |suffix| db.extended_entries(suffix))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::encoding::Latin1;
    use crate::storage::ByteBuffer;
    use crate::test_utils::{ImageBuilder, dawg_image, encode};

    fn dawg(words: &[&str]) -> Dawg {
        Dawg::from_buffer(ByteBuffer::from_bytes(dawg_image(words))).unwrap()
    }

    fn database() -> Database {
        let mut builder = ImageBuilder::new();
        let olia = builder.lemma("olía", 0);
        builder.entry_with_ksnid("olía", olia, "kvk", "NFET", "1;;;55;K;1;;;");
        builder.entry("olíu", olia, "kvk", "ÞFET");
        let hnaus = builder.lemma("Hnaus", 6);
        builder.entry("Hnaus", hnaus, "hk", "NFET");
        Database::from_buffer(
            ByteBuffer::from_bytes(builder.build()),
            Arc::new(Latin1),
            16,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_compound() {
        let db = database();
        let resolver = CompoundResolver::new(dawg(&["sólar", "bíl"]), dawg(&["olía"]), 16);
        let entries = resolver.resolve(&db, "sólarolía");
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.headword, "sólar-olía");
        assert_eq!(entry.surface, "sólar-olía");
        assert_eq!(entry.lemma_id, SYNTHESIZED_LEMMA_ID);
        assert_eq!(entry.word_class, "kvk");
        assert_eq!(entry.tag, "NFET");
    }

    #[test]
    fn test_only_the_best_split_is_tried() {
        let db = database();
        // "sól" wins, and "arolía" is not a known suffix
        let resolver = CompoundResolver::new(dawg(&["sól", "sólar"]), dawg(&["olía"]), 16);
        assert!(resolver.resolve(&db, "sólarolía").is_empty());

        // A known suffix that is not a dictionary form yields nothing either
        let resolver = CompoundResolver::new(dawg(&["sól"]), dawg(&["arolía"]), 16);
        assert!(resolver.resolve(&db, "sólarolía").is_empty());
    }

    #[test]
    fn test_split_is_cached() {
        let resolver = CompoundResolver::new(dawg(&["sólar"]), dawg(&["olía"]), 4);
        let word = encode("sólarolía");
        assert_eq!(resolver.split(&word), Some(5));
        assert_eq!(resolver.cache().get(word.as_slice()), Some(Some(5)));

        let miss = encode("bensín");
        assert_eq!(resolver.split(&miss), None);
        assert_eq!(resolver.cache().get(miss.as_slice()), Some(None));
    }

    #[test]
    fn test_suffix_must_be_known_suffix() {
        let db = database();
        let resolver = CompoundResolver::new(dawg(&["bíl"]), dawg(&["olía"]), 4);
        // "olíu" is a dictionary form, but not in the suffix automaton
        assert!(resolver.resolve(&db, "bílolíu").is_empty());
        assert_eq!(resolver.resolve(&db, "bílolía").len(), 1);
    }

    #[test]
    fn test_resolve_extended_resets_cross_reference() {
        let db = database();
        let resolver = CompoundResolver::new(dawg(&["bíl"]), dawg(&["olía"]), 4);
        let entries = resolver.resolve_extended(&db, "bílolía");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].headword(), "bíl-olía");
        assert_eq!(entries[0].attributes.cross_ref, 0);
        assert!(entries[0].attributes.is_primary());
        assert_eq!(db.extended_entries("olía")[0].attributes.cross_ref, 55);
    }

    #[test]
    fn test_resolve_with_custom_lookup() {
        let db = database();
        let resolver = CompoundResolver::new(dawg(&["sólar"]), dawg(&["olía"]), 4);
        // Other forms of the suffix lemma keep their own surface
        let entries = resolver.resolve_with(&db, "sólarolía", |suffix| {
            assert_eq!(suffix, "olía");
            db.entries("olíu")
        });
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].surface, "sólar-olíu");
        assert_eq!(entries[0].headword, "sólar-olía");
        assert_eq!(entries[0].tag, "ÞFET");

        let entries = resolve_hyphenated_with("Ytri-olía", |_| Vec::<MorphEntry>::new());
        assert!(entries.is_empty());
        assert_eq!(
            resolver.split_word(&db, "sólarolía"),
            Some(("sólar".to_string(), "olía".to_string()))
        );
    }

    #[test]
    fn test_hyphenated() {
        let db = database();
        let entries = resolve_hyphenated(&db, "Ytri-Hnaus");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].headword, "Ytri-Hnaus");
        assert_eq!(entries[0].surface, "Ytri-Hnaus");
        assert_eq!(entries[0].domain, "lönd");
        assert_eq!(entries[0].lemma_id, 0);

        assert!(resolve_hyphenated(&db, "Ytri-").is_empty());
        assert!(resolve_hyphenated(&db, "-olía").is_empty());
        assert_eq!(resolve_hyphenated_extended(&db, "sólar-olíu").len(), 1);
        assert_eq!(hyphen_split("a-b-c"), Some(("a-b", "c")));
    }
}
