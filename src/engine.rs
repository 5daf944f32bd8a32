//! The dictionary engine.
//!
//! [`Bin`] ties a loaded [`Database`] to the optional compound resolver and
//! implements the full lookup flow: exact lookup, case variations at the
//! start of a sentence, compound words, `ó`-negated adjectives and the old
//! `z` spelling.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::case::{self, Case, CaseQuery};
use crate::compound::{self, CompoundPart, CompoundResolver};
use crate::config::BinConfig;
use crate::database::Database;
use crate::dawg::Dawg;
use crate::encoding::{Latin1, WordEncoding};
use crate::error::Result;
use crate::format::SYNTHESIZED_LEMMA_ID;
use crate::record::{ExtendedEntry, MorphEntry};
use crate::variants::{self, VariantQuery};

/// Word class of adjectives, the only class negated with `ó`.
const ADJECTIVE: &str = "lo";

/// Word classes other than adjectives that [`Bin::cast_to_case`] inflects.
const CASTABLE: [&str; 7] = ["kk", "kvk", "hk", "fn", "pfn", "to", "gr"];

/// Result of a lookup: the form that was matched and its entries.
pub type LookupResult<T> = (String, Vec<T>);

/// An entry type the lookup flow can produce.
trait Reading: CompoundPart {
    fn morph(&self) -> &MorphEntry;
    fn morph_mut(&mut self) -> &mut MorphEntry;
}

impl Reading for MorphEntry {
    fn morph(&self) -> &MorphEntry {
        self
    }

    fn morph_mut(&mut self) -> &mut MorphEntry {
        self
    }
}

impl Reading for ExtendedEntry {
    fn morph(&self) -> &MorphEntry {
        &self.entry
    }

    fn morph_mut(&mut self) -> &mut MorphEntry {
        &mut self.entry
    }
}

/// Whether the word has cased characters and all of them are lowercase.
fn is_lowercase(word: &str) -> bool {
    word.chars().any(char::is_lowercase) && !word.chars().any(char::is_uppercase)
}

fn is_uppercase(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Give `form` the letter case of `word`.
fn imitate_case(word: &str, form: &str) -> String {
    if is_uppercase(word) {
        form.to_uppercase()
    } else if starts_uppercase(word) && !starts_uppercase(form) {
        capitalize(form)
    } else {
        form.to_string()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Prepend `front` to `back`, consuming both.
fn prepend<T>(mut front: Vec<T>, back: Vec<T>) -> Vec<T> {
    front.extend(back);
    front
}

/// A loaded Icelandic morphological dictionary.
#[derive(Debug)]
pub struct Bin {
    config: BinConfig,
    db: Database,
    compounds: Option<CompoundResolver>,
}

impl Bin {
    /// Open the dictionary described by `config` with the Latin-1 encoding.
    ///
    /// A missing or invalid prefix or suffix automaton only disables
    /// compound resolution.
    pub fn open(config: BinConfig) -> Result<Self> {
        Self::open_with_encoding(config, Arc::new(Latin1))
    }

    pub fn open_with_encoding(config: BinConfig, encoding: Arc<dyn WordEncoding>) -> Result<Self> {
        config.validate()?;
        let db = Database::open(&config.database_path, encoding, config.lookup_cache_capacity)?;
        let compounds = if config.add_compounds {
            Self::open_compounds(&config)
        } else {
            None
        };
        info!(
            "dictionary ready, compound resolution {}",
            if compounds.is_some() { "enabled" } else { "disabled" }
        );
        Ok(Bin {
            config,
            db,
            compounds,
        })
    }

    fn open_compounds(config: &BinConfig) -> Option<CompoundResolver> {
        let open = |path: std::path::PathBuf| match Dawg::open(&path) {
            Ok(dawg) => Some(dawg),
            Err(e) => {
                warn!("compound resolution disabled, {}: {e}", path.display());
                None
            }
        };
        let prefixes = open(config.prefixes_path())?;
        let suffixes = open(config.suffixes_path())?;
        Some(CompoundResolver::new(
            prefixes,
            suffixes,
            config.compound_cache_capacity,
        ))
    }

    /// Assemble an engine from components that are already open.
    pub fn from_parts(
        config: BinConfig,
        db: Database,
        compounds: Option<CompoundResolver>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Bin {
            config,
            db,
            compounds,
        })
    }

    pub fn config(&self) -> &BinConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn compounds(&self) -> Option<&CompoundResolver> {
        self.compounds.as_ref()
    }

    /// Empty the lookup and compound caches.
    pub fn clear_caches(&self) {
        self.db.cache().clear();
        if let Some(resolver) = &self.compounds {
            resolver.cache().clear();
        }
    }

    /// Whether `word` is a form in the dictionary, as spelled.
    pub fn contains(&self, word: &str) -> bool {
        self.db.contains(word)
    }

    /// Look up a word, returning the form actually matched and its entries.
    ///
    /// With `auto_uppercase`, a lowercase word is also tried capitalized.
    /// At the start of a sentence the lowercase form is tried as well.
    pub fn lookup(
        &self,
        word: &str,
        at_sentence_start: bool,
        auto_uppercase: bool,
    ) -> LookupResult<MorphEntry> {
        self.lookup_with(word, at_sentence_start, auto_uppercase, &|key: &str| {
            self.db.entries(key)
        })
    }

    /// [`lookup`](Self::lookup) returning entries with extended attributes.
    pub fn lookup_ksnid(
        &self,
        word: &str,
        at_sentence_start: bool,
        auto_uppercase: bool,
    ) -> LookupResult<ExtendedEntry> {
        self.lookup_with(word, at_sentence_start, auto_uppercase, &|key: &str| {
            self.db.extended_entries(key)
        })
    }

    /// The lookup flow, with `exact` producing the readings of one
    /// spelling.
    fn lookup_with<T, F>(
        &self,
        word: &str,
        mut at_sentence_start: bool,
        auto_uppercase: bool,
        exact: &F,
    ) -> LookupResult<T>
    where
        T: Reading,
        F: Fn(&str) -> Vec<T>,
    {
        let mut key = word.to_string();
        let mut found = exact(word);

        if auto_uppercase && is_lowercase(word) {
            let upper = capitalize(word);
            let upper_found = exact(&upper);
            if !upper_found.is_empty() {
                key = upper;
                found = prepend(upper_found, found);
                at_sentence_start = false;
            }
        }

        if at_sentence_start || found.is_empty() {
            let lower = key.to_lowercase();
            if lower != key {
                let lower_found = exact(&lower);
                if found.is_empty() {
                    if !lower_found.is_empty() {
                        key = lower;
                        found = lower_found;
                    }
                } else {
                    // Regular lowercase readings take precedence
                    found = prepend(lower_found, found);
                }
            }
        }
        if !found.is_empty() {
            return (key, found);
        }

        if self.config.add_compounds {
            let (compound_key, compound_found) = self.compound_readings(&key, exact);
            key = compound_key;
            found = compound_found;
        }

        if found.is_empty() && self.config.add_negation {
            found = self.negated_readings(&key, exact);
        }

        if found.is_empty() && self.config.replace_z && key.contains('z') {
            let normalized = key.replace("tzt", "st").replace('z', "s");
            debug!("retrying {key:?} as {normalized:?}");
            let (normalized_key, normalized_found) =
                self.lookup_with(&normalized, at_sentence_start, auto_uppercase, exact);
            if !normalized_found.is_empty() {
                key = normalized_key;
                found = normalized_found;
            }
        }
        (key, found)
    }

    fn compound_readings<T, F>(&self, word: &str, exact: &F) -> LookupResult<T>
    where
        T: Reading,
        F: Fn(&str) -> Vec<T>,
    {
        if compound::hyphen_split(word).is_some() {
            return (word.to_string(), compound::resolve_hyphenated_with(word, exact));
        }
        let Some(resolver) = &self.compounds else {
            return (word.to_string(), Vec::new());
        };
        let found = resolver.resolve_with(&self.db, word, exact);
        if found.is_empty() {
            let lower = word.to_lowercase();
            if lower != word {
                let lower_found = resolver.resolve_with(&self.db, &lower, exact);
                if !lower_found.is_empty() {
                    return (lower, lower_found);
                }
            }
        }
        (word.to_string(), found)
    }

    /// Adjectives `x` yield readings for the negated `óx`.
    fn negated_readings<T, F>(&self, word: &str, exact: &F) -> Vec<T>
    where
        T: Reading,
        F: Fn(&str) -> Vec<T>,
    {
        let lower = word.to_lowercase();
        let Some(base) = lower.strip_prefix('ó').filter(|base| !base.is_empty()) else {
            return Vec::new();
        };
        exact(base)
            .into_iter()
            .filter(|reading| reading.morph().word_class == ADJECTIVE)
            .map(|mut reading| {
                let entry = reading.morph_mut();
                entry.headword.insert(0, 'ó');
                entry.surface.insert(0, 'ó');
                reading
            })
            .collect()
    }

    /// Every form of a lemma with its extended attributes, sorted by
    /// surface form and tag.
    pub fn lookup_id(&self, lemma_id: u32) -> Vec<ExtendedEntry> {
        if lemma_id == SYNTHESIZED_LEMMA_ID {
            return Vec::new();
        }
        let mut found: BTreeMap<(String, String), ExtendedEntry> = BTreeMap::new();
        for form in self.lemma_forms(lemma_id) {
            for entry in self.db.extended_entries(&form) {
                if entry.lemma_id() == lemma_id {
                    found
                        .entry((entry.surface().to_string(), entry.tag().to_string()))
                        .or_insert(entry);
                }
            }
        }
        found.into_values().collect()
    }

    /// All inflected forms of a lemma; empty if the lemma is unknown.
    pub fn lemma_forms(&self, lemma_id: u32) -> Vec<String> {
        self.db
            .decoder()
            .lemma_forms(lemma_id)
            .unwrap_or_else(|e| {
                debug!("no forms for lemma {lemma_id}: {e}");
                Vec::new()
            })
    }

    /// Inflected variants of `word`; see [`VariantQuery`].
    ///
    /// The word goes through the lookup flow, so capitalized words,
    /// compounds and old spellings find their variants too. Readings
    /// reserved for compounds are only produced as compound parts.
    pub fn lookup_variants(&self, word: &str, query: &VariantQuery<'_>) -> Vec<ExtendedEntry> {
        let (_, found) = self.lookup_with(word, false, false, &|key: &str| {
            variants::variants(&self.db, key, query)
        });
        found
            .into_iter()
            .filter(|e| e.lemma_id() == SYNTHESIZED_LEMMA_ID || !e.attributes.is_compound_only())
            .collect()
    }

    /// Forms in `case` of the lemmas of the exact form `word`; see
    /// [`CaseQuery`].
    pub fn lookup_case(&self, word: &str, case: Case, query: &CaseQuery<'_>) -> Vec<MorphEntry> {
        case::lookup_case(&self.db, word, case, query)
    }

    pub fn lookup_nominative(&self, word: &str, query: &CaseQuery<'_>) -> Vec<MorphEntry> {
        self.lookup_case(word, Case::Nominative, query)
    }

    pub fn lookup_accusative(&self, word: &str, query: &CaseQuery<'_>) -> Vec<MorphEntry> {
        self.lookup_case(word, Case::Accusative, query)
    }

    pub fn lookup_dative(&self, word: &str, query: &CaseQuery<'_>) -> Vec<MorphEntry> {
        self.lookup_case(word, Case::Dative, query)
    }

    pub fn lookup_genitive(&self, word: &str, query: &CaseQuery<'_>) -> Vec<MorphEntry> {
        self.lookup_case(word, Case::Genitive, query)
    }

    /// Every nominative form of the lemmas of the exact form `word`.
    pub fn lookup_raw_nominative(&self, word: &str) -> Vec<MorphEntry> {
        case::raw_nominative(&self.db, word)
    }

    /// All forms of `lemma` in `case`, singular and plural, with and
    /// without the article.
    pub fn lookup_forms(&self, lemma: &str, category: &str, case: Case) -> Vec<MorphEntry> {
        let query = CaseQuery::new()
            .all_forms()
            .category(category)
            .lemma(lemma);
        self.lookup_case(lemma, case, &query)
    }

    /// Cast a nominative word to `case`, or return it unchanged when it
    /// does not inflect by case.
    ///
    /// Without context the choice is simplistic: the first adjective reading
    /// wins, then the first noun, pronoun, numeral or article reading.
    pub fn cast_to_case(&self, word: &str, case: Case) -> String {
        self.cast_to_case_with(word, case, |forms| forms)
    }

    /// [`cast_to_case`](Self::cast_to_case) with `filter` narrowing the
    /// candidate forms; the first remaining form is used.
    pub fn cast_to_case_with<F>(&self, word: &str, case: Case, filter: F) -> String
    where
        F: FnOnce(Vec<MorphEntry>) -> Vec<MorphEntry>,
    {
        let (_, readings) = self.lookup(word, false, false);
        let adjective = readings
            .iter()
            .find(|m| m.word_class == ADJECTIVE && m.tag.contains("NF"));

        let (reading, mut forms) = match adjective {
            Some(reading) => {
                let query = CaseQuery::new().category(ADJECTIVE).lemma(&reading.headword);
                let mut forms = self.lookup_case(&reading.surface, case, &query);
                if let Some(declension) = ["VB", "SB"].into_iter().find(|d| reading.tag.contains(d)) {
                    forms.retain(|f| f.tag.contains(declension));
                }
                (reading, forms)
            }
            None => {
                let Some(reading) = readings.iter().find(|m| {
                    CASTABLE.contains(&m.word_class.as_str()) && m.tag.contains("NF")
                }) else {
                    return word.to_string();
                };
                (reading, self.cast_forms(word, reading, case))
            }
        };

        if let Some(number) = ["ET", "FT"].into_iter().find(|n| reading.tag.contains(n)) {
            forms.retain(|f| f.tag.contains(number));
        }
        match filter(forms).first() {
            Some(form) => imitate_case(word, &form.surface),
            None => word.to_string(),
        }
    }

    /// Case forms for a noun-like reading of `word`.
    fn cast_forms(&self, word: &str, reading: &MorphEntry, case: Case) -> Vec<MorphEntry> {
        match reading.surface.rsplit_once('-') {
            // A compound found by the resolver inflects its last part
            Some((prefix, last)) if !word.contains('-') => {
                let prefix = prefix.replace('-', "");
                let lemma = reading
                    .headword
                    .rsplit_once('-')
                    .map_or(reading.headword.as_str(), |(_, lemma)| lemma);
                let query = CaseQuery::new().category(&reading.word_class).lemma(lemma);
                self.lookup_case(last, case, &query)
                    .into_iter()
                    .map(|mut form| {
                        form.headword.insert_str(0, &prefix);
                        form.surface.insert_str(0, &prefix);
                        form.lemma_id = SYNTHESIZED_LEMMA_ID;
                        form
                    })
                    .collect()
            }
            _ => {
                let query = CaseQuery::new()
                    .category(&reading.word_class)
                    .lemma(&reading.headword);
                let forms = self.lookup_case(word, case, &query);
                if forms.is_empty() && starts_uppercase(word) && !is_uppercase(word) {
                    self.lookup_case(&word.to_lowercase(), case, &query)
                } else {
                    forms
                }
            }
        }
    }

    pub fn cast_to_accusative(&self, word: &str) -> String {
        self.cast_to_case(word, Case::Accusative)
    }

    pub fn cast_to_dative(&self, word: &str) -> String {
        self.cast_to_case(word, Case::Dative)
    }

    pub fn cast_to_genitive(&self, word: &str) -> String {
        self.cast_to_case(word, Case::Genitive)
    }

    /// Word classes of every reading of `word`.
    pub fn lookup_cats(&self, word: &str, at_sentence_start: bool) -> BTreeSet<String> {
        let (_, entries) = self.lookup(word, at_sentence_start, false);
        entries.into_iter().map(|e| e.word_class).collect()
    }

    /// `(headword, word class)` of every reading of `word`.
    pub fn lookup_lemmas_and_cats(
        &self,
        word: &str,
        at_sentence_start: bool,
    ) -> BTreeSet<(String, String)> {
        let (_, entries) = self.lookup(word, at_sentence_start, false);
        entries
            .into_iter()
            .map(|e| (e.headword, e.word_class))
            .collect()
    }

    /// Readings of `lemma` in which it is its own headword.
    pub fn lookup_lemmas(&self, lemma: &str) -> LookupResult<MorphEntry> {
        let (key, entries) = self.lookup(lemma, false, false);
        let entries = entries.into_iter().filter(|e| e.headword == key).collect();
        (key, entries)
    }

    /// Look up many words in parallel; results keep the input order.
    pub fn lookup_many<S: AsRef<str> + Sync>(&self, words: &[S]) -> Vec<LookupResult<MorphEntry>> {
        words
            .par_iter()
            .map(|word| self.lookup(word.as_ref(), false, false))
            .collect()
    }
}
