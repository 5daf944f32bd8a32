//! Grammatical variant search.
//!
//! Given a word, find other inflected forms of the same lemma that carry a
//! requested set of features, e.g. the dative plural of a noun:
//!
//! ```no_run
//! use bindb::{Bin, BinConfig};
//! use bindb::variants::VariantQuery;
//!
//! # fn main() -> bindb::error::Result<()> {
//! let bin = Bin::open(BinConfig::new("ord.compressed"))?;
//! let query = VariantQuery::new("no").require("ÞGF").require("FT");
//! for entry in bin.lookup_variants("hestur", &query) {
//!     println!("{} {}", entry.surface(), entry.tag());
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::database::Database;
use crate::record::ExtendedEntry;

/// Noun classes matched by the `no` category.
pub(crate) const NOUN_CLASSES: [&str; 3] = ["kk", "kvk", "hk"];

/// A constraint on the inflection tag of a variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagRequirement {
    /// The tag must contain this substring.
    Contains(String),
    /// The tag must not carry the definite article (`gr`).
    Indefinite,
}

impl TagRequirement {
    /// Parse a requirement; `nogr` means indefinite.
    pub fn parse(requirement: &str) -> Self {
        if requirement == "nogr" {
            TagRequirement::Indefinite
        } else {
            TagRequirement::Contains(requirement.to_string())
        }
    }

    pub fn matches(&self, tag: &str) -> bool {
        match self {
            TagRequirement::Contains(feature) => tag.contains(feature.as_str()),
            TagRequirement::Indefinite => !tag.contains("gr"),
        }
    }
}

impl From<&str> for TagRequirement {
    fn from(requirement: &str) -> Self {
        TagRequirement::parse(requirement)
    }
}

pub(crate) type TagPredicate<'a> = Box<dyn Fn(&str) -> bool + Send + Sync + 'a>;

/// Parameters of a variant search.
pub struct VariantQuery<'a> {
    category: String,
    requirements: Vec<TagRequirement>,
    lemma: Option<String>,
    lemma_id: u32,
    predicate: Option<TagPredicate<'a>>,
}

impl<'a> VariantQuery<'a> {
    /// Search within a word class; `no` matches any noun gender.
    pub fn new(category: &str) -> Self {
        VariantQuery {
            category: category.to_string(),
            requirements: Vec::new(),
            lemma: None,
            lemma_id: 0,
            predicate: None,
        }
    }

    pub fn require<R: Into<TagRequirement>>(mut self, requirement: R) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    pub fn requirements<I, R>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<TagRequirement>,
    {
        self.requirements
            .extend(requirements.into_iter().map(Into::into));
        self
    }

    /// Only consider readings of the word with this headword.
    pub fn lemma(mut self, lemma: &str) -> Self {
        self.lemma = Some(lemma.to_string());
        self
    }

    /// Only consider readings with this lemma id; 0 lifts the restriction.
    pub fn lemma_id(mut self, lemma_id: u32) -> Self {
        self.lemma_id = lemma_id;
        self
    }

    /// Only consider readings whose own tag is accepted by `predicate`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'a,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    fn matches_class(&self, word_class: &str) -> bool {
        if self.category == "no" {
            NOUN_CLASSES.contains(&word_class)
        } else {
            self.category == word_class
        }
    }

    fn accepts_candidate(&self, candidate: &ExtendedEntry) -> bool {
        self.matches_class(candidate.word_class())
            && self
                .lemma
                .as_deref()
                .is_none_or(|lemma| candidate.headword() == lemma)
            && (self.lemma_id == 0 || candidate.lemma_id() == self.lemma_id)
            && self
                .predicate
                .as_ref()
                .is_none_or(|predicate| predicate(candidate.tag()))
    }

    fn accepts_tag(&self, tag: &str) -> bool {
        self.requirements.iter().all(|r| r.matches(tag))
    }
}

impl fmt::Debug for VariantQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantQuery")
            .field("category", &self.category)
            .field("requirements", &self.requirements)
            .field("lemma", &self.lemma)
            .field("lemma_id", &self.lemma_id)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Inflected forms of every reading of `word` matching `query`, sorted by
/// surface form and tag without duplicates.
pub fn variants(db: &Database, word: &str, query: &VariantQuery<'_>) -> Vec<ExtendedEntry> {
    let mut found: BTreeMap<(String, String), ExtendedEntry> = BTreeMap::new();
    let mut visited = Vec::new();

    for candidate in db.extended_entries(word) {
        if !query.accepts_candidate(&candidate) {
            continue;
        }
        let key = (candidate.lemma_id(), candidate.word_class().to_string());
        if visited.contains(&key) {
            continue;
        }
        visited.push(key);

        for form in lemma_forms(db, candidate.lemma_id(), candidate.headword()) {
            for variant in db.extended_entries(&form) {
                if variant.headword() == candidate.headword()
                    && variant.word_class() == candidate.word_class()
                    && query.accepts_tag(variant.tag())
                {
                    found
                        .entry((variant.surface().to_string(), variant.tag().to_string()))
                        .or_insert(variant);
                }
            }
        }
    }
    found.into_values().collect()
}

/// Forms to probe for a lemma; just the headword when the lemma has no
/// usable template.
pub(crate) fn lemma_forms(db: &Database, lemma_id: u32, headword: &str) -> Vec<String> {
    let mut forms = db.decoder().lemma_forms(lemma_id).unwrap_or_else(|e| {
        log::debug!("no forms for lemma {lemma_id}: {e}");
        Vec::new()
    });
    if forms.is_empty() {
        forms.push(headword.to_string());
    }
    forms.sort();
    forms.dedup();
    forms
}
