//! Case inflection.
//!
//! [`lookup_case`] finds the forms of a word's lemmas in another
//! grammatical case while keeping its other features (number,
//! definiteness, degree) unless a [`CaseQuery`] relaxes them:
//!
//! ```no_run
//! use bindb::case::{Case, CaseQuery};
//! use bindb::{Bin, BinConfig};
//!
//! # fn main() -> bindb::error::Result<()> {
//! let bin = Bin::open(BinConfig::new("ord.compressed"))?;
//! let query = CaseQuery::new().category("no").singular();
//! for entry in bin.lookup_case("hestunum", Case::Genitive, &query) {
//!     println!("{} {}", entry.surface, entry.tag);
//! }
//! assert_eq!(bin.cast_to_dative("Hestur"), "Hesti");
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::record::MorphEntry;
use crate::variants::{self, NOUN_CLASSES, TagPredicate};

/// Case markers and alternate-declension digits removed before comparing tags.
const CASE_NOISE: [&str; 6] = ["NF", "ÞF", "ÞGF", "EF", "2", "3"];

/// A grammatical case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Case {
    Nominative,
    Accusative,
    Dative,
    Genitive,
}

impl Case {
    pub const ALL: [Case; 4] = [
        Case::Nominative,
        Case::Accusative,
        Case::Dative,
        Case::Genitive,
    ];

    /// Tag marker of the case.
    pub fn marker(self) -> &'static str {
        match self {
            Case::Nominative => "NF",
            Case::Accusative => "ÞF",
            Case::Dative => "ÞGF",
            Case::Genitive => "EF",
        }
    }

    /// Parse a case marker such as `ÞGF`, in any letter case.
    pub fn parse(marker: &str) -> Option<Self> {
        let marker = marker.to_uppercase();
        Case::ALL.into_iter().find(|case| case.marker() == marker)
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Constraints of a case lookup.
///
/// `singular` forces singular forms even for a plural word; it never forces
/// plural. `indefinite` likewise drops the article and weak adjective
/// declension. `all_forms` returns every number and definiteness.
#[derive(Default)]
pub struct CaseQuery<'a> {
    singular: bool,
    indefinite: bool,
    all_forms: bool,
    category: Option<String>,
    lemma: Option<String>,
    lemma_id: u32,
    predicate: Option<TagPredicate<'a>>,
}

impl<'a> CaseQuery<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singular(mut self) -> Self {
        self.singular = true;
        self
    }

    pub fn indefinite(mut self) -> Self {
        self.indefinite = true;
        self
    }

    pub fn all_forms(mut self) -> Self {
        self.all_forms = true;
        self
    }

    /// Only consider readings of this word class; `no` matches any noun
    /// gender.
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn lemma(mut self, lemma: &str) -> Self {
        self.lemma = Some(lemma.to_string());
        self
    }

    /// Only consider readings with this lemma id; 0 lifts the restriction.
    pub fn lemma_id(mut self, lemma_id: u32) -> Self {
        self.lemma_id = lemma_id;
        self
    }

    /// Only return forms whose tag is accepted by `predicate`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'a,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    fn accepts_candidate(&self, candidate: &MorphEntry) -> bool {
        let class = candidate.word_class.as_str();
        self.category.as_deref().is_none_or(|category| {
            if category == "no" {
                NOUN_CLASSES.contains(&class)
            } else {
                category == class
            }
        }) && self
            .lemma
            .as_deref()
            .is_none_or(|lemma| candidate.headword == lemma)
            && (self.lemma_id == 0 || candidate.lemma_id == self.lemma_id)
    }

    /// The tag without the features this query lets vary.
    fn simplify(&self, tag: &str) -> String {
        let mut tag = tag.to_string();
        for noise in CASE_NOISE {
            tag = tag.replace(noise, "");
        }
        if self.singular || self.all_forms {
            tag = tag.replace("ET", "").replace("FT", "");
        }
        if self.indefinite || self.all_forms {
            // Degree is kept, weak and strong declension are not
            tag = tag
                .replace("gr", "")
                .replace("EVB", "ESB")
                .replace("FVB", "FSB");
        }
        tag
    }

    fn accepts_form(&self, case: Case, tag: &str, wanted: &str) -> bool {
        if !tag.contains(case.marker()) {
            return false;
        }
        if !self.all_forms {
            if self.singular && !tag.contains("ET") {
                return false;
            }
            if self.indefinite && ["gr", "FVB", "EVB"].iter().any(|f| tag.contains(f)) {
                return false;
            }
        }
        self.predicate
            .as_ref()
            .is_none_or(|predicate| predicate(tag))
            && self.simplify(tag) == wanted
    }
}

impl fmt::Debug for CaseQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseQuery")
            .field("singular", &self.singular)
            .field("indefinite", &self.indefinite)
            .field("all_forms", &self.all_forms)
            .field("category", &self.category)
            .field("lemma", &self.lemma)
            .field("lemma_id", &self.lemma_id)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Forms in `case` of the lemmas of the exact form `word`, keeping the
/// features of each reading that `query` does not relax.
pub fn lookup_case(db: &Database, word: &str, case: Case, query: &CaseQuery<'_>) -> Vec<MorphEntry> {
    let mut found = BTreeSet::new();
    for candidate in db.entries(word) {
        if !query.accepts_candidate(&candidate) {
            continue;
        }
        let wanted = query.simplify(&candidate.tag);
        for form in variants::lemma_forms(db, candidate.lemma_id, &candidate.headword) {
            // Forms may also belong to other lemmas and classes
            found.extend(db.entries(&form).into_iter().filter(|entry| {
                entry.lemma_id == candidate.lemma_id
                    && entry.headword == candidate.headword
                    && entry.word_class == candidate.word_class
                    && query.accepts_form(case, &entry.tag, &wanted)
            }));
        }
    }
    found.into_iter().collect()
}

/// Every nominative form of every lemma of the exact form `word`, with no
/// other filtering.
pub fn raw_nominative(db: &Database, word: &str) -> Vec<MorphEntry> {
    let mut found = BTreeSet::new();
    for candidate in db.entries(word) {
        for form in variants::lemma_forms(db, candidate.lemma_id, &candidate.headword) {
            found.extend(
                db.entries(&form)
                    .into_iter()
                    .filter(|entry| entry.tag.contains(Case::Nominative.marker())),
            );
        }
    }
    found.into_iter().collect()
}
