//! Public lookup result types.

use serde::{Deserialize, Serialize};

use crate::error::{BinError, Result};

/// One morphological analysis of a word form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MorphEntry {
    /// Lemma headword (`ord`).
    pub headword: String,
    /// Lemma identifier; `0` for synthesized entries.
    pub lemma_id: u32,
    /// Word class such as `kk`, `so` or `lo` (`ofl`).
    pub word_class: String,
    /// Semantic domain such as `alm` or `ism` (`hluti`).
    pub domain: String,
    /// The form that was looked up (`bmynd`).
    pub surface: String,
    /// Inflection tag such as `ÞGFETgr` (`mark`).
    pub tag: String,
}

/// The extra attributes attached to an extended entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtendedAttributes {
    /// Correctness grade of the lemma (`einkunn`), 0..5.
    pub grade: u8,
    /// Register of the lemma (`malsnid`).
    pub register: String,
    /// Grammatical note (`malfraedi`).
    pub grammar: String,
    /// Cross-reference to a related lemma id, `0` if none (`millivisun`).
    pub cross_ref: u32,
    /// `K` for core vocabulary, other values for secondary (`birting`).
    pub visibility: String,
    /// Correctness grade of the form (`beinkunn`).
    pub form_grade: u8,
    /// Register of the form (`bmalsnid`).
    pub form_register: String,
    /// Special-form marker (`bgildi`).
    pub special_form: String,
    /// Alternative headword (`aukafletta`).
    pub alt_headword: String,
}

impl Default for ExtendedAttributes {
    fn default() -> Self {
        ExtendedAttributes {
            grade: 1,
            register: String::new(),
            grammar: String::new(),
            cross_ref: 0,
            visibility: String::new(),
            form_grade: 1,
            form_register: String::new(),
            special_form: String::new(),
            alt_headword: String::new(),
        }
    }
}

impl ExtendedAttributes {
    /// Parse a `;`-separated record of exactly nine fields.
    ///
    /// Empty numeric fields take their defaults.
    pub fn parse(record: &str) -> Result<Self> {
        let fields: Vec<&str> = record.split(';').collect();
        let [grade, register, grammar, cross_ref, visibility, form_grade, form_register, special_form, alt_headword] =
            fields.as_slice()
        else {
            return Err(BinError::decode(format!(
                "attribute record has {} fields, expected 9: {record:?}",
                fields.len()
            )));
        };

        Ok(ExtendedAttributes {
            grade: parse_number(grade, 1)?,
            register: register.to_string(),
            grammar: grammar.to_string(),
            cross_ref: parse_number(cross_ref, 0)?,
            visibility: visibility.to_string(),
            form_grade: parse_number(form_grade, 1)?,
            form_register: form_register.to_string(),
            special_form: special_form.to_string(),
            alt_headword: alt_headword.to_string(),
        })
    }

    /// Whether the lemma belongs to the core vocabulary.
    pub fn is_primary(&self) -> bool {
        self.visibility == "K"
    }

    /// Whether the reading only occurs as the last part of a compound.
    pub fn is_compound_only(&self) -> bool {
        self.visibility == "S"
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, default: T) -> Result<T> {
    if field.is_empty() {
        return Ok(default);
    }
    field
        .parse()
        .map_err(|_| BinError::decode(format!("invalid numeric attribute {field:?}")))
}

/// A [`MorphEntry`] with its extended attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtendedEntry {
    #[serde(flatten)]
    pub entry: MorphEntry,
    #[serde(flatten)]
    pub attributes: ExtendedAttributes,
}

impl ExtendedEntry {
    pub fn new(entry: MorphEntry, attributes: ExtendedAttributes) -> Self {
        ExtendedEntry { entry, attributes }
    }

    pub fn headword(&self) -> &str {
        &self.entry.headword
    }

    pub fn lemma_id(&self) -> u32 {
        self.entry.lemma_id
    }

    pub fn word_class(&self) -> &str {
        &self.entry.word_class
    }

    pub fn surface(&self) -> &str {
        &self.entry.surface
    }

    pub fn tag(&self) -> &str {
        &self.entry.tag
    }

    /// Drop the extended attributes.
    pub fn into_entry(self) -> MorphEntry {
        self.entry
    }
}
