//! Accessors for the grammatical features encoded in an inflection tag.
//!
//! Tags are compact strings such as `ÞGFETgr` (dative, singular, definite)
//! or `FSB-KVK-NFFT` (adjective, strong, feminine, nominative, plural).

/// Case markers, longest first so that `ÞGF` is not read as something shorter.
const CASES: [&str; 4] = ["ÞGF", "NF", "ÞF", "EF"];
const NUMBERS: [&str; 2] = ["ET", "FT"];
const GENDERS: [&str; 3] = ["KVK", "KK", "HK"];

/// Whether `tag` contains `feature`.
pub fn contains(tag: &str, feature: &str) -> bool {
    tag.contains(feature)
}

fn first_of<'a>(tag: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|c| tag.contains(c))
}

/// `NF`, `ÞF`, `ÞGF` or `EF`.
pub fn case(tag: &str) -> Option<&'static str> {
    first_of(tag, &CASES)
}

/// `ET` or `FT`.
pub fn number(tag: &str) -> Option<&'static str> {
    first_of(tag, &NUMBERS)
}

/// `KK`, `KVK` or `HK`.
pub fn gender(tag: &str) -> Option<&'static str> {
    first_of(tag, &GENDERS)
}

pub fn is_definite(tag: &str) -> bool {
    tag.contains("gr")
}

pub fn is_indefinite(tag: &str) -> bool {
    !is_definite(tag)
}
