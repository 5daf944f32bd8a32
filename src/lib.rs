//! # bindb
//!
//! Lookup engine for the compressed BÍN database of Icelandic inflection.
//!
//! ## Features
//!
//! - Memory-mapped, bounds-checked access to the compressed image
//! - Exact form lookup through a packed radix trie
//! - Extended attributes (correctness grades, register, cross-references)
//! - Compound word synthesis from prefix and suffix automatons
//! - Grammatical variant search under tag constraints
//! - Case inflection and casting of nominative words
//! - Shared LRU caches and parallel batch lookup
//!
//! ```no_run
//! use bindb::{Bin, BinConfig};
//!
//! # fn main() -> bindb::error::Result<()> {
//! let bin = Bin::open(BinConfig::new("resources/ord.compressed"))?;
//! let (key, entries) = bin.lookup("hestinum", false, false);
//! for entry in &entries {
//!     println!("{key}: {} {} {}", entry.headword, entry.word_class, entry.tag);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod case;
pub mod compound;
pub mod config;
pub mod database;
pub mod dawg;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod format;
pub mod marks;
pub mod record;
pub mod storage;
pub mod trie;
pub mod variants;

#[cfg(test)]
mod test_utils;

pub use config::BinConfig;
pub use engine::Bin;
pub use record::{ExtendedAttributes, ExtendedEntry, MorphEntry};

pub mod prelude {
    pub use crate::case::{Case, CaseQuery};
    pub use crate::config::BinConfig;
    pub use crate::engine::{Bin, LookupResult};
    pub use crate::error::{BinError, Result};
    pub use crate::record::{ExtendedAttributes, ExtendedEntry, MorphEntry};
    pub use crate::variants::{TagRequirement, VariantQuery};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
