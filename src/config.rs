//! Configuration for opening a dictionary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BinError, Result};

/// File name of the prefix automaton, looked up next to the database.
pub const PREFIXES_FILE: &str = "ordalisti-prefixes.dawg.bin";

/// File name of the suffix automaton, looked up next to the database.
pub const SUFFIXES_FILE: &str = "ordalisti-suffixes.dawg.bin";

/// Configuration read once when a [`Bin`](crate::Bin) is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinConfig {
    /// Path of the compressed dictionary image.
    pub database_path: PathBuf,

    /// Prefix automaton; defaults to [`PREFIXES_FILE`] beside the database.
    pub prefixes_path: Option<PathBuf>,

    /// Suffix automaton; defaults to [`SUFFIXES_FILE`] beside the database.
    pub suffixes_path: Option<PathBuf>,

    /// Synthesize entries for compound words.
    pub add_compounds: bool,

    /// Accept `ó`-prefixed negations of known adjectives.
    pub add_negation: bool,

    /// Retry words spelled with `z` using modern spelling.
    pub replace_z: bool,

    /// Capacity of the lookup cache.
    pub lookup_cache_capacity: usize,

    /// Capacity of the compound split cache.
    pub compound_cache_capacity: usize,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("ord.compressed"),
            prefixes_path: None,
            suffixes_path: None,
            add_compounds: true,
            add_negation: true,
            replace_z: true,
            lookup_cache_capacity: 1000,
            compound_cache_capacity: 500,
        }
    }
}

impl BinConfig {
    /// Default configuration for the database at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            database_path: path.into(),
            ..Default::default()
        }
    }

    /// Read a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| {
            BinError::config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config: BinConfig = serde_json::from_slice(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_prefixes_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.prefixes_path = Some(path.into());
        self
    }

    pub fn with_suffixes_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.suffixes_path = Some(path.into());
        self
    }

    pub fn with_compounds(mut self, enabled: bool) -> Self {
        self.add_compounds = enabled;
        self
    }

    pub fn with_negation(mut self, enabled: bool) -> Self {
        self.add_negation = enabled;
        self
    }

    pub fn with_replace_z(mut self, enabled: bool) -> Self {
        self.replace_z = enabled;
        self
    }

    pub fn with_lookup_cache_capacity(mut self, capacity: usize) -> Self {
        self.lookup_cache_capacity = capacity;
        self
    }

    pub fn with_compound_cache_capacity(mut self, capacity: usize) -> Self {
        self.compound_cache_capacity = capacity;
        self
    }

    /// Reject settings no dictionary can be opened with.
    pub fn validate(&self) -> Result<()> {
        if self.lookup_cache_capacity == 0 {
            return Err(BinError::config("lookup_cache_capacity must be positive"));
        }
        if self.compound_cache_capacity == 0 {
            return Err(BinError::config("compound_cache_capacity must be positive"));
        }
        Ok(())
    }

    fn sibling(&self, file_name: &str) -> PathBuf {
        match self.database_path.parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Effective path of the prefix automaton.
    pub fn prefixes_path(&self) -> PathBuf {
        self.prefixes_path
            .clone()
            .unwrap_or_else(|| self.sibling(PREFIXES_FILE))
    }

    /// Effective path of the suffix automaton.
    pub fn suffixes_path(&self) -> PathBuf {
        self.suffixes_path
            .clone()
            .unwrap_or_else(|| self.sibling(SUFFIXES_FILE))
    }
}
