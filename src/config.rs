//! Configuration for ShelfKV
//!
//! Centralized configuration with sensible defaults.

use std::path::{Path, PathBuf};

use crate::error::{Result, ShelfError};

/// Main configuration for a ShelfKV library instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── books.csv        (catalog entries)
    ///     ├── borrowers.csv    (borrow entries)
    ///     └── ledger.csv       (income and expense entries)
    pub data_dir: PathBuf,

    /// File name of the catalog file inside `data_dir`
    pub books_file: String,

    /// File name of the borrow file inside `data_dir`
    pub borrows_file: String,

    /// File name of the ledger file inside `data_dir`
    pub ledger_file: String,

    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// Literal suffix appended to a target file name for its temp file
    pub temp_suffix: String,

    /// fsync the temp file before renaming it over the target
    pub sync_on_save: bool,

    /// Save both files after every successful mutation
    pub autosave: bool,

    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Slots allocated by the first append; capacity doubles from here
    pub initial_capacity: usize,

    /// What to do when growing a store cannot allocate
    pub alloc_policy: AllocPolicy,
}

/// Allocation failure policy for store growth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocPolicy {
    /// Abort the process (fail fast, never continue with a half-grown store)
    Abort,

    /// Report `ShelfError::OutOfMemory` and leave the store unchanged
    Propagate,
}

/// Default slot count allocated by a store's first append
pub const DEFAULT_INITIAL_CAPACITY: usize = 32;

/// Default temp-file suffix
pub const DEFAULT_TEMP_SUFFIX: &str = ".tmp";

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./shelf_data"),
            books_file: "books.csv".to_string(),
            borrows_file: "borrowers.csv".to_string(),
            ledger_file: "ledger.csv".to_string(),
            temp_suffix: DEFAULT_TEMP_SUFFIX.to_string(),
            sync_on_save: true,
            autosave: true,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            alloc_policy: AllocPolicy::Abort,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full path of the catalog file
    pub fn books_path(&self) -> PathBuf {
        self.data_dir.join(&self.books_file)
    }

    /// Full path of the borrow file
    pub fn borrows_path(&self) -> PathBuf {
        self.data_dir.join(&self.borrows_file)
    }

    /// Full path of the ledger file
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }

    /// Reject settings that would break the persistence guarantees
    pub fn validate(&self) -> Result<()> {
        let files = [&self.books_file, &self.borrows_file, &self.ledger_file];
        if files.iter().any(|name| name.is_empty()) {
            return Err(ShelfError::Config("data file names must not be empty".to_string()));
        }
        for (i, name) in files.iter().enumerate() {
            if files[..i].contains(name) {
                return Err(ShelfError::Config(format!(
                    "each data set needs its own file, {} is used twice",
                    name
                )));
            }
        }
        if self.temp_suffix.is_empty() {
            return Err(ShelfError::Config("temp suffix must not be empty".to_string()));
        }
        // The temp file must live next to the target for rename to be atomic.
        if self.temp_suffix.contains(std::path::is_separator) {
            return Err(ShelfError::Config(format!(
                "temp suffix {:?} must not contain a path separator",
                self.temp_suffix
            )));
        }
        if self.initial_capacity == 0 {
            return Err(ShelfError::Config("initial capacity must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all files)
    pub fn data_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set the catalog file name
    pub fn books_file(mut self, name: impl Into<String>) -> Self {
        self.config.books_file = name.into();
        self
    }

    /// Set the borrow file name
    pub fn borrows_file(mut self, name: impl Into<String>) -> Self {
        self.config.borrows_file = name.into();
        self
    }

    /// Set the ledger file name
    pub fn ledger_file(mut self, name: impl Into<String>) -> Self {
        self.config.ledger_file = name.into();
        self
    }

    /// Set the temp-file suffix
    pub fn temp_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.temp_suffix = suffix.into();
        self
    }

    /// Enable or disable fsync before rename
    pub fn sync_on_save(mut self, sync: bool) -> Self {
        self.config.sync_on_save = sync;
        self
    }

    /// Enable or disable saving after each mutation
    pub fn autosave(mut self, autosave: bool) -> Self {
        self.config.autosave = autosave;
        self
    }

    /// Set the initial store capacity
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Set the allocation failure policy
    pub fn alloc_policy(mut self, policy: AllocPolicy) -> Self {
        self.config.alloc_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
