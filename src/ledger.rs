//! Ledger Module
//!
//! Income and expense book-keeping on one record store.
//!
//! ## Responsibilities
//! - Own the entry store and its flat file
//! - Assign entry ids and validate dates, categories and notes on input
//! - Update and delete entries by id, keeping file order
//! - Filter by inclusive date range and case-insensitive category
//! - Summarize a set of entries (count, total, extremes, mean)

use std::fs;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, ShelfError};
use crate::persist::{FlatFile, LoadReport, OsIo, PersistIo, SaveReport};
use crate::record::{check_field, is_iso_date, Cents, LedgerEntry, RecordId};
use crate::store::RecordStore;

/// Selection criteria; every unset bound matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Earliest date, inclusive (`YYYY-MM-DD`)
    pub from: Option<String>,
    /// Latest date, inclusive (`YYYY-MM-DD`)
    pub to: Option<String>,
    /// Category, compared ignoring ASCII case
    pub category: Option<String>,
}

impl EntryFilter {
    pub fn since(mut self, date: impl Into<String>) -> Self {
        self.from = Some(date.into());
        self
    }

    pub fn until(mut self, date: impl Into<String>) -> Self {
        self.to = Some(date.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// ISO dates compare correctly as strings
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if let Some(from) = &self.from {
            if entry.date.as_str() < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if entry.date.as_str() > to.as_str() {
                return false;
            }
        }
        match &self.category {
            Some(category) => entry.category.eq_ignore_ascii_case(category),
            None => true,
        }
    }
}

/// Aggregate over a set of entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub count: usize,
    /// Saturates at the `i64` bounds
    pub total: Cents,
    pub min: Cents,
    pub max: Cents,
    /// Truncated toward zero
    pub mean: Cents,
}

impl Summary {
    /// `None` for an empty set
    pub fn of<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Option<Self> {
        let mut amounts = entries.into_iter().map(|entry| entry.amount.0);
        let first = amounts.next()?;
        let (mut count, mut sum, mut min, mut max) = (1usize, i128::from(first), first, first);
        for amount in amounts {
            count += 1;
            sum += i128::from(amount);
            min = min.min(amount);
            max = max.max(amount);
        }
        // The mean lies within [min, max], so it always fits.
        let mean = (sum / count as i128) as i64;
        let total = i64::try_from(sum).unwrap_or(if sum < 0 { i64::MIN } else { i64::MAX });
        Some(Self {
            count,
            total: Cents(total),
            min: Cents(min),
            max: Cents(max),
            mean: Cents(mean),
        })
    }
}

/// A ledger of dated, categorized amounts
pub struct Ledger {
    config: Config,
    entries: RecordStore<LedgerEntry>,
    file: FlatFile<LedgerEntry>,
}

impl Ledger {
    /// Open or create the ledger in `config.data_dir`
    pub fn open(config: Config) -> Result<(Self, LoadReport)> {
        Self::open_with(config, Arc::new(OsIo))
    }

    /// Open or create the ledger over custom filesystem operations
    pub fn open_with(config: Config, io: Arc<dyn PersistIo>) -> Result<(Self, LoadReport)> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let file = FlatFile::with_io(config.ledger_path(), &config, io);
        let (entries, report) = file.load()?;
        info!(
            entries = entries.len(),
            skipped = report.skipped_count(),
            "ledger opened"
        );

        let ledger = Self {
            config,
            entries,
            file,
        };
        Ok((ledger, report))
    }

    // =========================================================================
    // Entries
    // =========================================================================

    /// Record an amount, returning the new entry's id
    pub fn add(&mut self, date: &str, category: &str, amount: Cents, note: &str) -> Result<RecordId> {
        let entry = Self::checked_entry(date, category, amount, note)?;
        let (id, _) = self.entries.append_with_next_id(entry)?;
        debug!(%id, %amount, "entry added");

        self.autosave()?;
        Ok(id)
    }

    /// Overwrite every field of entry `id` except the id itself
    pub fn update(
        &mut self,
        id: RecordId,
        date: &str,
        category: &str,
        amount: Cents,
        note: &str,
    ) -> Result<()> {
        let entry = Self::checked_entry(date, category, amount, note)?;
        let index = self.entries.index_of(id)?;
        self.entries.overwrite_at(index, entry)?;
        debug!(%id, "entry updated");

        self.autosave()
    }

    /// Remove entry `id`; later entries keep their order
    pub fn delete(&mut self, id: RecordId) -> Result<LedgerEntry> {
        let index = self.entries.index_of(id)?;
        let entry = self.entries.delete_at(index)?;
        debug!(%id, "entry deleted");

        self.autosave()?;
        Ok(entry)
    }

    pub fn get(&self, id: RecordId) -> Option<&LedgerEntry> {
        self.entries.get_by_id(id)
    }

    pub fn entries(&self) -> &RecordStore<LedgerEntry> {
        &self.entries
    }

    /// Entries matching `filter`, in file order
    pub fn filter<'a>(&'a self, filter: &'a EntryFilter) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
        self.entries
            .filter(move |entry| filter.matches(entry))
            .map(|(_, entry)| entry)
    }

    /// Summary of the entries matching `filter`
    pub fn summarize(&self, filter: &EntryFilter) -> Option<Summary> {
        Summary::of(self.filter(filter))
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    pub fn save(&self) -> Result<SaveReport> {
        self.file.save(&self.entries)
    }

    /// Re-read the file; entries are replaced only if the read succeeds
    pub fn reload(&mut self) -> Result<LoadReport> {
        self.file.load_into(&mut self.entries)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn autosave(&self) -> Result<()> {
        if self.config.autosave {
            self.save()?;
        }
        Ok(())
    }

    fn checked_entry(date: &str, category: &str, amount: Cents, note: &str) -> Result<LedgerEntry> {
        let date = date.trim();
        let category = category.trim();
        if !is_iso_date(date) {
            return Err(ShelfError::InvalidField(format!(
                "date must be YYYY-MM-DD: {:?}",
                date
            )));
        }
        if category.is_empty() {
            return Err(ShelfError::InvalidField("category must not be empty".to_string()));
        }
        check_field("category", category)?;
        // The note is the last field, so only line breaks are a problem.
        if note.contains('\n') || note.contains('\r') {
            return Err(ShelfError::InvalidField("note must not contain line breaks".to_string()));
        }
        Ok(LedgerEntry::new(RecordId::default(), date, category, amount, note))
    }
}
