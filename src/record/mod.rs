//! Record Module
//!
//! Fixed-shape records and their flat-line encoding.
//!
//! ## Responsibilities
//! - Split a line into fields on the delimiter (no quoting, no escaping)
//! - Parse fields into a typed record, or reject the line
//! - Validate a parsed record before it is admitted into a store
//! - Write a record back as delimiter-joined fields
//!
//! ## Line Format
//! ```text
//! ┌──────────┬───┬──────────┬───┬─────┬───┬──────────┬────┐
//! │ field 0  │ , │ field 1  │ , │ ... │ , │ field N  │ \n │
//! └──────────┴───┴──────────┴───┴─────┴───┴──────────┴────┘
//! ```
//!
//! A field containing the delimiter or a line terminator cannot be
//! represented; it will split into extra fields (or lines) when read back.
//! Domain layers reject such input with [`check_field`].

mod book;
mod borrow;
mod entry;
mod line;

use std::fmt;

pub use book::Book;
pub use borrow::BorrowRecord;
pub use entry::{is_iso_date, Cents, LedgerEntry};
pub use line::TextLine;

use crate::error::{Result, ShelfError};

/// Field delimiter of the flat format
pub const DELIMITER: char = ',';

/// Explicit integer identity of a record. Valid ids are > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 > 0
    }

    /// The id after this one; `IdSpaceExhausted` at `u64::MAX`
    pub fn next(self) -> Result<RecordId> {
        self.0
            .checked_add(1)
            .map(RecordId)
            .ok_or(ShelfError::IdSpaceExhausted(self))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId(id)
    }
}

/// A fixed-shape record that can live in a store and in a flat file
pub trait Record: Sized {
    /// Short name used in logs
    const KIND: &'static str;

    /// Lines with fewer fields than this are skipped on load
    const MIN_FIELDS: usize;

    /// Whether blank lines are ignored on load
    const SKIP_BLANK: bool = true;

    /// Build a record from already-split fields (`fields.len() >= MIN_FIELDS`)
    fn from_fields(fields: &[&str]) -> Option<Self>;

    /// Append this record's fields, joined by [`DELIMITER`], without newline
    fn write_fields(&self, out: &mut String);

    /// Shape invariants checked before admission into a store
    fn is_valid(&self) -> bool {
        true
    }

    /// Split a raw line into fields
    fn split(line: &str) -> Vec<&str> {
        split_fields(line)
    }

    /// Id used to seed `next_id` and reject duplicates on load; positional
    /// shapes return None
    fn seed_id(&self) -> Option<RecordId> {
        None
    }

    /// Put back the id an in-place update overwrote. Positional shapes have
    /// none, so the default does nothing.
    fn restore_id(&mut self, _id: RecordId) {}
}

/// Records with explicit, unique, positive ids
pub trait Identified: Record {
    fn id(&self) -> RecordId;

    fn set_id(&mut self, id: RecordId);
}

/// Split a line on [`DELIMITER`]
///
/// Every delimiter starts a new field, so `"a,,b,"` gives `["a", "", "b", ""]`.
/// An empty line gives no fields at all.
pub fn split_fields(line: &str) -> Vec<&str> {
    if line.is_empty() {
        return Vec::new();
    }
    line.split(DELIMITER).collect()
}

/// Reject a field value that the flat format cannot represent
pub fn check_field(name: &str, value: &str) -> Result<()> {
    if value.contains(DELIMITER) || value.contains('\n') || value.contains('\r') {
        return Err(ShelfError::InvalidField(format!(
            "{} must not contain '{}' or line breaks: {:?}",
            name, DELIMITER, value
        )));
    }
    Ok(())
}

/// Parse a positive id field
pub(crate) fn parse_id(field: &str) -> Option<RecordId> {
    field.trim().parse::<u64>().ok().map(RecordId)
}

/// Parse an unsigned count field
pub(crate) fn parse_count(field: &str) -> Option<u32> {
    field.trim().parse::<u32>().ok()
}
