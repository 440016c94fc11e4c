//! Catalog entries
//!
//! On disk: `id,title,author,total,available`

use std::fmt::Write as _;

use super::{parse_count, parse_id, Identified, Record, RecordId, DELIMITER};

/// A catalog entry with a bounded number of lendable copies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: RecordId,
    pub title: String,
    pub author: String,
    /// Copies owned
    pub total: u32,
    /// Copies on the shelf, never above `total`
    pub available: u32,
}

impl Book {
    /// New book with every copy available
    pub fn new(id: RecordId, title: impl Into<String>, author: impl Into<String>, total: u32) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            total,
            available: total,
        }
    }

    /// Number of copies currently lent out
    pub fn on_loan(&self) -> u32 {
        self.total - self.available.min(self.total)
    }
}

impl Record for Book {
    const KIND: &'static str = "book";
    const MIN_FIELDS: usize = 5;

    fn from_fields(fields: &[&str]) -> Option<Self> {
        Some(Self {
            id: parse_id(fields[0])?,
            title: fields[1].to_string(),
            author: fields[2].to_string(),
            total: parse_count(fields[3])?,
            available: parse_count(fields[4])?,
        })
    }

    fn write_fields(&self, out: &mut String) {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "{}{d}{}{d}{}{d}{}{d}{}",
            self.id,
            self.title,
            self.author,
            self.total,
            self.available,
            d = DELIMITER
        );
    }

    fn is_valid(&self) -> bool {
        self.id.is_valid() && self.available <= self.total
    }

    fn seed_id(&self) -> Option<RecordId> {
        Some(self.id)
    }

    fn restore_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

impl Identified for Book {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}
