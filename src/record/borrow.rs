//! Borrow entries
//!
//! On disk: `borrower_id,book_id,borrow_date,return_date`
//!
//! An empty `return_date` marks the borrow as still open.

use super::{parse_id, Record, RecordId, DELIMITER};

/// Relation between a borrower and a book over a date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowRecord {
    pub borrower_id: RecordId,
    pub book_id: RecordId,
    /// `YYYY-MM-DD`
    pub borrow_date: String,
    /// `None` while the book is still out
    pub return_date: Option<String>,
}

impl BorrowRecord {
    /// New open borrow
    pub fn open(borrower_id: RecordId, book_id: RecordId, borrow_date: impl Into<String>) -> Self {
        Self {
            borrower_id,
            book_id,
            borrow_date: borrow_date.into(),
            return_date: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Open borrow of `book_id` by anyone
    pub fn holds(&self, book_id: RecordId) -> bool {
        self.book_id == book_id && self.is_open()
    }
}

impl Record for BorrowRecord {
    const KIND: &'static str = "borrow";
    const MIN_FIELDS: usize = 4;

    fn from_fields(fields: &[&str]) -> Option<Self> {
        let return_date = match fields[3] {
            "" => None,
            date => Some(date.to_string()),
        };
        Some(Self {
            borrower_id: parse_id(fields[0])?,
            book_id: parse_id(fields[1])?,
            borrow_date: fields[2].to_string(),
            return_date,
        })
    }

    fn write_fields(&self, out: &mut String) {
        out.push_str(&self.borrower_id.to_string());
        out.push(DELIMITER);
        out.push_str(&self.book_id.to_string());
        out.push(DELIMITER);
        out.push_str(&self.borrow_date);
        out.push(DELIMITER);
        if let Some(date) = &self.return_date {
            out.push_str(date);
        }
    }

    fn is_valid(&self) -> bool {
        self.borrower_id.is_valid() && self.book_id.is_valid() && !self.borrow_date.is_empty()
    }
}
