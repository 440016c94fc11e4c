//! Library Module
//!
//! Lending library built on two record stores.
//!
//! ## Responsibilities
//! - Own the catalog store and the borrow store, plus their flat files
//! - Assign book ids and keep `available <= total`
//! - Refuse to delete a book that is still out on loan
//! - Stamp borrows and returns with the injected clock's date
//! - Save both files after each successful mutation (when autosave is on)

use std::fs;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{Result, ShelfError};
use crate::persist::{FlatFile, LoadReport, OsIo, PersistIo, SaveReport};
use crate::record::{check_field, Book, BorrowRecord, RecordId};
use crate::store::RecordStore;

/// Reports from loading both files at open
#[derive(Debug, Clone, Default)]
pub struct OpenReport {
    pub books: LoadReport,
    pub borrows: LoadReport,
}

/// Reports from saving both files
#[derive(Debug, Clone)]
pub struct SaveReports {
    pub books: SaveReport,
    pub borrows: SaveReport,
}

/// A lending library
///
/// Single owner, single thread. Wrap the whole value in one mutex if it has to
/// be shared; finer locking would break the store's relocation rule.
pub struct Library {
    /// Library configuration
    config: Config,

    /// Catalog entries, ids unique and positive
    books: RecordStore<Book>,

    /// Borrow history in the order borrows happened
    borrows: RecordStore<BorrowRecord>,

    books_file: FlatFile<Book>,
    borrows_file: FlatFile<BorrowRecord>,

    /// Date stamped on borrows and returns
    clock: Box<dyn Clock>,
}

impl Library {
    /// Open or create a library with the given config, dated by the system clock
    pub fn open(config: Config) -> Result<(Self, OpenReport)> {
        Self::open_with(config, Box::new(SystemClock), Arc::new(OsIo))
    }

    /// Open or create a library with an injected clock and filesystem
    ///
    /// On startup:
    /// 1. Validate config
    /// 2. Create data directory
    /// 3. Load both files (missing files are empty, bad lines are skipped)
    pub fn open_with(
        config: Config,
        clock: Box<dyn Clock>,
        io: Arc<dyn PersistIo>,
    ) -> Result<(Self, OpenReport)> {
        // Step 1: Reject unusable settings
        config.validate()?;

        // Step 2: Create data directory if it doesn't exist
        fs::create_dir_all(&config.data_dir)?;

        // Step 3: Load stores
        let books_file = FlatFile::with_io(config.books_path(), &config, Arc::clone(&io));
        let borrows_file = FlatFile::with_io(config.borrows_path(), &config, io);

        let (books, books_report) = books_file.load()?;
        let (borrows, borrows_report) = borrows_file.load()?;

        info!(
            books = books.len(),
            borrows = borrows.len(),
            skipped = books_report.skipped_count() + borrows_report.skipped_count(),
            "library opened"
        );

        let library = Self {
            config,
            books,
            borrows,
            books_file,
            borrows_file,
            clock,
        };
        let report = OpenReport {
            books: books_report,
            borrows: borrows_report,
        };
        Ok((library, report))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Add a book with every copy available, returning its new id
    pub fn add_book(&mut self, title: &str, author: &str, total: u32) -> Result<RecordId> {
        let title = title.trim();
        let author = author.trim();
        if title.is_empty() {
            return Err(ShelfError::InvalidField("title must not be empty".to_string()));
        }
        if author.is_empty() {
            return Err(ShelfError::InvalidField("author must not be empty".to_string()));
        }
        check_field("title", title)?;
        check_field("author", author)?;
        if total == 0 {
            return Err(ShelfError::InvalidField("total must be a positive integer".to_string()));
        }

        let book = Book::new(RecordId::default(), title, author, total);
        let (id, _) = self.books.append_with_next_id(book)?;
        debug!(%id, title, "book added");

        self.autosave()?;
        Ok(id)
    }

    /// Delete a book that has no open borrows
    pub fn delete_book(&mut self, id: RecordId) -> Result<Book> {
        if self.borrows.exists_referencing(|borrow| borrow.holds(id)) {
            return Err(ShelfError::HasOpenRelations(id));
        }
        let index = self.books.index_of(id)?;
        let book = self.books.delete_at(index)?;
        debug!(%id, "book deleted");

        self.autosave()?;
        Ok(book)
    }

    pub fn find_book(&self, id: RecordId) -> Option<&Book> {
        self.books.get_by_id(id)
    }

    /// Books whose title contains `needle` (case-sensitive)
    pub fn search_title<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a Book> + 'a {
        self.books
            .filter(move |book| book.title.contains(needle))
            .map(|(_, book)| book)
    }

    pub fn books(&self) -> &RecordStore<Book> {
        &self.books
    }

    // =========================================================================
    // Lending
    // =========================================================================

    /// Lend one copy of `book_id` to `borrower_id`
    ///
    /// The same borrower may hold several copies of the same book.
    pub fn borrow_book(&mut self, borrower_id: RecordId, book_id: RecordId) -> Result<()> {
        Self::require_id("borrower id", borrower_id)?;
        Self::require_id("book id", book_id)?;

        let index = self.books.index_of(book_id)?;
        if self.books.as_slice()[index].available == 0 {
            return Err(ShelfError::Unavailable(book_id));
        }

        let borrow = BorrowRecord::open(borrower_id, book_id, self.clock.today());
        self.borrows.append(borrow)?;
        self.books.update_at(index, |book| book.available -= 1)?;
        debug!(%borrower_id, %book_id, "book borrowed");

        self.autosave()?;
        Ok(())
    }

    /// Close the most recent open borrow of `book_id` by `borrower_id`
    pub fn return_book(&mut self, borrower_id: RecordId, book_id: RecordId) -> Result<()> {
        Self::require_id("borrower id", borrower_id)?;
        Self::require_id("book id", book_id)?;

        let index = self
            .borrows
            .position_last(|b| b.borrower_id == borrower_id && b.holds(book_id))
            .ok_or(ShelfError::NoOpenRelation {
                subject: borrower_id,
                object: book_id,
            })?;

        let today = self.clock.today();
        self.borrows.update_at(index, |b| b.return_date = Some(today))?;

        // The book may have been removed from the catalog out of band.
        match self.books.find_by_id(book_id) {
            Some(book_index) => self.books.update_at(book_index, |book| {
                if book.available < book.total {
                    book.available += 1;
                }
            })?,
            None => warn!(%book_id, "returned book is no longer in the catalog"),
        }
        debug!(%borrower_id, %book_id, "book returned");

        self.autosave()?;
        Ok(())
    }

    pub fn borrows(&self) -> &RecordStore<BorrowRecord> {
        &self.borrows
    }

    /// Open borrows, oldest first
    pub fn open_borrows(&self) -> impl Iterator<Item = &BorrowRecord> {
        self.borrows.iter().filter(|b| b.is_open())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Save books, then borrows, each atomically
    pub fn save(&self) -> Result<SaveReports> {
        let books = self.books_file.save(&self.books)?;
        let borrows = self.borrows_file.save(&self.borrows)?;
        Ok(SaveReports { books, borrows })
    }

    /// Re-read both files, replacing the in-memory stores only if both loads succeed
    pub fn reload(&mut self) -> Result<OpenReport> {
        let (books, books_report) = self.books_file.load()?;
        let (borrows, borrows_report) = self.borrows_file.load()?;
        self.books = books;
        self.borrows = borrows;
        Ok(OpenReport {
            books: books_report,
            borrows: borrows_report,
        })
    }

    /// Get the configuration
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

    fn require_id(name: &str, id: RecordId) -> Result<()> {
        if !id.is_valid() {
            return Err(ShelfError::InvalidField(format!("{} must be positive", name)));
        }
        Ok(())
    }
}
