//! # ShelfKV
//!
//! Owned record stores persisted as flat delimited text:
//! - Growable stores with capacity doubling and order-preserving delete
//! - Lenient loading that skips malformed lines instead of failing
//! - Atomic saves via write-temp-then-rename
//! - A lending library, an expense ledger and a line notebook built on top
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │         Library / Ledger / Notebook (domain layer)          │
//! │        dependent-record checks, id assignment, dates         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ RecordStore │          │  FlatFile   │
//!   │  (growable) │ ───────▶ │ (codec +    │
//!   └──────┬──────┘          │  atomic io) │
//!          │                 └──────┬──────┘
//!          ▼                        ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Record    │          │ books.csv   │
//!   │ (shape +    │          │ borrowers…  │
//!   │  validate)  │          └─────────────┘
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod clock;

pub mod record;
pub mod store;
pub mod persist;
pub mod library;
pub mod ledger;
pub mod notebook;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ShelfError, Result};
pub use config::{AllocPolicy, Config};
pub use record::{Book, BorrowRecord, Cents, LedgerEntry, Record, RecordId, TextLine};
pub use store::RecordStore;
pub use persist::FlatFile;
pub use ledger::Ledger;
pub use library::Library;
pub use notebook::Notebook;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ShelfKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
