//! Persistence Module
//!
//! Converts record stores to and from flat delimited text and writes them to
//! disk all-or-nothing.
//!
//! ## Responsibilities
//! - Serialize a whole store into one in-memory blob (total, never partial)
//! - Parse a blob line by line, skipping malformed or invalid lines
//! - Write the blob to `<target><suffix>` and rename it over the target
//!
//! ## Save Path
//! ```text
//!   store ──serialize──▶ blob ──write──▶ books.csv.tmp ──rename──▶ books.csv
//!                                 │                        │
//!                          fail: remove tmp,        fail: keep tmp,
//!                          target untouched         target untouched
//! ```
//!
//! Reads are lenient and writes are strict: a bad line costs one record, a
//! bad write costs nothing on disk.
//!
//! Rename is atomic on local POSIX filesystems and on NTFS. Network
//! filesystems without atomic rename void the guarantee.

mod atomic;
mod codec;
mod flat_file;

pub use atomic::{temp_path_for, AtomicFile, OsIo, PersistIo, SaveReport};
pub use codec::{deserialize, deserialize_with, serialize, LoadReport, SkipReason, SkippedLine};
pub use flat_file::FlatFile;
