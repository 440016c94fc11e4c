//! Store Module
//!
//! In-memory, owned, contiguous container of fixed-shape records.
//!
//! ## Responsibilities
//! - Append with capacity-doubling growth (amortized O(1))
//! - Index-based update and order-preserving delete
//! - Id lookup and id assignment for identified records
//! - Scan primitives for dependent-record checks
//!
//! ## Layout
//! ```text
//!   0         len            capacity
//!   ├─────────┼──────────────┤
//!   │  live   │   scratch    │
//!   └─────────┴──────────────┘
//! ```
//! Only `[0, len)` is ever read. Growth may move the whole backing buffer, so
//! callers hold indices or ids across mutations, never references.

mod growable;

pub use growable::RecordStore;
