//! Growable record store
//!
//! `Vec`-backed store with an explicit logical capacity that starts at the
//! configured initial size and doubles whenever an insert finds it full.

use tracing::{debug, warn};

use crate::config::{AllocPolicy, Config, DEFAULT_INITIAL_CAPACITY};
use crate::error::{Result, ShelfError};
use crate::record::{Identified, Record, RecordId};

/// Owned sequence of records with capacity/size separation
///
/// ## Invariants:
/// - `len() <= capacity()` after every operation
/// - `capacity()` never shrinks
/// - live records occupy `[0, len())` in insertion order, minus deletions
#[derive(Debug, Clone)]
pub struct RecordStore<R> {
    /// Live records
    records: Vec<R>,

    /// Allocated slots (0 until the first insert)
    capacity: usize,

    /// Slots allocated by the first insert
    initial_capacity: usize,

    /// Behaviour when growth cannot allocate
    alloc_policy: AllocPolicy,
}

impl<R: Record> RecordStore<R> {
    /// Create an empty store; nothing is allocated until the first insert
    pub fn new(initial_capacity: usize, alloc_policy: AllocPolicy) -> Self {
        Self {
            records: Vec::new(),
            capacity: 0,
            initial_capacity: initial_capacity.max(1),
            alloc_policy,
        }
    }

    /// Create an empty store using the config's capacity and alloc policy
    pub fn with_config(config: &Config) -> Self {
        Self::new(config.initial_capacity, config.alloc_policy)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Add a record at the end, returning its index
    ///
    /// Doubles capacity first if the store is full.
    pub fn append(&mut self, record: R) -> Result<usize> {
        self.grow_if_full()?;
        let index = self.records.len();
        self.records.push(record);
        Ok(index)
    }

    /// Insert a record at `index`, shifting later records back
    ///
    /// `index == len()` is an append.
    pub fn insert_at(&mut self, index: usize, record: R) -> Result<()> {
        if index > self.records.len() {
            return Err(self.out_of_range(index));
        }
        self.grow_if_full()?;
        self.records.insert(index, record);
        Ok(())
    }

    /// Mutate the record at `index` in place
    ///
    /// Identity and position never change: if the closure rewrites the id of
    /// an identified record, the old id is put back.
    pub fn update_at<F>(&mut self, index: usize, f: F) -> Result<()>
    where
        F: FnOnce(&mut R),
    {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(ShelfError::IndexOutOfRange { index, len })?;

        let id = record.seed_id();
        f(record);
        if let Some(id) = id {
            if record.seed_id() != Some(id) {
                warn!(kind = R::KIND, %id, index, "update tried to change id, restored");
                record.restore_id(id);
            }
        }
        Ok(())
    }

    /// Replace the record at `index`, returning the old one
    pub fn replace_at(&mut self, index: usize, record: R) -> Result<R> {
        let len = self.records.len();
        let slot = self
            .records
            .get_mut(index)
            .ok_or(ShelfError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, record))
    }

    /// Remove the record at `index`, shifting later records forward
    ///
    /// Relative order of the remaining records is unchanged (no swap-remove).
    pub fn delete_at(&mut self, index: usize) -> Result<R> {
        if index >= self.records.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.records.remove(index))
    }

    /// Drop every live record; capacity is kept
    pub fn clear(&mut self) {
        self.records.clear();
    }

    // =========================================================================
    // Access
    // =========================================================================

    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut R> {
        self.records.get_mut(index)
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Allocated slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[R] {
        &self.records
    }

    // =========================================================================
    // Scans
    // =========================================================================

    /// True if any live record matches
    ///
    /// Used by domain layers to gate deletes on dependent records.
    pub fn exists_referencing<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&R) -> bool,
    {
        self.records.iter().any(predicate)
    }

    /// Index of the last matching record (scans from the end)
    pub fn position_last<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&R) -> bool,
    {
        self.records.iter().rposition(predicate)
    }

    /// Matching records with their indices, in store order
    pub fn filter<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = (usize, &'a R)> + 'a
    where
        P: FnMut(&R) -> bool + 'a,
    {
        self.records
            .iter()
            .enumerate()
            .filter(move |(_, record)| predicate(*record))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Ensure one free slot, doubling capacity if the store is full
    fn grow_if_full(&mut self) -> Result<()> {
        let len = self.records.len();
        if len < self.capacity {
            return Ok(());
        }

        let new_capacity = if self.capacity == 0 {
            self.initial_capacity
        } else {
            self.capacity.saturating_mul(2)
        };
        let additional = new_capacity - len;

        match self.alloc_policy {
            // Vec aborts the process if the allocator fails.
            AllocPolicy::Abort => self.records.reserve_exact(additional),
            AllocPolicy::Propagate => self
                .records
                .try_reserve_exact(additional)
                .map_err(|_| ShelfError::OutOfMemory {
                    requested: new_capacity,
                })?,
        }

        debug!(kind = R::KIND, from = self.capacity, to = new_capacity, "grew store");
        self.capacity = new_capacity;
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> ShelfError {
        ShelfError::IndexOutOfRange {
            index,
            len: self.records.len(),
        }
    }
}

impl<R: Identified> RecordStore<R> {
    /// Index of the record with `id` (linear scan, first match)
    pub fn find_by_id(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    /// Like [`RecordStore::find_by_id`] but reports a missing id as an error
    pub fn index_of(&self, id: RecordId) -> Result<usize> {
        self.find_by_id(id).ok_or(ShelfError::NotFound(id))
    }

    /// Record with `id`, if live
    pub fn get_by_id(&self, id: RecordId) -> Option<&R> {
        self.find_by_id(id).map(|index| &self.records[index])
    }

    /// `1 + max(id)`, or 1 for an empty store
    ///
    /// Fails with `IdSpaceExhausted` once a record holds `u64::MAX`.
    pub fn next_id(&self) -> Result<RecordId> {
        self.records
            .iter()
            .map(Identified::id)
            .max()
            .unwrap_or_default()
            .next()
    }

    /// Overwrite every field at `index` except the id
    pub fn overwrite_at(&mut self, index: usize, mut record: R) -> Result<()> {
        self.update_at(index, move |slot| {
            record.set_id(slot.id());
            *slot = record;
        })
    }

    /// Assign `next_id()` to the record and append it
    pub fn append_with_next_id(&mut self, mut record: R) -> Result<(RecordId, usize)> {
        let id = self.next_id()?;
        record.set_id(id);
        let index = self.append(record)?;
        Ok((id, index))
    }
}

impl<R: Record> Default for RecordStore<R> {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CAPACITY, AllocPolicy::Abort)
    }
}

impl<'a, R> IntoIterator for &'a RecordStore<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
