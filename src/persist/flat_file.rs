//! Flat file
//!
//! Binds one record shape to one target file: lenient load, atomic save.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::config::{AllocPolicy, Config};
use crate::error::Result;
use crate::record::Record;
use crate::store::RecordStore;

use super::atomic::{AtomicFile, OsIo, PersistIo, SaveReport};
use super::codec::{self, LoadReport};

/// A flat file holding records of shape `R`
#[derive(Debug, Clone)]
pub struct FlatFile<R> {
    file: AtomicFile,
    initial_capacity: usize,
    alloc_policy: AllocPolicy,
    _shape: PhantomData<fn() -> R>,
}

impl<R: Record> FlatFile<R> {
    /// Flat file at `path` on the real filesystem
    pub fn new(path: impl Into<PathBuf>, config: &Config) -> Self {
        Self::with_io(path, config, Arc::new(OsIo))
    }

    /// Flat file at `path` over custom filesystem operations
    pub fn with_io(path: impl Into<PathBuf>, config: &Config, io: Arc<dyn PersistIo>) -> Self {
        Self {
            file: AtomicFile::with_io(path, &config.temp_suffix, config.sync_on_save, io),
            initial_capacity: config.initial_capacity,
            alloc_policy: config.alloc_policy,
            _shape: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.target()
    }

    pub fn temp_path(&self) -> &Path {
        self.file.temp()
    }

    /// Read the file into a fresh store
    ///
    /// A missing file is an empty store. Malformed lines are skipped and
    /// listed in the report.
    pub fn load(&self) -> Result<(RecordStore<R>, LoadReport)> {
        self.load_with(|_| true)
    }

    /// Like [`FlatFile::load`], with an extra per-line field predicate
    pub fn load_with<P>(&self, predicate: P) -> Result<(RecordStore<R>, LoadReport)>
    where
        P: FnMut(&[&str]) -> bool,
    {
        let store = RecordStore::new(self.initial_capacity, self.alloc_policy);

        let bytes = match self.file.read()? {
            Some(bytes) => bytes,
            None => {
                info!(kind = R::KIND, path = %self.path().display(), "no file yet, starting empty");
                return Ok((store, LoadReport::default()));
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        let (store, report) = codec::deserialize_with(&text, store, predicate)?;

        info!(
            kind = R::KIND,
            path = %self.path().display(),
            accepted = report.accepted,
            skipped = report.skipped_count(),
            "loaded"
        );
        Ok((store, report))
    }

    /// Replace `store` with the file's contents
    ///
    /// `store` is only touched once the whole read pass has succeeded.
    pub fn load_into(&self, store: &mut RecordStore<R>) -> Result<LoadReport> {
        let (fresh, report) = self.load()?;
        *store = fresh;
        Ok(report)
    }

    /// Serialize `store` and atomically replace the file with it
    pub fn save(&self, store: &RecordStore<R>) -> Result<SaveReport> {
        let blob = codec::serialize(store);
        let report = self.file.write(blob.as_bytes())?;
        info!(kind = R::KIND, records = store.len(), bytes = report.bytes, "saved");
        Ok(report)
    }
}
