//! Atomic file replacement
//!
//! Write-temp-then-rename. The temp file sits next to the target (same
//! directory, so same filesystem) and is renamed over it in one operation.
//! The target is never removed first: a reader sees either the previous
//! complete file or the new complete file.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Result, ShelfError};

/// Filesystem operations used by persistence
///
/// `OsIo` is the real filesystem. Tests substitute implementations that fail
/// at a chosen stage.
pub trait PersistIo: Send + Sync {
    /// Create or truncate `path`, write all of `bytes`, optionally fsync, close
    ///
    /// Errors must be the stage-specific `TempOpen`, `TempWrite` or `TempSync`.
    fn write_file(&self, path: &Path, bytes: &[u8], sync: bool) -> Result<()>;

    /// Rename `from` over `to`, replacing `to` if it exists
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Whole file contents, or `None` if the file does not exist
    fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsIo;

impl PersistIo for OsIo {
    fn write_file(&self, path: &Path, bytes: &[u8], sync: bool) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|source| ShelfError::TempOpen {
                path: path.to_path_buf(),
                source,
            })?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|source| ShelfError::TempWrite {
                path: path.to_path_buf(),
                source,
            })?;

        if sync {
            file.sync_all().map_err(|source| ShelfError::TempSync {
                path: path.to_path_buf(),
                source,
            })?;
        }

        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// What a successful save put on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Target file that now holds the data
    pub path: PathBuf,
    /// Bytes written
    pub bytes: usize,
    /// CRC32 of the bytes written
    pub checksum: u32,
}

/// `<target><suffix>`, in the target's directory
///
/// "books.csv" + ".tmp" → "books.csv.tmp"
pub fn temp_path_for(target: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// A target file replaced wholesale on every write
#[derive(Clone)]
pub struct AtomicFile {
    /// File readers see
    target: PathBuf,
    /// Staging file, same directory as target
    temp: PathBuf,
    /// fsync the temp file before rename
    sync: bool,
    io: Arc<dyn PersistIo>,
}

impl AtomicFile {
    /// Atomic file on the real filesystem
    pub fn new(target: impl Into<PathBuf>, temp_suffix: &str, sync: bool) -> Self {
        Self::with_io(target, temp_suffix, sync, Arc::new(OsIo))
    }

    /// Atomic file over custom filesystem operations
    pub fn with_io(
        target: impl Into<PathBuf>,
        temp_suffix: &str,
        sync: bool,
        io: Arc<dyn PersistIo>,
    ) -> Self {
        let target = target.into();
        let temp = temp_path_for(&target, temp_suffix);
        Self {
            target,
            temp,
            sync,
            io,
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn temp(&self) -> &Path {
        &self.temp
    }

    /// Current target contents, `None` if the target does not exist
    pub fn read(&self) -> Result<Option<Vec<u8>>> {
        self.io.read_file(&self.target).map_err(|source| ShelfError::Read {
            path: self.target.clone(),
            source,
        })
    }

    /// Replace the target with `bytes`
    ///
    /// Steps:
    /// 1. Write `bytes` to the temp file
    /// 2. On failure: remove the temp file, report the stage; target untouched
    /// 3. Rename the temp file over the target
    /// 4. On failure: keep the temp file for inspection, report `Rename`
    pub fn write(&self, bytes: &[u8]) -> Result<SaveReport> {
        // Step 1: Stage the new contents
        if let Err(e) = self.io.write_file(&self.temp, bytes, self.sync) {
            // Step 2: Nothing reached the target; drop the partial temp file
            match self.io.remove_file(&self.temp) {
                Ok(()) => {}
                Err(rm) if rm.kind() == io::ErrorKind::NotFound => {}
                Err(rm) => warn!(path = %self.temp.display(), error = %rm, "could not remove temp file"),
            }
            warn!(path = %self.target.display(), error = %e, "save aborted before rename");
            return Err(e);
        }

        // Step 3: Swap it in
        if let Err(source) = self.io.rename(&self.temp, &self.target) {
            // Step 4: Temp file stays behind for manual recovery
            warn!(
                temp = %self.temp.display(),
                target = %self.target.display(),
                error = %source,
                "rename failed, temp file kept"
            );
            return Err(ShelfError::Rename {
                from: self.temp.clone(),
                to: self.target.clone(),
                source,
            });
        }

        let checksum = crc32fast::hash(bytes);
        debug!(path = %self.target.display(), bytes = bytes.len(), checksum, "saved");

        Ok(SaveReport {
            path: self.target.clone(),
            bytes: bytes.len(),
            checksum,
        })
    }
}

impl std::fmt::Debug for AtomicFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicFile")
            .field("target", &self.target)
            .field("temp", &self.temp)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}
