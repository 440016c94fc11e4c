//! Shared test helpers: a filesystem that fails at a chosen stage.

#![allow(dead_code)]

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use shelfkv::persist::{OsIo, PersistIo};
use shelfkv::{Result, ShelfError};

/// Where `FaultyIo` injects its failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Temp file is created and half written, then the write fails
    WriteAfterCreate,
    /// Temp file cannot be opened at all
    Open,
    /// Temp file is fully written, rename fails
    Rename,
    /// Reading the target fails
    Read,
}

/// Real filesystem with one injected fault
pub struct FaultyIo {
    fault: Fault,
    /// Successful writes to let through before failing
    pass: AtomicUsize,
}

impl FaultyIo {
    pub fn new(fault: Fault) -> Self {
        Self::after(fault, 0)
    }

    /// Fail only after `pass` successful file writes
    pub fn after(fault: Fault, pass: usize) -> Self {
        Self {
            fault,
            pass: AtomicUsize::new(pass),
        }
    }

    fn armed(&self) -> bool {
        self.pass
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    }
}

impl PersistIo for FaultyIo {
    fn write_file(&self, path: &Path, bytes: &[u8], sync: bool) -> Result<()> {
        match self.fault {
            Fault::WriteAfterCreate if self.armed() => {
                let half = &bytes[..bytes.len() / 2];
                std::fs::write(path, half)?;
                Err(ShelfError::TempWrite {
                    path: path.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::Other, "disk full"),
                })
            }
            Fault::Open if self.armed() => Err(ShelfError::TempOpen {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            }),
            _ => OsIo.write_file(path, bytes, sync),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.fault == Fault::Rename {
            return Err(io::Error::new(io::ErrorKind::Other, "cross-device link"));
        }
        OsIo.rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        OsIo.remove_file(path)
    }

    fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        if self.fault == Fault::Read {
            return Err(io::Error::new(io::ErrorKind::Other, "bad sector"));
        }
        OsIo.read_file(path)
    }
}
