//! Notebook Module
//!
//! Line-oriented text document on top of a record store.
//!
//! Lines are addressed by 1-based line number; line `n` is store index `n - 1`.
//! Every line is kept verbatim, including blank ones and ones with commas.
//!
//! Each edit first snapshots the document, so the most recent edit (or
//! revert) can be undone once.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::{Result, ShelfError};
use crate::persist::{FlatFile, LoadReport, SaveReport};
use crate::record::TextLine;
use crate::store::RecordStore;

/// A position where a search pattern matched (1-based line, 0-based byte column)
///
/// Case-insensitive search folds ASCII only, so columns stay byte-accurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub line_no: usize,
    pub column: usize,
}

/// An editable text document backed by a flat file
pub struct Notebook {
    lines: RecordStore<TextLine>,
    /// Document as it was before the last edit
    snapshot: Option<RecordStore<TextLine>>,
    file: FlatFile<TextLine>,
    /// Unsaved changes since the last load or save
    modified: bool,
}

impl Notebook {
    /// Open the document at `path`; a missing file is an empty document
    pub fn open(path: impl Into<PathBuf>, config: &Config) -> Result<(Self, LoadReport)> {
        config.validate()?;
        let file = FlatFile::new(path, config);
        let (lines, report) = file.load()?;
        let notebook = Self {
            lines,
            snapshot: None,
            file,
            modified: false,
        };
        Ok((notebook, report))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Text of line `line_no`
    pub fn line(&self, line_no: usize) -> Option<&str> {
        let index = line_no.checked_sub(1)?;
        self.lines.get(index).map(|line| line.content.as_str())
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.content.as_str())
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Append a line, returning its line number
    pub fn append(&mut self, text: &str) -> Result<usize> {
        check_line(text)?;
        self.snapshot();
        let index = self.lines.append(TextLine::new(text))?;
        self.modified = true;
        Ok(index + 1)
    }

    /// Insert a line before line `line_no`, returning where it landed
    ///
    /// Out-of-range positions are clamped: 0 inserts at the top, anything
    /// past the end appends.
    pub fn insert(&mut self, line_no: usize, text: &str) -> Result<usize> {
        check_line(text)?;
        let index = line_no.saturating_sub(1).min(self.lines.len());
        self.snapshot();
        self.lines.insert_at(index, TextLine::new(text))?;
        self.modified = true;
        Ok(index + 1)
    }

    /// Replace line `line_no`, returning the old text
    pub fn replace(&mut self, line_no: usize, text: &str) -> Result<String> {
        check_line(text)?;
        let index = self.index_for(line_no)?;
        self.snapshot();
        let old = self.lines.replace_at(index, TextLine::new(text))?;
        self.modified = true;
        Ok(old.content)
    }

    /// Delete line `line_no`, returning its text; later lines move up
    pub fn delete(&mut self, line_no: usize) -> Result<String> {
        let index = self.index_for(line_no)?;
        self.snapshot();
        let old = self.lines.delete_at(index)?;
        self.modified = true;
        Ok(old.content)
    }

    /// Restore the document as it was before the last edit
    ///
    /// One level only: returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.snapshot.take() {
            Some(previous) => {
                self.lines = previous;
                self.modified = true;
                debug!(lines = self.lines.len(), "undo");
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Every occurrence of `pattern`, in document order
    pub fn find(&self, pattern: &str, case_insensitive: bool) -> Vec<Match> {
        if pattern.is_empty() {
            return Vec::new();
        }
        let needle = fold(pattern, case_insensitive);
        let mut matches = Vec::new();
        for (index, line) in self.lines.iter().enumerate() {
            let hay = fold(&line.content, case_insensitive);
            matches.extend(hay.match_indices(needle.as_str()).map(|(column, _)| Match {
                line_no: index + 1,
                column,
            }));
        }
        matches
    }

    /// Replace every occurrence of `pattern`, returning the count
    ///
    /// With `case_insensitive`, ASCII letters match regardless of case and
    /// the rest of each line is kept as written.
    pub fn replace_all(
        &mut self,
        pattern: &str,
        replacement: &str,
        case_insensitive: bool,
    ) -> Result<usize> {
        if pattern.is_empty() {
            return Ok(0);
        }
        check_line(replacement)?;

        let needle = fold(pattern, case_insensitive);
        let hits = |content: &str| fold(content, case_insensitive).matches(needle.as_str()).count();
        if !self.lines.iter().any(|line| hits(&line.content) > 0) {
            return Ok(0);
        }

        self.snapshot();
        let mut count = 0;
        for index in 0..self.lines.len() {
            self.lines.update_at(index, |line| {
                let (content, n) = replace_folded(&line.content, &needle, replacement, case_insensitive);
                if n > 0 {
                    line.content = content;
                    count += n;
                }
            })?;
        }
        self.modified = true;
        debug!(pattern, count, case_insensitive, "replaced");
        Ok(count)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Atomically write the document back to its file
    pub fn save(&mut self) -> Result<SaveReport> {
        let report = self.file.save(&self.lines)?;
        self.modified = false;
        Ok(report)
    }

    /// Discard in-memory edits and re-read the file
    ///
    /// The discarded edits can be brought back with [`Notebook::undo`].
    pub fn revert(&mut self) -> Result<LoadReport> {
        let (fresh, report) = self.file.load()?;
        self.snapshot = Some(std::mem::replace(&mut self.lines, fresh));
        self.modified = false;
        Ok(report)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn snapshot(&mut self) {
        self.snapshot = Some(self.lines.clone());
    }

    /// Store index of an existing line
    fn index_for(&self, line_no: usize) -> Result<usize> {
        let len = self.lines.len();
        if line_no == 0 || line_no > len {
            return Err(ShelfError::LineOutOfRange { line_no, len });
        }
        Ok(line_no - 1)
    }
}

fn check_line(text: &str) -> Result<()> {
    if text.contains('\n') || text.contains('\r') {
        return Err(ShelfError::InvalidField("a line must not contain line breaks".to_string()));
    }
    Ok(())
}

fn fold(text: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        text.to_ascii_lowercase()
    } else {
        text.to_string()
    }
}

/// Replace every match of the already-folded `needle` in `text`
///
/// Folding is ASCII-only, so byte offsets in the folded copy are offsets in
/// `text` as well.
fn replace_folded(text: &str, needle: &str, replacement: &str, case_insensitive: bool) -> (String, usize) {
    let hay = fold(text, case_insensitive);
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;
    for (start, _) in hay.match_indices(needle) {
        out.push_str(&text[last..start]);
        out.push_str(replacement);
        last = start + needle.len();
        count += 1;
    }
    out.push_str(&text[last..]);
    (out, count)
}
