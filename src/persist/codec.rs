//! Flat text codec
//!
//! One record per `\n`-terminated line, fields joined by the delimiter.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, warn};

use crate::error::Result;
use crate::record::{Record, RecordId};
use crate::store::RecordStore;

/// Why a line was left out of a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer fields than the record shape needs
    TooFewFields { found: usize, required: usize },

    /// A field did not parse (non-numeric id, negative count, ...)
    Unparseable,

    /// Parsed, but broke a shape invariant or the caller's predicate
    Invalid,

    /// Id already taken by an earlier record
    DuplicateId(RecordId),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooFewFields { found, required } => {
                write!(f, "{} fields, need {}", found, required)
            }
            SkipReason::Unparseable => write!(f, "unparseable field"),
            SkipReason::Invalid => write!(f, "failed validation"),
            SkipReason::DuplicateId(id) => write!(f, "duplicate id {}", id),
        }
    }
}

/// A skipped line (1-based line number)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_no: usize,
    pub reason: SkipReason,
}

/// Outcome of a lenient load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records admitted into the store
    pub accepted: usize,

    /// Blank lines ignored (shapes with `SKIP_BLANK` only)
    pub blank: usize,

    /// Malformed or invalid lines, in file order
    pub skipped: Vec<SkippedLine>,

    /// Largest id admitted, for identified shapes
    pub max_id: Option<RecordId>,
}

impl LoadReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Id the loaded store will hand out next
    pub fn next_id(&self) -> Result<RecordId> {
        self.max_id.unwrap_or_default().next()
    }
}

/// Serialize every live record, one line each
///
/// An empty store yields an empty string.
pub fn serialize<R: Record>(store: &RecordStore<R>) -> String {
    // Rough guess to avoid regrowing the blob for typical records.
    let mut out = String::with_capacity(store.len() * 64);
    for record in store {
        record.write_fields(&mut out);
        out.push('\n');
    }
    out
}

/// Parse `text` into `store`, admitting every valid record
pub fn deserialize<R: Record>(text: &str, store: RecordStore<R>) -> Result<(RecordStore<R>, LoadReport)> {
    deserialize_with(text, store, |_| true)
}

/// Parse `text` into `store`, also requiring `predicate` to accept the raw
/// fields of each line
///
/// Bad lines are skipped and reported, never fatal. A repeated id is skipped
/// too. Only a failure to grow the store aborts the load.
pub fn deserialize_with<R, P>(
    text: &str,
    mut store: RecordStore<R>,
    mut predicate: P,
) -> Result<(RecordStore<R>, LoadReport)>
where
    R: Record,
    P: FnMut(&[&str]) -> bool,
{
    let mut report = LoadReport::default();
    // Ids must stay unique within the store; the first occurrence wins.
    let mut seen: HashSet<RecordId> = store.iter().filter_map(Record::seed_id).collect();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim_end_matches('\r');

        if line.is_empty() && R::SKIP_BLANK {
            report.blank += 1;
            continue;
        }

        let decoded = decode_line::<R, P>(line, &mut predicate).and_then(|record| {
            match record.seed_id() {
                Some(id) if !seen.insert(id) => Err(SkipReason::DuplicateId(id)),
                _ => Ok(record),
            }
        });

        match decoded {
            Ok(record) => {
                if let Some(id) = record.seed_id() {
                    report.max_id = Some(report.max_id.map_or(id, |max| max.max(id)));
                }
                store.append(record)?;
                report.accepted += 1;
            }
            Err(reason) => {
                warn!(kind = R::KIND, line_no, %reason, "skipping line");
                report.skipped.push(SkippedLine { line_no, reason });
            }
        }
    }

    debug!(
        kind = R::KIND,
        accepted = report.accepted,
        skipped = report.skipped.len(),
        "decoded records"
    );
    Ok((store, report))
}

fn decode_line<R, P>(line: &str, predicate: &mut P) -> std::result::Result<R, SkipReason>
where
    R: Record,
    P: FnMut(&[&str]) -> bool,
{
    let fields = R::split(line);
    if fields.len() < R::MIN_FIELDS {
        return Err(SkipReason::TooFewFields {
            found: fields.len(),
            required: R::MIN_FIELDS,
        });
    }
    let record = R::from_fields(&fields).ok_or(SkipReason::Unparseable)?;
    if !record.is_valid() || !predicate(&fields) {
        return Err(SkipReason::Invalid);
    }
    Ok(record)
}
