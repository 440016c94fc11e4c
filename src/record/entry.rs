//! Ledger entries
//!
//! On disk: `id,date,category,amount,note`
//!
//! Amounts are written with exactly two decimals (`-12.50`) and held as
//! integer cents, so a save/load cycle never drifts. The note is the last
//! field: it may hold the delimiter, and a missing note reads as empty.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::{parse_id, Identified, Record, RecordId, DELIMITER};
use crate::error::ShelfError;

/// A money amount in hundredths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cents(pub i64);

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Cents {
    type Err = ShelfError;

    /// Accepts `12`, `12.5`, `-12.50`, `+0.07`; at most two decimals
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cents(s.trim())
            .map(Cents)
            .ok_or_else(|| ShelfError::InvalidField(format!("not an amount: {:?}", s)))
    }
}

fn parse_cents(s: &str) -> Option<i64> {
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let (whole, frac) = match digits.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (digits, ""),
    };
    if whole.is_empty() || frac.len() > 2 {
        return None;
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    let cents = whole.checked_mul(100)?.checked_add(frac)?;
    Some(if negative { -cents } else { cents })
}

/// True for a real calendar date written as `YYYY-MM-DD`
///
/// The fixed width makes string order match date order.
pub fn is_iso_date(date: &str) -> bool {
    date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// One income or expense line of a ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: RecordId,
    /// `YYYY-MM-DD`
    pub date: String,
    pub category: String,
    pub amount: Cents,
    pub note: String,
}

impl LedgerEntry {
    pub fn new(
        id: RecordId,
        date: impl Into<String>,
        category: impl Into<String>,
        amount: Cents,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id,
            date: date.into(),
            category: category.into(),
            amount,
            note: note.into(),
        }
    }
}

impl Record for LedgerEntry {
    const KIND: &'static str = "entry";
    const MIN_FIELDS: usize = 4;

    fn from_fields(fields: &[&str]) -> Option<Self> {
        Some(Self {
            id: parse_id(fields[0])?,
            date: fields[1].trim().to_string(),
            category: fields[2].trim().to_string(),
            amount: fields[3].parse().ok()?,
            note: fields.get(4..).map(|rest| rest.join(",")).unwrap_or_default(),
        })
    }

    fn write_fields(&self, out: &mut String) {
        for field in [
            self.id.to_string(),
            self.date.clone(),
            self.category.clone(),
            self.amount.to_string(),
        ] {
            out.push_str(&field);
            out.push(DELIMITER);
        }
        out.push_str(&self.note);
    }

    fn is_valid(&self) -> bool {
        self.id.is_valid() && is_iso_date(&self.date) && !self.category.is_empty()
    }

    fn seed_id(&self) -> Option<RecordId> {
        Some(self.id)
    }

    fn restore_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

impl Identified for LedgerEntry {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}
