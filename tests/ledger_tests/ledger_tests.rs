//! Tests for Ledger
//!
//! These tests verify:
//! - Adding entries assigns ids and writes `id,date,category,amount,note`
//! - Dates, categories and notes are checked on input
//! - Update keeps the id, delete keeps the order of the rest
//! - Filtering by inclusive date range and case-insensitive category
//! - Summaries over a filtered set
//! - Reopen round trip and lenient loading
//! - A failed save leaves the file on disk as it was

#[path = "../common/mod.rs"]
mod common;

use std::fs;
use std::sync::Arc;

use common::{Fault, FaultyIo};
use shelfkv::ledger::{EntryFilter, Summary};
use shelfkv::record::RecordId;
use shelfkv::{Cents, Config, Ledger, ShelfError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn config_for(temp_dir: &TempDir) -> Config {
    Config::builder()
        .data_dir(temp_dir.path())
        .sync_on_save(false)
        .build()
}

fn setup_temp_ledger() -> (TempDir, Ledger) {
    let temp_dir = TempDir::new().unwrap();
    let (ledger, _) = Ledger::open(config_for(&temp_dir)).unwrap();
    (temp_dir, ledger)
}

/// Four entries over two months and three categories
fn setup_filled_ledger() -> (TempDir, Ledger) {
    let (temp_dir, mut ledger) = setup_temp_ledger();
    ledger.add("2024-01-05", "Food", Cents(-1200), "groceries").unwrap();
    ledger.add("2024-01-31", "Salary", Cents(300000), "").unwrap();
    ledger.add("2024-02-01", "food", Cents(-800), "bakery").unwrap();
    ledger.add("2024-02-14", "Gifts", Cents(-5000), "flowers, card").unwrap();
    (temp_dir, ledger)
}

fn ids<'a>(entries: impl Iterator<Item = &'a shelfkv::LedgerEntry>) -> Vec<u64> {
    entries.map(|entry| entry.id.get()).collect()
}

// =============================================================================
// Entry Tests
// =============================================================================

#[test]
fn test_add_assigns_ids_and_persists() {
    let (temp_dir, mut ledger) = setup_temp_ledger();

    let first = ledger.add("2024-03-01", "Food", Cents(-1250), "lunch").unwrap();
    let second = ledger.add("2024-03-02", "Pay", Cents(10000), "").unwrap();

    assert_eq!(first, RecordId(1));
    assert_eq!(second, RecordId(2));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("ledger.csv")).unwrap(),
        "1,2024-03-01,Food,-12.50,lunch\n2,2024-03-02,Pay,100.00,\n"
    );
}

#[test]
fn test_add_trims_date_and_category() {
    let (_temp, mut ledger) = setup_temp_ledger();

    let id = ledger.add(" 2024-03-01 ", "  Food ", Cents(1), " keep spaces ").unwrap();

    let entry = ledger.get(id).unwrap();
    assert_eq!(entry.date, "2024-03-01");
    assert_eq!(entry.category, "Food");
    assert_eq!(entry.note, " keep spaces ");
}

#[test]
fn test_add_rejects_bad_input() {
    let (_temp, mut ledger) = setup_temp_ledger();

    for (date, category, note) in [
        ("2024-13-01", "Food", ""),
        ("01/03/2024", "Food", ""),
        ("2024-03-01", "  ", ""),
        ("2024-03-01", "Food, Drink", ""),
        ("2024-03-01", "Food", "two\nlines"),
    ] {
        let result = ledger.add(date, category, Cents(100), note);
        assert!(
            matches!(result, Err(ShelfError::InvalidField(_))),
            "{:?} {:?} {:?} should be rejected",
            date,
            category,
            note
        );
    }
    assert!(ledger.entries().is_empty());
}

#[test]
fn test_update_keeps_id_and_position() {
    let (_temp, mut ledger) = setup_filled_ledger();

    ledger
        .update(RecordId(2), "2024-01-30", "Bonus", Cents(50000), "early")
        .unwrap();

    let entry = ledger.get(RecordId(2)).unwrap();
    assert_eq!(entry.date, "2024-01-30");
    assert_eq!(entry.category, "Bonus");
    assert_eq!(entry.amount, Cents(50000));
    assert_eq!(entry.note, "early");
    assert_eq!(ids(ledger.entries().iter()), vec![1, 2, 3, 4]);
}

#[test]
fn test_update_missing_or_invalid() {
    let (_temp, mut ledger) = setup_filled_ledger();

    let missing = ledger.update(RecordId(9), "2024-01-01", "Food", Cents(1), "");
    assert!(matches!(missing, Err(ShelfError::NotFound(RecordId(9)))));

    let invalid = ledger.update(RecordId(1), "someday", "Food", Cents(1), "");
    assert!(matches!(invalid, Err(ShelfError::InvalidField(_))));
    assert_eq!(ledger.get(RecordId(1)).unwrap().date, "2024-01-05");
}

#[test]
fn test_delete_preserves_order() {
    let (_temp, mut ledger) = setup_filled_ledger();

    let removed = ledger.delete(RecordId(2)).unwrap();

    assert_eq!(removed.category, "Salary");
    assert_eq!(ids(ledger.entries().iter()), vec![1, 3, 4]);
    assert!(matches!(ledger.delete(RecordId(2)), Err(ShelfError::NotFound(_))));
}

#[test]
fn test_ids_not_reused_after_deleting_earlier_entry() {
    let (_temp, mut ledger) = setup_filled_ledger();
    ledger.delete(RecordId(1)).unwrap();

    let id = ledger.add("2024-03-01", "Food", Cents(-1), "").unwrap();

    assert_eq!(id, RecordId(5));
}

// =============================================================================
// Filter Tests
// =============================================================================

#[test]
fn test_filter_by_date_range_inclusive() {
    let (_temp, ledger) = setup_filled_ledger();

    let filter = EntryFilter::default().since("2024-01-31").until("2024-02-01");

    assert_eq!(ids(ledger.filter(&filter)), vec![2, 3]);
}

#[test]
fn test_filter_by_category_ignores_case() {
    let (_temp, ledger) = setup_filled_ledger();

    let filter = EntryFilter::default().category("FOOD");

    assert_eq!(ids(ledger.filter(&filter)), vec![1, 3]);
}

#[test]
fn test_filter_combined() {
    let (_temp, ledger) = setup_filled_ledger();

    let filter = EntryFilter::default().category("food").since("2024-02-01");

    assert_eq!(ids(ledger.filter(&filter)), vec![3]);
}

#[test]
fn test_empty_filter_matches_everything() {
    let (_temp, ledger) = setup_filled_ledger();
    assert_eq!(ids(ledger.filter(&EntryFilter::default())), vec![1, 2, 3, 4]);
}

// =============================================================================
// Summary Tests
// =============================================================================

#[test]
fn test_summarize_all_entries() {
    let (_temp, ledger) = setup_filled_ledger();

    let summary = ledger.summarize(&EntryFilter::default()).unwrap();

    assert_eq!(
        summary,
        Summary {
            count: 4,
            total: Cents(293000),
            min: Cents(-5000),
            max: Cents(300000),
            mean: Cents(73250),
        }
    );
}

#[test]
fn test_summarize_filtered() {
    let (_temp, ledger) = setup_filled_ledger();

    let summary = ledger.summarize(&EntryFilter::default().category("food")).unwrap();

    assert_eq!(summary.count, 2);
    assert_eq!(summary.total, Cents(-2000));
    assert_eq!(summary.mean, Cents(-1000));
}

#[test]
fn test_summarize_mean_truncates_toward_zero() {
    let (_temp, mut ledger) = setup_temp_ledger();
    for amount in [-1, -1, 0] {
        ledger.add("2024-01-01", "Misc", Cents(amount), "").unwrap();
    }

    let summary = ledger.summarize(&EntryFilter::default()).unwrap();

    assert_eq!(summary.total, Cents(-2));
    assert_eq!(summary.mean, Cents(0));
}

#[test]
fn test_summarize_no_matches() {
    let (_temp, ledger) = setup_filled_ledger();

    let filter = EntryFilter::default().since("2025-01-01");

    assert_eq!(ledger.summarize(&filter), None);
}

#[test]
fn test_summary_total_saturates() {
    let (_temp, mut ledger) = setup_temp_ledger();
    ledger.add("2024-01-01", "Huge", Cents(i64::MAX), "").unwrap();
    ledger.add("2024-01-02", "Huge", Cents(i64::MAX), "").unwrap();

    let summary = ledger.summarize(&EntryFilter::default()).unwrap();

    assert_eq!(summary.total, Cents(i64::MAX));
    assert_eq!(summary.mean, Cents(i64::MAX));
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_reopen_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(&temp_dir);
    {
        let (mut ledger, _) = Ledger::open(config.clone()).unwrap();
        ledger.add("2024-02-14", "Gifts", Cents(-5000), "flowers, card").unwrap();
        ledger.add("2024-02-15", "Refund", Cents(7), "").unwrap();
    }

    let (ledger, report) = Ledger::open(config).unwrap();

    assert_eq!(report.accepted, 2);
    let entries: Vec<_> = ledger.entries().iter().cloned().collect();
    assert_eq!(entries[0].note, "flowers, card");
    assert_eq!(entries[1].amount, Cents(7));
}

#[test]
fn test_open_skips_bad_lines() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(&temp_dir);
    fs::write(
        config.ledger_path(),
        concat!(
            "1,2024-01-01,Food,-3.00,ok\n",
            "2,2024-02-30,Food,-3.00,bad date\n",
            "3,2024-01-02,Food,abc,bad amount\n",
            "1,2024-01-03,Food,-1.00,repeated id\n",
            "4,2024-01-04,Food,-2.00,\n",
        ),
    )
    .unwrap();

    let (ledger, report) = Ledger::open(config).unwrap();

    assert_eq!(ids(ledger.entries().iter()), vec![1, 4]);
    assert_eq!(report.skipped_count(), 3);
}

#[test]
fn test_autosave_disabled_until_save() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .autosave(false)
        .build();
    let (mut ledger, _) = Ledger::open(config.clone()).unwrap();

    ledger.add("2024-01-01", "Food", Cents(-100), "").unwrap();
    assert!(!config.ledger_path().exists());

    ledger.save().unwrap();
    assert_eq!(
        fs::read_to_string(config.ledger_path()).unwrap(),
        "1,2024-01-01,Food,-1.00,\n"
    );
}

#[test]
fn test_reload_discards_unsaved_changes() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .autosave(false)
        .build();
    let (mut ledger, _) = Ledger::open(config).unwrap();
    ledger.add("2024-01-01", "Food", Cents(-100), "").unwrap();
    ledger.save().unwrap();
    ledger.add("2024-01-02", "Food", Cents(-200), "").unwrap();

    let report = ledger.reload().unwrap();

    assert_eq!(report.accepted, 1);
    assert_eq!(ids(ledger.entries().iter()), vec![1]);
}

#[test]
fn test_failed_autosave_keeps_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(&temp_dir);
    fs::write(config.ledger_path(), "1,2024-01-01,Food,-3.00,\n").unwrap();
    let before = fs::read(config.ledger_path()).unwrap();

    let (mut ledger, _) =
        Ledger::open_with(config.clone(), Arc::new(FaultyIo::new(Fault::WriteAfterCreate))).unwrap();

    let result = ledger.add("2024-01-02", "Food", Cents(-100), "");

    assert!(result.is_err());
    assert_eq!(fs::read(config.ledger_path()).unwrap(), before);
    assert!(!temp_dir.path().join("ledger.csv.tmp").exists());
    // The entry stays in memory for a later save.
    assert_eq!(ledger.entries().len(), 2);
}
