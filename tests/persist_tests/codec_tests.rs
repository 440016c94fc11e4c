//! Tests for the flat text codec
//!
//! These tests verify:
//! - Serialization format (one line per record, newline terminated)
//! - Round trip of books, borrows and text lines
//! - Lenient parsing: short, unparseable and invalid lines are skipped
//! - Extra field predicates
//! - Repeated ids are skipped, first occurrence wins
//! - Max id tracking for next_id seeding

use shelfkv::config::AllocPolicy;
use shelfkv::persist::{deserialize, deserialize_with, serialize, SkipReason, SkippedLine};
use shelfkv::record::{Book, BorrowRecord, RecordId, TextLine};
use shelfkv::store::RecordStore;
use shelfkv::ShelfError;

// =============================================================================
// Helper Functions
// =============================================================================

fn empty<R: shelfkv::Record>() -> RecordStore<R> {
    RecordStore::new(4, AllocPolicy::Propagate)
}

fn books(entries: &[(u64, &str, &str, u32, u32)]) -> RecordStore<Book> {
    let mut store = empty();
    for &(id, title, author, total, available) in entries {
        let mut book = Book::new(RecordId(id), title, author, total);
        book.available = available;
        store.append(book).unwrap();
    }
    store
}

// =============================================================================
// Serialize Tests
// =============================================================================

#[test]
fn test_serialize_empty_store() {
    let store: RecordStore<Book> = empty();
    assert_eq!(serialize(&store), "");
}

#[test]
fn test_serialize_books() {
    let store = books(&[(1, "Dune", "Herbert", 3, 2), (2, "Emma", "Austen", 1, 1)]);

    assert_eq!(serialize(&store), "1,Dune,Herbert,3,2\n2,Emma,Austen,1,1\n");
}

#[test]
fn test_serialize_borrows_open_and_closed() {
    let mut store: RecordStore<BorrowRecord> = empty();
    store.append(BorrowRecord::open(RecordId(5), RecordId(1), "2024-02-01")).unwrap();
    let mut closed = BorrowRecord::open(RecordId(6), RecordId(2), "2024-02-02");
    closed.return_date = Some("2024-02-10".to_string());
    store.append(closed).unwrap();

    assert_eq!(serialize(&store), "5,1,2024-02-01,\n6,2,2024-02-02,2024-02-10\n");
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_books() {
    let original = books(&[
        (1, "A Tale", "Dickens", 5, 5),
        (4, "Ulysses", "Joyce", 2, 0),
        (9, "Beloved", "Morrison", 7, 3),
    ]);

    let (loaded, report) = deserialize::<Book>(&serialize(&original), empty()).unwrap();

    assert_eq!(loaded.as_slice(), original.as_slice());
    assert_eq!(report.accepted, 3);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_round_trip_borrows() {
    let mut original: RecordStore<BorrowRecord> = empty();
    for i in 1..=10u64 {
        let mut borrow = BorrowRecord::open(RecordId(i), RecordId(i % 3 + 1), "2024-05-01");
        if i % 2 == 0 {
            borrow.return_date = Some("2024-05-09".to_string());
        }
        original.append(borrow).unwrap();
    }

    let (loaded, _) = deserialize::<BorrowRecord>(&serialize(&original), empty()).unwrap();

    assert_eq!(loaded.as_slice(), original.as_slice());
}

#[test]
fn test_round_trip_text_lines_with_blanks_and_commas() {
    let mut original: RecordStore<TextLine> = empty();
    for text in ["first, with comma", "", "  indented", ""] {
        original.append(TextLine::new(text)).unwrap();
    }

    let (loaded, report) = deserialize::<TextLine>(&serialize(&original), empty()).unwrap();

    assert_eq!(loaded.as_slice(), original.as_slice());
    assert_eq!(report.blank, 0);
}

// =============================================================================
// Lenient Parsing Tests
// =============================================================================

#[test]
fn test_skips_lines_with_too_few_fields() {
    let text = "1,Dune,Herbert,3,3\n2,Short,Line\n3,Emma,Austen,1,1\n";

    let (store, report) = deserialize::<Book>(text, empty()).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(
        report.skipped,
        vec![SkippedLine {
            line_no: 2,
            reason: SkipReason::TooFewFields { found: 3, required: 5 },
        }]
    );
}

#[test]
fn test_skips_invalid_records() {
    let text = concat!(
        "1,Good,Author,2,1\n",
        "0,Zero Id,Author,2,1\n",
        "2,Overdrawn,Author,1,2\n",
        "x,Bad Id,Author,1,1\n",
        "3,Good,Author,4,4\n",
    );

    let (store, report) = deserialize::<Book>(text, empty()).unwrap();

    let ids: Vec<u64> = store.iter().map(|b| b.id.get()).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(report.accepted, 2);
    assert_eq!(report.skipped_count(), 3);
    assert_eq!(report.skipped[0].reason, SkipReason::Invalid);
    assert_eq!(report.skipped[1].reason, SkipReason::Invalid);
    assert_eq!(report.skipped[2].reason, SkipReason::Unparseable);
}

#[test]
fn test_n_good_m_bad_yields_n_records() {
    let mut text = String::new();
    for id in 1..=20u64 {
        text.push_str(&format!("{},T{},A{},3,3\n", id, id, id));
        if id % 4 == 0 {
            text.push_str("garbage\n");
            text.push_str(&format!("{},T,A,1,9\n", id + 100));
        }
    }

    let (store, report) = deserialize::<Book>(&text, empty()).unwrap();

    assert_eq!(store.len(), 20);
    assert_eq!(report.skipped_count(), 10);
}

#[test]
fn test_blank_lines_and_crlf() {
    let text = "1,Dune,Herbert,3,3\r\n\r\n\n2,Emma,Austen,1,1\r\n";

    let (store, report) = deserialize::<Book>(text, empty()).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.get(1).unwrap().available, 1);
    assert_eq!(report.blank, 2);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_last_line_without_newline() {
    let (store, _) = deserialize::<Book>("1,Dune,Herbert,3,3", empty()).unwrap();
    assert_eq!(store.len(), 1);
}

#[test]
fn test_borrow_without_date_skipped() {
    let text = "1,2,,\n1,2,2024-01-01,\n";

    let (store, report) = deserialize::<BorrowRecord>(text, empty()).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(report.skipped[0].line_no, 1);
}

#[test]
fn test_field_predicate_rejects_lines() {
    let text = "1,Dune,Herbert,3,3\n2,Emma,Austen,1,1\n";

    let (store, report) =
        deserialize_with::<Book, _>(text, empty(), |fields| fields[2] != "Austen").unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(0).unwrap().author, "Herbert");
    assert_eq!(report.skipped[0].reason, SkipReason::Invalid);
}

#[test]
fn test_delimiter_in_field_is_not_escaped() {
    // A title holding the delimiter shifts every later field on reload.
    let store = books(&[(1, "Title, The", "Someone", 2, 2)]);
    let text = serialize(&store);

    assert_eq!(text, "1,Title, The,Someone,2,2\n");

    let (loaded, report) = deserialize::<Book>(&text, empty()).unwrap();
    assert!(loaded.is_empty());
    assert_eq!(report.skipped[0].reason, SkipReason::Unparseable);
}

#[test]
fn test_duplicate_ids_skipped() {
    let text = "1,A,X,1,1\n2,B,Y,1,1\n1,C,Z,1,1\n";

    let (store, report) = deserialize::<Book>(text, empty()).unwrap();

    let titles: Vec<&str> = store.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
    assert_eq!(report.accepted, 2);
    assert_eq!(
        report.skipped,
        vec![SkippedLine {
            line_no: 3,
            reason: SkipReason::DuplicateId(RecordId(1)),
        }]
    );
    assert_eq!(report.skipped[0].reason.to_string(), "duplicate id 1");
}

#[test]
fn test_duplicate_of_existing_record_skipped() {
    let existing = books(&[(5, "Kept", "Author", 1, 1)]);

    let (store, report) = deserialize::<Book>("5,Clash,Other,2,2\n6,New,Other,2,2\n", existing).unwrap();

    let ids: Vec<u64> = store.iter().map(|b| b.id.get()).collect();
    assert_eq!(ids, vec![5, 6]);
    assert_eq!(store.get(0).unwrap().title, "Kept");
    assert_eq!(report.skipped[0].reason, SkipReason::DuplicateId(RecordId(5)));
}

#[test]
fn test_positional_shapes_allow_repeats() {
    let (store, report) = deserialize::<TextLine>("same\nsame\n", empty()).unwrap();

    assert_eq!(store.len(), 2);
    assert!(report.skipped.is_empty());
}

// =============================================================================
// Id Seeding Tests
// =============================================================================

#[test]
fn test_report_tracks_max_id() {
    let text = "4,A,B,1,1\n11,C,D,1,1\n7,E,F,1,1\n";

    let (store, report) = deserialize::<Book>(text, empty()).unwrap();

    assert_eq!(report.max_id, Some(RecordId(11)));
    assert_eq!(report.next_id().unwrap(), RecordId(12));
    assert_eq!(store.next_id().unwrap(), RecordId(12));
}

#[test]
fn test_report_ignores_skipped_ids() {
    let text = "4,A,B,1,1\n50,C,D,1,2\n";

    let (_, report) = deserialize::<Book>(text, empty()).unwrap();

    assert_eq!(report.max_id, Some(RecordId(4)));
}

#[test]
fn test_positional_shapes_have_no_max_id() {
    let (_, report) = deserialize::<TextLine>("a\nb\n", empty()).unwrap();
    assert_eq!(report.max_id, None);
    assert_eq!(report.next_id().unwrap(), RecordId(1));
}

#[test]
fn test_max_id_loads_but_cannot_seed() {
    let text = "18446744073709551615,Max,Author,1,1\n";

    let (store, report) = deserialize::<Book>(text, empty()).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(report.max_id, Some(RecordId(u64::MAX)));
    assert!(matches!(report.next_id(), Err(ShelfError::IdSpaceExhausted(_))));
    assert!(matches!(store.next_id(), Err(ShelfError::IdSpaceExhausted(_))));
}
