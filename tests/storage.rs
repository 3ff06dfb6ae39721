use std::fs;

use chrono::NaiveDate;
use library_catalog_manager::catalog::{add_book, list_books};
use library_catalog_manager::loans::{borrow_book, member_loans, overdue_loans};
use library_catalog_manager::members::list_members;
use library_catalog_manager::store::{fetch_loans, BOOKS, LOANS, MEMBERS};
use library_catalog_manager::{LibraryError, Store};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_legacy(store: &Store, borrowed: &str) {
    fs::write(
        store.path(&BOOKS),
        "id,title,author,isbn,quantity,available\n\
         1,Dune,Frank Herbert,9780441013593,2,1\n\
         2,Emma,Jane Austen,,1,1\n",
    )
    .unwrap();
    fs::write(
        store.path(&MEMBERS),
        format!("id,name,contact,borrowed_books\n1,Ada,ada@example.org,\"{borrowed}\"\n"),
    )
    .unwrap();
}

#[test]
fn legacy_lists_become_loans_on_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    seed_legacy(&store, "['1:2024-05-01']");
    assert!(!store.exists(&LOANS));

    let (_, loans) = member_loans(&store, "1").unwrap();
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].book.title, "Dune");
    assert_eq!(loans[0].borrowed_on, date(2024, 5, 1));

    let overdue = overdue_loans(&store, date(2024, 5, 20)).unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].overdue_days, 5);

    borrow_book(&store, "1", "2", date(2024, 5, 10)).unwrap();
    assert!(store.exists(&LOANS));
    assert_eq!(fetch_loans(&store).unwrap().len(), 2);

    let members = fs::read_to_string(store.path(&MEMBERS)).unwrap();
    assert!(members.contains("['1:2024-05-01', '2:2024-05-10']"));
}

#[test]
fn malformed_legacy_list_is_reported_and_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    seed_legacy(&store, "['1:2024-13-01']");
    let original = fs::read_to_string(store.path(&MEMBERS)).unwrap();

    let err = borrow_book(&store, "1", "2", date(2024, 5, 10)).unwrap_err();
    assert!(matches!(err, LibraryError::Storage(_)));
    assert!(format!("{err:#}").contains("member '1'"));

    assert_eq!(fs::read_to_string(store.path(&MEMBERS)).unwrap(), original);
    assert!(!store.exists(&LOANS));
    assert_eq!(list_books(&store).unwrap()[1].available, 1);
}

#[test]
fn impossible_stock_counts_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    fs::write(
        store.path(&BOOKS),
        "id,title,author,isbn,quantity,available\n1,Dune,,,1,3\n",
    )
    .unwrap();

    let err = list_books(&store).unwrap_err();
    assert!(matches!(err, LibraryError::Storage(_)));
    assert!(add_book(&store, "Emma", "", "", 1).is_err());
}

#[test]
fn data_files_are_plain_csv_with_headers() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("nested/data")).unwrap();
    assert!(list_members(&store).unwrap().is_empty());

    add_book(&store, "Dune, Messiah", "Frank Herbert", "", 1).unwrap();
    let books = fs::read_to_string(store.path(&BOOKS)).unwrap();
    assert_eq!(
        books,
        "id,title,author,isbn,quantity,available\n1,\"Dune, Messiah\",Frank Herbert,,1,1\n"
    );
    assert_eq!(list_books(&store).unwrap()[0].title, "Dune, Messiah");
}
