//! Borrow and return rules plus the overdue query.
//!
//! Every mutating operation loads all tables, validates against the in-memory
//! copy, and only then writes back. A rejected request therefore never touches
//! the files.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{LibraryError, LibraryResult};
use crate::models::{Book, Loan, Member, MemberLoan, OverdueLoan};
use crate::store::{load_state, read_state, save_state, LibraryState, Store};

/// Outcome of a successful borrow or return, with the book's updated stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanReceipt {
    pub member: Member,
    pub book: Book,
    pub loan: Loan,
}

/// Lend one copy of `book_id` to `member_id`. The same member may hold several
/// copies of one title while stock lasts.
pub fn borrow_book(
    store: &Store,
    member_id: &str,
    book_id: &str,
    today: NaiveDate,
) -> LibraryResult<LoanReceipt> {
    let (member_id, book_id) = (member_id.trim(), book_id.trim());
    let mut state = load_state(store)?;

    let member = state
        .member(member_id)
        .cloned()
        .ok_or_else(|| LibraryError::MemberNotFound(member_id.to_string()))?;
    let book = state
        .books
        .iter_mut()
        .find(|book| book.id == book_id)
        .ok_or_else(|| LibraryError::BookNotFound(book_id.to_string()))?;
    if book.available == 0 {
        return Err(LibraryError::OutOfStock {
            book_id: book.id.clone(),
            title: book.title.clone(),
        });
    }

    book.available -= 1;
    let book = book.clone();
    let loan = Loan::new(member_id, book_id, today);
    state.loans.push(loan.clone());
    save_state(store, &state)?;

    info!(member_id, book_id, available = book.available, "book borrowed");
    Ok(LoanReceipt { member, book, loan })
}

/// Close the oldest active loan of `book_id` held by `member_id` and put the
/// copy back on the shelf.
pub fn return_book(
    store: &Store,
    member_id: &str,
    book_id: &str,
    today: NaiveDate,
) -> LibraryResult<LoanReceipt> {
    let (member_id, book_id) = (member_id.trim(), book_id.trim());
    let mut state = load_state(store)?;

    let member = state
        .member(member_id)
        .cloned()
        .ok_or_else(|| LibraryError::MemberNotFound(member_id.to_string()))?;
    if state.active_loans(member_id).next().is_none() {
        return Err(LibraryError::NoActiveLoans {
            member_id: member.id,
            name: member.name,
        });
    }

    let loan_idx = state
        .loans
        .iter()
        .position(|loan| loan.is_active() && loan.member_id == member_id && loan.book_id == book_id)
        .ok_or_else(|| LibraryError::LoanNotFound {
            member_id: member.id.clone(),
            name: member.name.clone(),
            book_id: book_id.to_string(),
        })?;

    let loan_book_id = state.loans[loan_idx].book_id.clone();
    let book = state
        .books
        .iter_mut()
        .find(|book| book.id == loan_book_id)
        .ok_or_else(|| LibraryError::Inconsistent(loan_book_id.clone()))?;
    if book.available < book.quantity {
        book.available += 1;
    } else {
        warn!(book_id = %book.id, "returned copy of a book with full stock");
    }
    let book = book.clone();

    let loan = &mut state.loans[loan_idx];
    loan.returned_on = Some(today);
    let loan = loan.clone();
    save_state(store, &state)?;

    info!(member_id, book_id, available = book.available, "book returned");
    Ok(LoanReceipt { member, book, loan })
}

/// Active loans of one member joined with their books, oldest first. Loans
/// whose book has disappeared from the catalog are skipped.
pub fn member_loans(store: &Store, member_id: &str) -> LibraryResult<(Member, Vec<MemberLoan>)> {
    let member_id = member_id.trim();
    let state = load_state(store)?;
    let member = state
        .member(member_id)
        .cloned()
        .ok_or_else(|| LibraryError::MemberNotFound(member_id.to_string()))?;

    let loans = state
        .active_loans(member_id)
        .filter_map(|loan| match state.book(&loan.book_id) {
            Some(book) => Some(MemberLoan {
                book: book.clone(),
                borrowed_on: loan.borrowed_on,
            }),
            None => {
                warn!(member_id, book_id = %loan.book_id, "loan refers to an unknown book");
                None
            }
        })
        .collect();
    Ok((member, loans))
}

/// Active loans older than the loan period, grouped by member in file order.
/// Members whose legacy loan list cannot be read are left out.
pub fn overdue_loans(store: &Store, today: NaiveDate) -> LibraryResult<Vec<OverdueLoan>> {
    Ok(collect_overdue(&read_state(store)?, today))
}

/// Overdue computation over an already loaded state, shared with the report.
pub fn collect_overdue(state: &LibraryState, today: NaiveDate) -> Vec<OverdueLoan> {
    let mut overdue = Vec::new();
    for member in &state.members {
        for loan in state.active_loans(&member.id) {
            let Some(overdue_days) = loan.overdue_days(today) else {
                continue;
            };
            let Some(book) = state.book(&loan.book_id) else {
                warn!(member_id = %member.id, book_id = %loan.book_id, "overdue loan refers to an unknown book");
                continue;
            };
            overdue.push(OverdueLoan {
                member_id: member.id.clone(),
                member_name: member.name.clone(),
                book_id: book.id.clone(),
                book_title: book.title.clone(),
                borrowed_on: loan.borrowed_on,
                overdue_days,
            });
        }
    }
    overdue
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;
    use crate::catalog::{add_book, find_book};
    use crate::members::register_member;
    use crate::store::{fetch_books, fetch_loans, save_books};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        register_member(&store, "Ada", "ada@example.org").unwrap();
        register_member(&store, "Bob", "555-0101").unwrap();
        add_book(&store, "Dune", "Frank Herbert", "", 1).unwrap();
        (dir, store)
    }

    #[test]
    fn borrow_decrements_stock_and_records_loan() {
        let (_dir, store) = setup();
        let receipt = borrow_book(&store, "1", "1", day(2024, 3, 1)).unwrap();

        assert_eq!(receipt.book.available, 0);
        assert_eq!(receipt.member.name, "Ada");
        assert_eq!(fetch_loans(&store).unwrap(), vec![Loan::new("1", "1", day(2024, 3, 1))]);
    }

    #[test]
    fn out_of_stock_borrow_changes_nothing() {
        let (_dir, store) = setup();
        borrow_book(&store, "1", "1", day(2024, 3, 1)).unwrap();
        let before = load_state(&store).unwrap();

        let err = borrow_book(&store, "2", "1", day(2024, 3, 2)).unwrap_err();
        assert!(matches!(err, LibraryError::OutOfStock { ref title, .. } if title == "Dune"));

        let after = load_state(&store).unwrap();
        assert_eq!(after.books, before.books);
        assert_eq!(after.loans, before.loans);
    }

    #[test]
    fn unknown_member_or_book_is_rejected() {
        let (_dir, store) = setup();
        assert!(matches!(
            borrow_book(&store, "9", "1", day(2024, 3, 1)),
            Err(LibraryError::MemberNotFound(_))
        ));
        assert!(matches!(
            borrow_book(&store, "1", "9", day(2024, 3, 1)),
            Err(LibraryError::BookNotFound(_))
        ));
        assert_eq!(find_book(&store, "1").unwrap().available, 1);
    }

    #[test]
    fn return_closes_only_the_oldest_matching_loan() {
        let (_dir, store) = setup();
        add_book(&store, "Emma", "Jane Austen", "", 3).unwrap();
        borrow_book(&store, "1", "2", day(2024, 3, 1)).unwrap();
        borrow_book(&store, "1", "2", day(2024, 3, 5)).unwrap();

        let receipt = return_book(&store, "1", "2", day(2024, 3, 10)).unwrap();
        assert_eq!(receipt.loan.borrowed_on, day(2024, 3, 1));
        assert_eq!(receipt.book.available, 2);

        let (_, remaining) = member_loans(&store, "1").unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].borrowed_on, day(2024, 3, 5));
    }

    #[test]
    fn return_without_loans_or_match_fails() {
        let (_dir, store) = setup();
        assert!(matches!(
            return_book(&store, "1", "1", day(2024, 3, 1)),
            Err(LibraryError::NoActiveLoans { .. })
        ));

        borrow_book(&store, "1", "1", day(2024, 3, 1)).unwrap();
        assert!(matches!(
            return_book(&store, "1", "7", day(2024, 3, 2)),
            Err(LibraryError::LoanNotFound { ref book_id, .. }) if book_id == "7"
        ));
        assert!(matches!(
            return_book(&store, "2", "1", day(2024, 3, 2)),
            Err(LibraryError::NoActiveLoans { .. })
        ));
    }

    #[test]
    fn return_resolves_book_by_loan_book_id() {
        let (_dir, store) = setup();
        add_book(&store, "Emma", "Jane Austen", "", 1).unwrap();
        borrow_book(&store, "1", "2", day(2024, 3, 1)).unwrap();

        let receipt = return_book(&store, "1", "2", day(2024, 3, 2)).unwrap();
        assert_eq!(receipt.book.title, "Emma");
        assert_eq!(find_book(&store, "1").unwrap().available, 1);
        assert_eq!(find_book(&store, "2").unwrap().available, 1);
    }

    #[test]
    fn return_of_missing_book_is_inconsistent() {
        let (_dir, store) = setup();
        add_book(&store, "Emma", "Jane Austen", "", 1).unwrap();
        borrow_book(&store, "1", "1", day(2024, 3, 1)).unwrap();
        let remaining: Vec<Book> = fetch_books(&store)
            .unwrap()
            .into_iter()
            .filter(|book| book.id != "1")
            .collect();
        save_books(&store, &remaining).unwrap();

        let err = return_book(&store, "1", "1", day(2024, 3, 2)).unwrap_err();
        assert!(matches!(err, LibraryError::Inconsistent(ref id) if id == "1"));

        let loans = fetch_loans(&store).unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].returned_on, None);
        assert_eq!(find_book(&store, "2").unwrap().available, 1);
    }

    #[test]
    fn return_into_full_stock_is_capped() {
        let (_dir, store) = setup();
        borrow_book(&store, "1", "1", day(2024, 3, 1)).unwrap();
        let restocked: Vec<Book> = fetch_books(&store)
            .unwrap()
            .into_iter()
            .map(|book| Book {
                available: book.quantity,
                ..book
            })
            .collect();
        save_books(&store, &restocked).unwrap();

        let receipt = return_book(&store, "1", "1", day(2024, 3, 2)).unwrap();
        assert_eq!(receipt.book.available, 1);
        assert_eq!(receipt.loan.returned_on, Some(day(2024, 3, 2)));
        assert_eq!(find_book(&store, "1").unwrap().available, 1);
        assert!(member_loans(&store, "1").unwrap().1.is_empty());
    }

    #[test]
    fn overdue_boundary_is_fourteen_days() {
        let (_dir, store) = setup();
        add_book(&store, "Emma", "Jane Austen", "", 1).unwrap();
        let today = day(2024, 4, 30);
        borrow_book(&store, "1", "1", today.checked_sub_days(Days::new(15)).unwrap()).unwrap();
        borrow_book(&store, "2", "2", today.checked_sub_days(Days::new(14)).unwrap()).unwrap();

        let overdue = overdue_loans(&store, today).unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].member_name, "Ada");
        assert_eq!(overdue[0].book_title, "Dune");
        assert_eq!(overdue[0].overdue_days, 1);
    }

    #[test]
    fn returned_loans_drop_out_of_overdue() {
        let (_dir, store) = setup();
        borrow_book(&store, "1", "1", day(2024, 1, 1)).unwrap();
        return_book(&store, "1", "1", day(2024, 3, 1)).unwrap();
        assert!(overdue_loans(&store, day(2024, 3, 1)).unwrap().is_empty());
    }
}
