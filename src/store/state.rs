use anyhow::Result;

use super::books::{fetch_books, save_books};
use super::files::Store;
use super::loans::{fetch_loans, read_loans, save_loans};
use super::members::{fetch_members, save_members};
use crate::models::{Book, Loan, Member};

/// Every table loaded at once, for operations that touch more than one of
/// them. Mutations happen in memory and are written back with [`save_state`].
#[derive(Debug, Clone, Default)]
pub struct LibraryState {
    pub books: Vec<Book>,
    pub members: Vec<Member>,
    pub loans: Vec<Loan>,
    /// Members left out of `loans` because their legacy `borrowed_books` list
    /// could not be read. Only [`read_state`] fills this in.
    pub unreadable_members: Vec<String>,
}

impl LibraryState {
    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    /// Active loans of one member, oldest first.
    pub fn active_loans<'a>(
        &'a self,
        member_id: &'a str,
    ) -> impl Iterator<Item = &'a Loan> + 'a {
        self.loans
            .iter()
            .filter(move |loan| loan.is_active() && loan.member_id == member_id)
    }
}

pub fn load_state(store: &Store) -> Result<LibraryState> {
    Ok(LibraryState {
        books: fetch_books(store)?,
        members: fetch_members(store)?,
        loans: fetch_loans(store)?,
        unreadable_members: Vec::new(),
    })
}

/// Snapshot for queries that never write back. Members with unreadable legacy
/// loan lists are skipped rather than failing the whole load, so the result
/// must not be passed to [`save_state`].
pub fn read_state(store: &Store) -> Result<LibraryState> {
    let (loans, unreadable_members) = read_loans(store)?;
    Ok(LibraryState {
        books: fetch_books(store)?,
        members: fetch_members(store)?,
        loans,
        unreadable_members,
    })
}

/// Write all three tables. Not atomic: a failure part way leaves the earlier
/// tables rewritten.
pub fn save_state(store: &Store, state: &LibraryState) -> Result<()> {
    save_books(store, &state.books)?;
    save_loans(store, &state.loans)?;
    save_members(store, &state.members, &state.loans)
}
