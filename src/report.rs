//! Library-wide summary figures.

use chrono::NaiveDate;

use crate::error::LibraryResult;
use crate::loans::collect_overdue;
use crate::models::OverdueLoan;
use crate::store::{read_state, LibraryState, Store};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LibraryReport {
    /// Distinct titles in the catalog.
    pub total_titles: usize,
    pub total_copies: u64,
    pub total_available: u64,
    /// Copies out on loan according to the stock counters.
    pub total_borrowed: u64,
    pub total_members: usize,
    pub members_with_loans: usize,
    /// Active loans according to the loans table.
    pub active_loans: usize,
    pub overdue: Vec<OverdueLoan>,
    /// Members whose loans could not be read and are missing from the figures.
    pub skipped_members: Vec<String>,
}

pub fn generate_report(store: &Store, today: NaiveDate) -> LibraryResult<LibraryReport> {
    Ok(summarize(&read_state(store)?, today))
}

pub fn summarize(state: &LibraryState, today: NaiveDate) -> LibraryReport {
    let total_copies: u64 = state.books.iter().map(|book| u64::from(book.quantity)).sum();
    let total_available: u64 = state.books.iter().map(|book| u64::from(book.available)).sum();
    let total_borrowed: u64 = state.books.iter().map(|book| u64::from(book.on_loan())).sum();

    let members_with_loans = state
        .members
        .iter()
        .filter(|member| state.active_loans(&member.id).next().is_some())
        .count();
    let active_loans: usize = state
        .members
        .iter()
        .map(|member| state.active_loans(&member.id).count())
        .sum();

    LibraryReport {
        total_titles: state.books.len(),
        total_copies,
        total_available,
        total_borrowed,
        total_members: state.members.len(),
        members_with_loans,
        active_loans,
        overdue: collect_overdue(state, today),
        skipped_members: state.unreadable_members.clone(),
    }
}
