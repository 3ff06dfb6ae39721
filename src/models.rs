//! Domain models that mirror the CSV tables and get passed throughout the TUI.
//! These types stay light-weight data holders so the store can focus on
//! encoding and the operations modules can focus on the lending rules.

use std::fmt;

use chrono::NaiveDate;

/// Number of days a loan may stay out before it counts as overdue.
pub const LOAN_PERIOD_DAYS: i64 = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A catalog title together with its stock counters.
pub struct Book {
    /// Numeric id kept as text so ids that fail to parse survive a rewrite.
    pub id: String,
    pub title: String,
    pub author: String,
    pub isbn: String,
    /// Total copies owned by the library.
    pub quantity: u32,
    /// Copies currently on the shelf. Never exceeds `quantity`.
    pub available: u32,
}

impl Book {
    /// Copies currently out on loan.
    pub fn on_loan(&self) -> u32 {
        self.quantity.saturating_sub(self.available)
    }

    pub fn is_available(&self) -> bool {
        self.available > 0
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.author.trim().is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} - {}", self.title, self.author)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A registered borrower.
pub struct Member {
    pub id: String,
    pub name: String,
    /// Free-form email or phone number.
    pub contact: String,
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of the loans relation. A loan without `returned_on` is active.
pub struct Loan {
    pub member_id: String,
    pub book_id: String,
    pub borrowed_on: NaiveDate,
    pub returned_on: Option<NaiveDate>,
}

impl Loan {
    pub fn new(
        member_id: impl Into<String>,
        book_id: impl Into<String>,
        borrowed_on: NaiveDate,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            book_id: book_id.into(),
            borrowed_on,
            returned_on: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.returned_on.is_none()
    }

    /// Days past the loan period as of `today`, or `None` while the loan is
    /// still within it. Returned loans are never overdue.
    pub fn overdue_days(&self, today: NaiveDate) -> Option<i64> {
        if !self.is_active() {
            return None;
        }
        let elapsed = (today - self.borrowed_on).num_days();
        (elapsed > LOAN_PERIOD_DAYS).then(|| elapsed - LOAN_PERIOD_DAYS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An active loan joined with the book it refers to, used by the
/// "member's borrowed books" listing.
pub struct MemberLoan {
    pub book: Book,
    pub borrowed_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One line of the overdue report.
pub struct OverdueLoan {
    pub member_id: String,
    pub member_name: String,
    pub book_id: String,
    pub book_title: String,
    pub borrowed_on: NaiveDate,
    pub overdue_days: i64,
}
