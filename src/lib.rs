//! Core library surface for the library catalog manager.
//!
//! Books, members and loans live in CSV files under a data directory. The
//! operation modules (`catalog`, `members`, `loans`, `report`) load what they
//! need, apply one change, and write it back; the `ui` module drives them from
//! a terminal menu.
pub mod catalog;
pub mod config;
pub mod error;
pub mod loans;
pub mod logging;
pub mod members;
pub mod models;
pub mod report;
pub mod store;
pub mod ui;

pub use config::Config;
pub use error::{LibraryError, LibraryResult};

/// Domain types the operations hand back.
pub use models::{Book, Loan, Member, MemberLoan, OverdueLoan, LOAN_PERIOD_DAYS};

pub use store::Store;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
