//! Flat-file persistence split across logical submodules.

mod books;
mod files;
mod ids;
pub mod loan_list;
mod loans;
mod members;
mod state;

pub use books::{fetch_books, save_books};
pub use files::{InvalidRecord, Record, Store, Table, BOOKS, LOANS, MEMBERS};
pub use ids::next_id;
pub use loan_list::LoanListError;
pub use loans::{fetch_loans, read_loans, save_loans};
pub use members::{fetch_members, save_members};
pub use state::{load_state, read_state, save_state, LibraryState};
