//! Error taxonomy shared by the catalog, directory, and loan operations.
//!
//! Storage failures keep their `anyhow` context chain so the UI can surface the
//! innermost cause, while domain failures carry enough data to build a friendly
//! message without re-querying the store.

use thiserror::Error;

/// Failures reported by the library operations. None of them leave partially
/// written data behind: every variant except `Storage` is raised before the
/// first save.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Form input that cannot be accepted (blank title, bad quantity, ...).
    #[error("{0}")]
    InvalidInput(String),

    #[error("Member with ID '{0}' not found.")]
    MemberNotFound(String),

    #[error("Book with ID '{0}' not found.")]
    BookNotFound(String),

    #[error("Book '{title}' is currently out of stock.")]
    OutOfStock { book_id: String, title: String },

    #[error("Member '{name}' has no borrowed books.")]
    NoActiveLoans { member_id: String, name: String },

    #[error("Book with ID '{book_id}' was not found in {name}'s borrowed list.")]
    LoanNotFound {
        member_id: String,
        name: String,
        book_id: String,
    },

    /// A loan points at a book that is no longer in the catalog.
    #[error("Book with ID '{0}' not found in library inventory. (Data inconsistency)")]
    Inconsistent(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LibraryError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

pub type LibraryResult<T> = Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_read_like_console_feedback() {
        let err = LibraryError::OutOfStock {
            book_id: "4".into(),
            title: "Dune".into(),
        };
        assert_eq!(err.to_string(), "Book 'Dune' is currently out of stock.");

        let err = LibraryError::LoanNotFound {
            member_id: "1".into(),
            name: "Ada".into(),
            book_id: "9".into(),
        };
        assert_eq!(
            err.to_string(),
            "Book with ID '9' was not found in Ada's borrowed list."
        );
    }

    #[test]
    fn storage_errors_are_transparent() {
        let err: LibraryError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.to_string(), "disk full");
    }
}
