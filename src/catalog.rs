//! Book catalog operations: adding titles and the read-only listings.

use tracing::info;

use crate::error::{LibraryError, LibraryResult};
use crate::models::Book;
use crate::store::{fetch_books, next_id, save_books, Store};

/// Validate a typed quantity. Only whole, non-negative numbers are accepted.
pub fn parse_quantity(raw: &str) -> LibraryResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        LibraryError::invalid_input("Invalid quantity. Please enter a non-negative number.")
    })
}

/// Add a title with `quantity` copies, all of them available.
pub fn add_book(
    store: &Store,
    title: &str,
    author: &str,
    isbn: &str,
    quantity: u32,
) -> LibraryResult<Book> {
    let title = title.trim();
    if title.is_empty() {
        return Err(LibraryError::invalid_input("Book title is required."));
    }

    let mut books = fetch_books(store)?;
    let book = Book {
        id: next_id(books.iter().map(|book| book.id.as_str())),
        title: title.to_string(),
        author: author.trim().to_string(),
        isbn: isbn.trim().to_string(),
        quantity,
        available: quantity,
    };
    books.push(book.clone());
    save_books(store, &books)?;

    info!(book_id = %book.id, title = %book.title, quantity, "added book");
    Ok(book)
}

pub fn list_books(store: &Store) -> LibraryResult<Vec<Book>> {
    Ok(fetch_books(store)?)
}

/// Books with at least one copy on the shelf.
pub fn list_available_books(store: &Store) -> LibraryResult<Vec<Book>> {
    Ok(fetch_books(store)?
        .into_iter()
        .filter(Book::is_available)
        .collect())
}

/// Case-insensitive substring match on title or author. A blank term
/// matches every book.
pub fn search_books(store: &Store, term: &str) -> LibraryResult<Vec<Book>> {
    let needle = term.trim().to_lowercase();
    Ok(fetch_books(store)?
        .into_iter()
        .filter(|book| {
            book.title.to_lowercase().contains(&needle)
                || book.author.to_lowercase().contains(&needle)
        })
        .collect())
}

pub fn find_book(store: &Store, id: &str) -> LibraryResult<Book> {
    let id = id.trim();
    fetch_books(store)?
        .into_iter()
        .find(|book| book.id == id)
        .ok_or_else(|| LibraryError::BookNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn add_assigns_sequential_ids_and_full_stock() {
        let (_dir, store) = store();
        let dune = add_book(&store, " Dune ", "Frank Herbert", "", 2).unwrap();
        let emma = add_book(&store, "Emma", "Jane Austen", "123", 0).unwrap();

        assert_eq!(dune.id, "1");
        assert_eq!(dune.title, "Dune");
        assert_eq!(dune.available, 2);
        assert_eq!(emma.id, "2");
        assert_eq!(list_books(&store).unwrap(), vec![dune, emma]);
    }

    #[test]
    fn blank_title_is_rejected_before_saving() {
        let (_dir, store) = store();
        let err = add_book(&store, "   ", "Nobody", "", 1).unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput(_)));
        assert!(list_books(&store).unwrap().is_empty());
    }

    #[test]
    fn quantity_must_be_a_non_negative_integer() {
        assert_eq!(parse_quantity(" 12 ").unwrap(), 12);
        assert_eq!(parse_quantity("0").unwrap(), 0);
        for raw in ["", "-1", "two", "1.5"] {
            assert!(matches!(
                parse_quantity(raw),
                Err(LibraryError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn available_listing_skips_empty_shelves() {
        let (_dir, store) = store();
        add_book(&store, "Dune", "Frank Herbert", "", 0).unwrap();
        add_book(&store, "Emma", "Jane Austen", "", 1).unwrap();

        let titles: Vec<_> = list_available_books(&store)
            .unwrap()
            .into_iter()
            .map(|book| book.title)
            .collect();
        assert_eq!(titles, vec!["Emma"]);
    }

    #[test]
    fn search_matches_title_or_author_ignoring_case() {
        let (_dir, store) = store();
        add_book(&store, "Dune", "Frank Herbert", "", 1).unwrap();
        add_book(&store, "Emma", "Jane Austen", "", 1).unwrap();
        add_book(&store, "Persuasion", "Jane Austen", "", 1).unwrap();

        assert_eq!(search_books(&store, "AUSTEN").unwrap().len(), 2);
        assert_eq!(search_books(&store, "un").unwrap()[0].title, "Dune");
        assert!(search_books(&store, "tolkien").unwrap().is_empty());
        assert_eq!(search_books(&store, "").unwrap().len(), 3);
    }

    #[test]
    fn find_reports_unknown_ids() {
        let (_dir, store) = store();
        add_book(&store, "Dune", "Frank Herbert", "", 1).unwrap();
        assert_eq!(find_book(&store, " 1 ").unwrap().title, "Dune");
        assert!(matches!(
            find_book(&store, "9"),
            Err(LibraryError::BookNotFound(id)) if id == "9"
        ));
    }
}
