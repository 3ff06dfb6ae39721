use anyhow::Result;

use super::files::{record, text, InvalidRecord, Record, Store, BOOKS};
use crate::models::Book;

/// Load every book in file order.
pub fn fetch_books(store: &Store) -> Result<Vec<Book>> {
    let books = store
        .load(&BOOKS)?
        .iter()
        .enumerate()
        .map(|(idx, row)| book_from_record(idx + 1, row))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(books)
}

/// Rewrite the books table.
pub fn save_books(store: &Store, books: &[Book]) -> Result<()> {
    let records: Vec<Record> = books.iter().map(book_to_record).collect();
    store.save(&BOOKS, &records)
}

fn book_from_record(row: usize, record: &Record) -> Result<Book, InvalidRecord> {
    let count = |field: &'static str| -> Result<u32, InvalidRecord> {
        let value = text(record, field);
        value.parse::<u32>().map_err(|_| InvalidRecord {
            table: BOOKS.file_name,
            row,
            field,
            value,
        })
    };

    let quantity = count("quantity")?;
    let available = count("available")?;
    if available > quantity {
        return Err(InvalidRecord {
            table: BOOKS.file_name,
            row,
            field: "available",
            value: available.to_string(),
        });
    }

    Ok(Book {
        id: text(record, "id"),
        title: text(record, "title"),
        author: text(record, "author"),
        isbn: text(record, "isbn"),
        quantity,
        available,
    })
}

fn book_to_record(book: &Book) -> Record {
    record([
        ("id", book.id.clone()),
        ("title", book.title.clone()),
        ("author", book.author.clone()),
        ("isbn", book.isbn.clone()),
        ("quantity", book.quantity.to_string()),
        ("available", book.available.to_string()),
    ])
}
