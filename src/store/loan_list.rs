//! Codec for the `borrowed_books` column of `members.csv`.
//!
//! The column holds a bracketed list of quoted `book_id:YYYY-MM-DD` entries,
//! for example `['3:2024-05-01', '7:2024-05-09']`. It is kept so older data
//! files can be migrated and so the members table stays readable on its own;
//! the loans table is the source of truth.

use std::iter::Peekable;
use std::str::CharIndices;

use chrono::NaiveDate;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One decoded `book_id:date` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanEntry {
    pub book_id: String,
    pub borrowed_on: NaiveDate,
}

/// Reasons a loan list cannot be decoded. Offsets count characters inside the
/// brackets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoanListError {
    #[error("loan list must be enclosed in square brackets")]
    NotAList,
    #[error("unterminated entry starting at offset {0}")]
    Unterminated(usize),
    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("entry '{0}' is not in 'book_id:YYYY-MM-DD' form")]
    BadEntry(String),
    #[error("entry '{0}' has an invalid borrow date")]
    BadDate(String),
}

/// Decode a loan list. Blank input is an empty list.
pub fn parse(raw: &str) -> Result<Vec<LoanEntry>, LoanListError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(LoanListError::NotAList)?;

    split_quoted(inner)?
        .iter()
        .map(|entry| parse_entry(entry))
        .collect()
}

/// Encode entries in the same bracketed form `parse` accepts.
pub fn encode<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, NaiveDate)>,
{
    let body: Vec<String> = entries
        .into_iter()
        .map(|(book_id, borrowed_on)| format!("'{}:{}'", book_id, borrowed_on.format(DATE_FORMAT)))
        .collect();
    format!("[{}]", body.join(", "))
}

fn split_quoted(inner: &str) -> Result<Vec<String>, LoanListError> {
    let mut entries = Vec::new();
    let mut chars = inner.char_indices().peekable();

    loop {
        skip_whitespace(&mut chars);
        let Some((offset, quote)) = chars.next() else {
            break;
        };
        if quote != '\'' && quote != '"' {
            return Err(LoanListError::Unexpected {
                found: quote,
                offset,
            });
        }

        let mut entry = String::new();
        let mut closed = false;
        while let Some((_, ch)) = chars.next() {
            match ch {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        entry.push(escaped);
                    }
                }
                ch if ch == quote => {
                    closed = true;
                    break;
                }
                ch => entry.push(ch),
            }
        }
        if !closed {
            return Err(LoanListError::Unterminated(offset));
        }
        entries.push(entry);

        skip_whitespace(&mut chars);
        match chars.next() {
            None => break,
            Some((_, ',')) => continue,
            Some((offset, found)) => return Err(LoanListError::Unexpected { found, offset }),
        }
    }

    Ok(entries)
}

fn skip_whitespace(chars: &mut Peekable<CharIndices<'_>>) {
    while chars.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}
}

fn parse_entry(entry: &str) -> Result<LoanEntry, LoanListError> {
    let (book_id, date) = entry
        .split_once(':')
        .filter(|(book_id, date)| !book_id.trim().is_empty() && !date.contains(':'))
        .ok_or_else(|| LoanListError::BadEntry(entry.to_string()))?;
    let borrowed_on = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| LoanListError::BadDate(entry.to_string()))?;
    Ok(LoanEntry {
        book_id: book_id.trim().to_string(),
        borrowed_on,
    })
}
