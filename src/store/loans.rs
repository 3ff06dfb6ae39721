use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

use super::files::{record, text, InvalidRecord, Record, Store, LOANS, MEMBERS};
use super::loan_list;
use crate::models::Loan;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Load the loans relation. When `loans.csv` has never been written, loans are
/// seeded from the `borrowed_books` column of the members table instead.
pub fn fetch_loans(store: &Store) -> Result<Vec<Loan>> {
    if !store.exists(&LOANS) {
        let (loans, _) = seed_from_members(store, false)?;
        return Ok(loans);
    }

    let loans = store
        .load(&LOANS)?
        .iter()
        .enumerate()
        .map(|(idx, row)| loan_from_record(idx + 1, row))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(loans)
}

/// Rewrite the loans table, returned loans included.
pub fn save_loans(store: &Store, loans: &[Loan]) -> Result<()> {
    let records: Vec<Record> = loans.iter().map(loan_to_record).collect();
    store.save(&LOANS, &records)
}

/// Loans for read-only queries. Same as [`fetch_loans`], except that while the
/// loans are still seeded from `borrowed_books`, a member whose list does not
/// parse is skipped instead of failing the load. Skipped member ids are
/// returned alongside the loans.
pub fn read_loans(store: &Store) -> Result<(Vec<Loan>, Vec<String>)> {
    if store.exists(&LOANS) {
        return Ok((fetch_loans(store)?, Vec::new()));
    }
    seed_from_members(store, true)
}

fn seed_from_members(store: &Store, skip_malformed: bool) -> Result<(Vec<Loan>, Vec<String>)> {
    let mut loans = Vec::new();
    let mut skipped = Vec::new();
    for row in store.load(&MEMBERS)? {
        let member_id = text(&row, "id");
        let entries = match loan_list::parse(&text(&row, "borrowed_books")) {
            Ok(entries) => entries,
            Err(err) if skip_malformed => {
                warn!(member_id = %member_id, error = %err, "skipping malformed borrowed_books list");
                skipped.push(member_id);
                continue;
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("member '{member_id}' has a malformed borrowed_books list")
                })
            }
        };
        loans.extend(
            entries
                .into_iter()
                .map(|entry| Loan::new(member_id.clone(), entry.book_id, entry.borrowed_on)),
        );
    }

    if !loans.is_empty() {
        info!(count = loans.len(), "seeded loans from borrowed_books column");
    }
    Ok((loans, skipped))
}

fn loan_from_record(row: usize, record: &Record) -> Result<Loan, InvalidRecord> {
    let date = |field: &'static str| -> Result<Option<NaiveDate>, InvalidRecord> {
        let value = text(record, field);
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| InvalidRecord {
                table: LOANS.file_name,
                row,
                field,
                value,
            })
    };

    let borrowed_on = date("borrow_date")?.ok_or_else(|| InvalidRecord {
        table: LOANS.file_name,
        row,
        field: "borrow_date",
        value: String::new(),
    })?;

    Ok(Loan {
        member_id: text(record, "member_id"),
        book_id: text(record, "book_id"),
        borrowed_on,
        returned_on: date("return_date")?,
    })
}

fn loan_to_record(loan: &Loan) -> Record {
    record([
        ("member_id", loan.member_id.clone()),
        ("book_id", loan.book_id.clone()),
        ("borrow_date", loan.borrowed_on.format(DATE_FORMAT).to_string()),
        (
            "return_date",
            loan.returned_on
                .map(|day| day.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        ),
    ])
}
