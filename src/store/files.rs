use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

/// One row of a table, keyed by header name.
pub type Record = HashMap<String, String>;

/// A flat-file table: the CSV file name inside the data directory plus the
/// declared header. Only declared fields are written back on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub file_name: &'static str,
    pub fields: &'static [&'static str],
}

pub const BOOKS: Table = Table {
    file_name: "books.csv",
    fields: &["id", "title", "author", "isbn", "quantity", "available"],
};

pub const MEMBERS: Table = Table {
    file_name: "members.csv",
    fields: &["id", "name", "contact", "borrowed_books"],
};

pub const LOANS: Table = Table {
    file_name: "loans.csv",
    fields: &["member_id", "book_id", "borrow_date", "return_date"],
};

/// A row whose typed field could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{table} row {row}: {field} '{value}' is not valid")]
pub struct InvalidRecord {
    pub table: &'static str,
    /// 1-based data row, not counting the header.
    pub row: usize,
    pub field: &'static str,
    pub value: String,
}

/// Handle on the data directory that holds every table. Each load or save opens
/// the file, reads or rewrites it in full, and closes it again.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    /// Create the data directory if needed and return a handle rooted there.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, table: &Table) -> PathBuf {
        self.data_dir.join(table.file_name)
    }

    pub fn exists(&self, table: &Table) -> bool {
        self.path(table).is_file()
    }

    /// Read every row of `table`. A missing or zero-length file is an empty
    /// table rather than an error.
    pub fn load(&self, table: &Table) -> Result<Vec<Record>> {
        let path = self.path(table);
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to inspect {}", path.display()))
            }
        };
        if metadata.len() == 0 {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let headers = reader
            .headers()
            .with_context(|| format!("failed to read header of {}", path.display()))?
            .clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.with_context(|| format!("failed to read row of {}", path.display()))?;
            let record: Record = headers
                .iter()
                .zip(row.iter())
                .map(|(field, value)| (field.to_string(), value.to_string()))
                .collect();
            records.push(record);
        }

        debug!(table = table.file_name, rows = records.len(), "loaded table");
        Ok(records)
    }

    /// Overwrite `table` with `records`. The header is the declared field list;
    /// undeclared keys are dropped and absent ones are written empty.
    pub fn save(&self, table: &Table, records: &[Record]) -> Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("failed to create data directory {}", self.data_dir.display())
        })?;
        let path = self.path(table);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to open {} for writing", path.display()))?;

        writer
            .write_record(table.fields)
            .with_context(|| format!("failed to write header of {}", path.display()))?;
        for record in records {
            let row = table
                .fields
                .iter()
                .map(|field| record.get(*field).map(String::as_str).unwrap_or(""));
            writer
                .write_record(row)
                .with_context(|| format!("failed to write row of {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", path.display()))?;

        debug!(table = table.file_name, rows = records.len(), "saved table");
        Ok(())
    }
}

/// Text value of `field`, empty when the column is missing from the row.
pub(crate) fn text(record: &Record, field: &str) -> String {
    record.get(field).map(|value| value.trim().to_string()).unwrap_or_default()
}

/// Build a record from `(field, value)` pairs.
pub(crate) fn record<'a, I>(pairs: I) -> Record
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    pairs
        .into_iter()
        .map(|(field, value)| (field.to_string(), value))
        .collect()
}
