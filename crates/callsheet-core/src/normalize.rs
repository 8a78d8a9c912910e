//! Row → contact normalization.
//!
//! Rows lacking a first name or phone (after trimming) are dropped silently;
//! partial files are normal. Surviving rows keep their original order.

use callsheet_state::ContactRecord;

use crate::error::{EngineError, Result};
use crate::schema::{FIRST_NAME_COLUMN, NOTES_COLUMN, PHONE_COLUMN};
use crate::tabular::Row;

/// Outcome of normalizing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Unassigned contacts, in source order
    pub contacts: Vec<ContactRecord>,
    /// Rows skipped for a blank first name or phone
    pub dropped: usize,
}

impl Normalized {
    /// Fail with `NoValidData` when nothing survived.
    pub fn require_contacts(self) -> Result<Self> {
        if self.contacts.is_empty() {
            return Err(EngineError::NoValidData);
        }
        Ok(self)
    }
}

/// Incremental normalizer, fed one row at a time.
#[derive(Debug, Default)]
pub struct Normalizer {
    out: Normalized,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: &Row) {
        match normalize_row(row) {
            Some(contact) => self.out.contacts.push(contact),
            None => self.out.dropped += 1,
        }
    }

    pub fn finish(self) -> Normalized {
        self.out
    }
}

/// Normalize a whole sequence of rows.
pub fn normalize<'a, I>(rows: I) -> Normalized
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut normalizer = Normalizer::new();
    for row in rows {
        normalizer.push(row);
    }
    normalizer.finish()
}

/// Build a contact from one row, or `None` if a mandatory value is blank.
pub fn normalize_row(row: &Row) -> Option<ContactRecord> {
    let first_name = trimmed(row, FIRST_NAME_COLUMN)?;
    let phone = trimmed(row, PHONE_COLUMN)?;
    let notes = row.get(NOTES_COLUMN).map(str::trim).unwrap_or("");
    Some(ContactRecord::new(first_name, phone, notes))
}

fn trimmed<'r>(row: &'r Row, column: &str) -> Option<&'r str> {
    row.get(column).map(str::trim).filter(|v| !v.is_empty())
}
