//! Required-column check for decoded documents.

use crate::error::{EngineError, Result};

/// Canonical header for the contact's first name.
pub const FIRST_NAME_COLUMN: &str = "FirstName";
/// Canonical header for the contact's phone number.
pub const PHONE_COLUMN: &str = "Phone";
/// Canonical header for free-text notes. Optional.
pub const NOTES_COLUMN: &str = "Notes";

/// Columns every upload must carry, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 2] = [FIRST_NAME_COLUMN, PHONE_COLUMN];

/// Confirm that every required column is present.
///
/// Matching is exact and case-sensitive against already-trimmed headers. All
/// absent names are reported together.
pub fn validate_headers<S: AsRef<str>>(headers: &[S]) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h.as_ref() == **required))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(EngineError::MissingColumns { columns: missing })
    }
}
