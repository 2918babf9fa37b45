//! Candidate record types and field-level validation.
//!
//! This module has zero external dependencies beyond the email regex. It
//! provides:
//!
//! - The raw and validated record types ([`CandidateRow`], [`NewCandidate`])
//! - Constants for the required column set and the accepted age range
//! - Pure, stateless field validators: email normalization, name check,
//!   age parsing
//!
//! Validators are idempotent and safe to call from any context; all state
//! (duplicate detection, counters) lives in [`crate::ingest`].

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

// ── Constants ────────────────────────────────────────────────────────

/// Column names that must be present in the uploaded file's header,
/// compared after trimming and lowercasing.
pub const REQUIRED_COLUMNS: &[&str] = &["email", "name", "age"];

/// Minimum accepted age, inclusive.
pub const MIN_AGE: i32 = 0;

/// Maximum accepted age, inclusive.
pub const MAX_AGE: i32 = 120;

/// Accepted email shape: `local-part@domain.tld`. ASCII word characters,
/// dots, and hyphens in the local part; the domain must contain at least
/// one dot. Intentionally stricter than the full RFC grammar.
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("valid regex"));

// ── Types ────────────────────────────────────────────────────────────

/// One raw, unvalidated row from an uploaded file.
///
/// Field values are cell contents exactly as parsed; an empty string is an
/// empty cell. Never mutated after parse — validation reads it and derives
/// a separate [`NewCandidate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub email: String,
    pub name: String,
    pub age: String,
}

/// A fully validated candidate record, ready for bulk persistence.
///
/// Invariants: `email` is lowercase and matches the accepted email shape,
/// `name` is non-empty and trimmed, `age` is within
/// [`MIN_AGE`]`..=`[`MAX_AGE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCandidate {
    pub email: String,
    pub name: String,
    pub age: i32,
}

// ── Field errors ─────────────────────────────────────────────────────

/// Why an email value failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailError {
    /// The cell was empty or whitespace-only.
    Null,
    /// The trimmed, lowercased value does not match the accepted shape.
    Malformed,
}

/// Why an age value failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeError {
    /// The cell was empty or whitespace-only.
    Null,
    /// The trimmed value does not parse as an integer.
    NotNumeric,
    /// The parsed integer falls outside `MIN_AGE..=MAX_AGE`.
    OutOfRange,
}

// ── Validators ───────────────────────────────────────────────────────

/// Normalize and validate an email cell.
///
/// Trims and lowercases the value, then checks it against the accepted
/// email shape. Returns the normalized string on success.
pub fn normalize_email(raw: &str) -> Result<String, EmailError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EmailError::Null);
    }
    let normalized = trimmed.to_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err(EmailError::Malformed);
    }
    Ok(normalized)
}

/// Returns `true` if a name cell is invalid (empty after trimming).
pub fn is_invalid_name(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Parse and validate an age cell.
///
/// Accepts integers only; a fractional value like `45.7` is `NotNumeric`.
/// The accepted range is `MIN_AGE..=MAX_AGE`, both bounds inclusive.
pub fn parse_age(raw: &str) -> Result<i32, AgeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AgeError::Null);
    }
    let age: i64 = trimmed.parse().map_err(|_| AgeError::NotNumeric)?;
    if age < MIN_AGE as i64 || age > MAX_AGE as i64 {
        return Err(AgeError::OutOfRange);
    }
    Ok(age as i32)
}

// ── Tests ────────────────────────────────────────────────────────────
