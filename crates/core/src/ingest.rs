//! Row validation engine and roster parsing for bulk candidate ingestion.
//!
//! No database access — pure domain logic. The pipeline is split so the
//! caller controls the two I/O points (seeding the duplicate index and the
//! final bulk write):
//!
//! 1. [`parse_roster`] — CSV parse, column normalization, structural checks.
//!    Any structural failure aborts before a single row is validated.
//! 2. [`validate_rows`] — a sequential fold applying [`validate_row`] to
//!    each row, growing the [`DuplicateIndex`] and counting rejections.
//! 3. [`ValidationOutcome::report`] — the caller-facing accounting.
//!
//! Per-row failures never abort the run; each rejected row increments
//! exactly one counter.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::candidate::{
    is_invalid_name, normalize_email, parse_age, CandidateRow, EmailError, NewCandidate,
    REQUIRED_COLUMNS,
};

// ── Structural errors ────────────────────────────────────────────────

/// A failure that aborts the entire ingestion run.
///
/// Per-row field failures are not errors — they are counted in
/// [`RejectionCounters`] and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// The payload could not be read as delimited tabular data. Carries
    /// the parser detail for logging; the display form stays generic.
    #[error("Unable to read the uploaded file as CSV")]
    UnparsablePayload(String),

    /// Two header columns normalize to the same name.
    #[error("Duplicate column name in uploaded file: {0}")]
    DuplicateColumns(String),

    /// One or more required columns are absent from the header.
    #[error("Missing required columns: {}", join_names(.0))]
    MissingColumns(BTreeSet<String>),
}

fn join_names(names: &BTreeSet<String>) -> String {
    names.iter().cloned().collect::<Vec<_>>().join(", ")
}

// ── Rejection accounting ─────────────────────────────────────────────

/// Why a single row was rejected. Exactly one reason per rejected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NullEmail,
    MalformedEmail,
    DuplicateEmail,
    InvalidName,
    InvalidAge,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NullEmail => "null_email",
            Self::MalformedEmail => "invalid_email_format",
            Self::DuplicateEmail => "duplicate_email",
            Self::InvalidName => "invalid_name",
            Self::InvalidAge => "invalid_age",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-reason tally of dropped rows for one ingestion run.
///
/// Owned by the validation fold and returned by value — never shared
/// across runs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RejectionCounters {
    pub null_email: u64,
    pub invalid_email_format: u64,
    pub duplicate_email: u64,
    pub invalid_name: u64,
    pub invalid_age: u64,
}

impl RejectionCounters {
    /// Increment the counter for one rejected row.
    pub fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::NullEmail => self.null_email += 1,
            RejectReason::MalformedEmail => self.invalid_email_format += 1,
            RejectReason::DuplicateEmail => self.duplicate_email += 1,
            RejectReason::InvalidName => self.invalid_name += 1,
            RejectReason::InvalidAge => self.invalid_age += 1,
        }
    }

    /// Sum of all rejection counters.
    pub fn total_skipped(&self) -> u64 {
        self.null_email
            + self.invalid_email_format
            + self.duplicate_email
            + self.invalid_name
            + self.invalid_age
    }
}

// ── Duplicate index ──────────────────────────────────────────────────

/// In-memory set of normalized emails used to detect duplicates within a
/// run and against the existing corpus.
///
/// Seeded once per ingestion run from the corpus key projection and grown
/// as rows are accepted. One instance per run; discarded after.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    keys: HashSet<String>,
}

impl DuplicateIndex {
    /// An empty index (no existing corpus).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from existing corpus keys. Keys are expected to be
    /// normalized (lowercased) already.
    pub fn seed<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn contains(&self, email: &str) -> bool {
        self.keys.contains(email)
    }

    pub fn insert(&mut self, email: String) {
        self.keys.insert(email);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ── Row validation engine ────────────────────────────────────────────

/// Validate one row against the field validators and the duplicate index.
///
/// Checks run in a fixed order and the first failure wins, so a rejected
/// row maps to exactly one [`RejectReason`] even when several fields are
/// invalid: email identity first (it gates deduplication), then name,
/// then age.
///
/// Does not mutate the index; the caller inserts on acceptance.
pub fn validate_row(
    row: &CandidateRow,
    index: &DuplicateIndex,
) -> Result<NewCandidate, RejectReason> {
    let email = match normalize_email(&row.email) {
        Ok(email) => email,
        Err(EmailError::Null) => return Err(RejectReason::NullEmail),
        Err(EmailError::Malformed) => return Err(RejectReason::MalformedEmail),
    };
    if index.contains(&email) {
        return Err(RejectReason::DuplicateEmail);
    }
    if is_invalid_name(&row.name) {
        return Err(RejectReason::InvalidName);
    }
    let age = parse_age(&row.age).map_err(|_| RejectReason::InvalidAge)?;

    Ok(NewCandidate {
        email,
        name: row.name.trim().to_string(),
        age,
    })
}

/// Result of validating all rows of one upload.
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// Records that passed every check, in input order.
    pub accepted: Vec<NewCandidate>,
    /// Per-reason tallies for the dropped rows.
    pub counters: RejectionCounters,
    /// Number of data rows that were processed.
    pub row_count: u64,
}

impl ValidationOutcome {
    /// Build the caller-facing report. The accounting invariant
    /// `accepted_count + total_skipped == row_count` holds by construction.
    pub fn report(&self) -> IngestReport {
        IngestReport {
            accepted_count: self.accepted.len() as u64,
            rejections: self.counters.clone(),
            total_skipped: self.counters.total_skipped(),
        }
    }
}

/// Validate rows in input order as a sequential fold.
///
/// Accepting a row inserts its normalized email into `index`, so a later
/// row with the same email (case-insensitive) is rejected as a duplicate.
/// Rows are processed independently otherwise; nothing aborts the fold.
pub fn validate_rows(rows: &[CandidateRow], index: &mut DuplicateIndex) -> ValidationOutcome {
    let mut outcome = ValidationOutcome {
        row_count: rows.len() as u64,
        ..Default::default()
    };

    for row in rows {
        match validate_row(row, index) {
            Ok(candidate) => {
                index.insert(candidate.email.clone());
                outcome.accepted.push(candidate);
            }
            Err(reason) => outcome.counters.record(reason),
        }
    }

    outcome
}

// ── Report ───────────────────────────────────────────────────────────

/// Structured accounting of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub accepted_count: u64,
    pub rejections: RejectionCounters,
    pub total_skipped: u64,
}

// ── Roster parsing ───────────────────────────────────────────────────

/// Parse an uploaded roster file into candidate rows.
///
/// Performs the structural checks that abort a run before any row-level
/// validation happens:
///
/// 1. The payload must parse as CSV with a header row
///    ([`IngestError::UnparsablePayload`] otherwise — empty payloads,
///    invalid UTF-8, and ragged rows included).
/// 2. Header names are trimmed and lowercased; a collision after
///    normalization is [`IngestError::DuplicateColumns`].
/// 3. `{email, name, age}` must be a subset of the normalized header
///    ([`IngestError::MissingColumns`] listing the absent names). Extra
///    columns are ignored.
///
/// All rows are materialized before returning, so a mid-file parse error
/// aborts the whole run with nothing partially processed.
pub fn parse_roster(bytes: &[u8]) -> Result<Vec<CandidateRow>, IngestError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(IngestError::UnparsablePayload(
            "empty payload".to_string(),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| IngestError::UnparsablePayload(e.to_string()))?;

    // Normalize column names: trim whitespace, lowercase.
    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let mut seen = HashSet::new();
    for name in &columns {
        if !seen.insert(name.as_str()) {
            return Err(IngestError::DuplicateColumns(name.clone()));
        }
    }

    let indices: Vec<Option<usize>> = REQUIRED_COLUMNS
        .iter()
        .map(|required| columns.iter().position(|c| c == required))
        .collect();

    let (Some(email_idx), Some(name_idx), Some(age_idx)) =
        (indices[0], indices[1], indices[2])
    else {
        let missing: BTreeSet<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&indices)
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| (*name).to_string())
            .collect();
        return Err(IngestError::MissingColumns(missing));
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::UnparsablePayload(e.to_string()))?;
        rows.push(CandidateRow {
            email: record.get(email_idx).unwrap_or_default().to_string(),
            name: record.get(name_idx).unwrap_or_default().to_string(),
            age: record.get(age_idx).unwrap_or_default().to_string(),
        });
    }

    Ok(rows)
}

// ── Tests ────────────────────────────────────────────────────────────
