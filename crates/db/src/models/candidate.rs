//! Candidate entity model.
//!
//! The insert DTO is [`roster_core::candidate::NewCandidate`] — records
//! only reach the database after passing the validation engine, so the
//! core type is the write-side contract.

use roster_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full candidate row from the `candidates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Candidate {
    pub id: DbId,
    /// Stored lowercased; uniqueness is enforced on `LOWER(email)`.
    pub email: String,
    pub name: String,
    pub age: i32,
    pub created_at: Timestamp,
}
