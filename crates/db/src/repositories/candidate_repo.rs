//! Repository for the `candidates` table.
//!
//! This is the storage side of the ingestion pipeline: the existing-key
//! projection that seeds the duplicate index, and the atomic bulk insert
//! that persists an accepted batch.

use std::collections::HashSet;

use roster_core::candidate::NewCandidate;
use roster_core::types::DbId;
use sqlx::PgPool;

use crate::models::candidate::Candidate;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, name, age, created_at";

/// Number of bind parameters per inserted candidate row.
const BINDS_PER_ROW: usize = 3;

/// Maximum rows per INSERT statement, keeping bind-parameter counts well
/// under PostgreSQL's 65535 limit.
const MAX_ROWS_PER_INSERT: usize = 1000;

/// Provides key-projection and bulk-insert operations for candidates.
pub struct CandidateRepo;

impl CandidateRepo {
    /// Fetch the lowercased emails of every stored candidate.
    ///
    /// Used once per ingestion run to seed the duplicate index, so the
    /// comparison against incoming rows is case-insensitive.
    pub async fn existing_emails(pool: &PgPool) -> Result<HashSet<String>, sqlx::Error> {
        let emails: Vec<String> = sqlx::query_scalar("SELECT LOWER(email) FROM candidates")
            .fetch_all(pool)
            .await?;
        Ok(emails.into_iter().collect())
    }

    /// Insert a batch of validated candidates atomically.
    ///
    /// All rows commit or none: chunked multi-row INSERTs run inside one
    /// transaction, so a uniqueness violation (a concurrent run winning
    /// the race on `uq_candidates_email_lower`) rolls back the whole
    /// batch. Returns the number of rows inserted.
    pub async fn bulk_insert(
        pool: &PgPool,
        records: &[NewCandidate],
    ) -> Result<u64, sqlx::Error> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = pool.begin().await?;
        let mut inserted = 0u64;

        for chunk in records.chunks(MAX_ROWS_PER_INSERT) {
            // Build a multi-row INSERT statement.
            let mut query = String::from("INSERT INTO candidates (email, name, age) VALUES ");
            let mut param_idx = 1usize;
            let mut first = true;

            for _ in chunk {
                if !first {
                    query.push_str(", ");
                }
                first = false;
                query.push('(');
                for i in 0..BINDS_PER_ROW {
                    if i > 0 {
                        query.push_str(", ");
                    }
                    query.push_str(&format!("${param_idx}"));
                    param_idx += 1;
                }
                query.push(')');
            }

            let mut q = sqlx::query(&query);
            for record in chunk {
                q = q.bind(&record.email).bind(&record.name).bind(record.age);
            }

            let result = q.execute(&mut *tx).await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Find a candidate by email, case-insensitive.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Candidate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM candidates WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, Candidate>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Total number of stored candidates.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM candidates")
            .fetch_one(pool)
            .await
    }

    /// List the most recently ingested candidates.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Candidate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM candidates ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, Candidate>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Find a candidate by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Candidate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM candidates WHERE id = $1");
        sqlx::query_as::<_, Candidate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
