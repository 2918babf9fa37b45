//! Shared type aliases used across the workspace.

/// Primary-key type for all database entities.
pub type DbId = i64;

/// Timestamp type for all `created_at` / `updated_at` style columns.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
