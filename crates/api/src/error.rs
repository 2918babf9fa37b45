use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use roster_core::error::CoreError;
use roster_core::ingest::IngestError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`IngestError`] for structural
/// ingestion failures, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `roster_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A structural ingestion failure; the whole run was aborted.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The final bulk write failed; nothing was committed.
    #[error("Bulk persistence failed")]
    Persistence(#[source] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // MissingColumns carries structured payload the other variants lack.
        if let AppError::Ingest(IngestError::MissingColumns(ref names)) = self {
            let body = json!({
                "error": self.to_string(),
                "code": "MISSING_COLUMNS",
                "missing": names,
            });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Structural ingestion failures ---
            AppError::Ingest(err) => match err {
                IngestError::UnparsablePayload(detail) => {
                    tracing::error!(detail = %detail, "Failed to parse uploaded roster");
                    (
                        StatusCode::BAD_REQUEST,
                        "UNPARSABLE_PAYLOAD",
                        err.to_string(),
                    )
                }
                IngestError::DuplicateColumns(_) => (
                    StatusCode::BAD_REQUEST,
                    "DUPLICATE_COLUMNS",
                    err.to_string(),
                ),
                // Normally handled above with the structured payload.
                IngestError::MissingColumns(_) => (
                    StatusCode::BAD_REQUEST,
                    "MISSING_COLUMNS",
                    err.to_string(),
                ),
            },

            // --- Bulk write failures ---
            AppError::Persistence(err) => classify_persistence_error(err),

            // --- Other database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a failed bulk write.
///
/// A unique-constraint violation means a concurrent run won the race on a
/// key that passed this run's in-memory checks — a conflict, not a server
/// fault. Everything else is a 500. Either way nothing was committed.
fn classify_persistence_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    let status = match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!(error = %err, "Bulk persistence failed; no records were committed");
    (
        status,
        "PERSISTENCE_FAILURE",
        "Bulk persistence failed; no records were committed".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
