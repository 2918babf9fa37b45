//! Handlers for the `/candidates` resource — the roster upload endpoint.
//!
//! The upload handler owns the end-to-end ingestion flow: multipart
//! extraction, structural parsing, duplicate-index seeding, the row
//! validation fold, the atomic bulk write, and the final report. Per-row
//! validation failures never fail the request; they are returned as
//! counters in the report.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use roster_core::ingest::{parse_roster, validate_rows, DuplicateIndex, IngestReport};
use roster_db::repositories::CandidateRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field name carrying the roster file.
const FILE_FIELD: &str = "file";

/// POST /api/v1/candidates/upload
///
/// Accept a multipart CSV upload of candidate records, validate every row,
/// persist the accepted records in one atomic batch, and return the
/// ingestion report.
///
/// Structural failures (unparsable payload, duplicate or missing columns,
/// a failed bulk write) abort the whole run with a typed error response
/// and commit nothing.
pub async fn upload_roster(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<IngestReport>>> {
    let bytes = extract_file(multipart).await?;

    // Structural checks run before any storage access: a malformed header
    // aborts without seeding the duplicate index.
    let rows = parse_roster(&bytes)?;

    // Seed the duplicate index from the existing corpus, then fold the
    // rows through the validation engine. The index is owned by this run.
    let existing = CandidateRepo::existing_emails(&state.pool).await?;
    let mut index = DuplicateIndex::seed(existing);
    let outcome = validate_rows(&rows, &mut index);

    // All-or-nothing bulk write. A failure here (e.g. a concurrent run
    // winning the race on the unique email index) commits nothing.
    CandidateRepo::bulk_insert(&state.pool, &outcome.accepted)
        .await
        .map_err(AppError::Persistence)?;

    let report = outcome.report();
    tracing::info!(
        user_id = user.user_id,
        rows = outcome.row_count,
        accepted = report.accepted_count,
        skipped = report.total_skipped,
        "Roster upload processed"
    );

    Ok(Json(DataResponse { data: report }))
}

/// Pull the uploaded file's bytes out of the multipart body.
async fn extract_file(mut multipart: Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some(FILE_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()));
        }
    }

    Err(AppError::BadRequest(format!(
        "No file attached under multipart field '{FILE_FIELD}'"
    )))
}
