use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::{AuthUser, JsonBody};
use crate::services::validation;
use crate::state::AppState;

/// POST /insertSampleNotes - Bulk insert
///
/// Expected Input:
/// ```json
/// { "notes": [ { "title": "a", "text": "b", "freeze": "false" } ] }
/// ```
///
/// Either every note is inserted or none is.
pub async fn insert_sample_notes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let drafts = validation::note_batch(&body)?;
    let inserted = state.notes.bulk_create(user.user_id, drafts).await?;

    Ok(Json(json!({
        "status": "success",
        "message": format!("{} notes inserted", inserted)
    })))
}
