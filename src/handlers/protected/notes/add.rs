use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::{AuthUser, JsonBody};
use crate::services::validation::NoteDraft;
use crate::state::AppState;

/// POST /addNote - Create a note owned by the caller
///
/// Expected Input:
/// ```json
/// { "title": "Shop", "text": "milk", "freeze": "false" }
/// ```
pub async fn add_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let draft = NoteDraft::from_payload(&body)?;
    state.notes.create(user.user_id, draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Note added"
        })),
    ))
}
