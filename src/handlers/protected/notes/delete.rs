use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::{AuthUser, JsonBody};
use crate::services::validation::TitleQuery;
use crate::state::AppState;

/// DELETE /deleteNote - Remove a note by title
///
/// A missing note is still a 200, with `{"status": "not found"}`.
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let query = TitleQuery::from_payload(&body)?;
    let deleted = state.notes.delete_by_title(user.user_id, &query.title).await?;

    let status = if deleted { "success" } else { "not found" };
    Ok(Json(json!({ "status": status })))
}
