use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::{AuthUser, JsonBody};
use crate::services::validation::FreezeUpdate;
use crate::state::AppState;

/// PUT /freeze - Freeze or unfreeze a note
///
/// Reports `{"status": "not found"}` when nothing changed, which includes
/// setting a note to the state it is already in.
pub async fn freeze_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let update = FreezeUpdate::from_payload(&body)?;
    let changed = state
        .notes
        .set_freeze_by_title(user.user_id, &update.title, update.freeze)
        .await?;

    let status = if changed { "success" } else { "not found" };
    Ok(Json(json!({ "status": status })))
}
