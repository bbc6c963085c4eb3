use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::{AuthUser, JsonBody};
use crate::services::validation::TextUpdate;
use crate::state::AppState;

/// PUT /updateNote - Replace the text of an unfrozen note
///
/// 404 when there is no such note, 403 when it is frozen.
pub async fn update_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let update = TextUpdate::from_payload(&body)?;
    state
        .notes
        .update_text_by_title(user.user_id, &update.title, &update.text)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Note updated"
    })))
}
