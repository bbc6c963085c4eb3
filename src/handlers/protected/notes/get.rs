use axum::{extract::State, response::IntoResponse, Extension, Json};

use crate::error::ApiError;
use crate::middleware::{AuthUser, JsonBody};
use crate::services::validation::TitleQuery;
use crate::state::AppState;

/// GET /getNote - Fetch one note by title
///
/// The body is `{"title": "..."}` and nothing else. Responds with the note
/// itself, not wrapped in a status envelope.
pub async fn get_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let query = TitleQuery::strict_from_payload(&body)?;
    let note = state.notes.get_by_title(user.user_id, &query.title).await?;
    Ok(Json(note))
}
