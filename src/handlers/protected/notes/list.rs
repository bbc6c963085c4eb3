use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
}

/// GET /notes?search=term - List the caller's notes
///
/// Output: `{"status": "success", "data": [note, ...]}`
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state
        .notes
        .list(user.user_id, params.search.as_deref())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": notes
    })))
}
