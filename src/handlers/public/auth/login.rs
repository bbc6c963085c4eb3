// handlers/public/auth/login.rs - POST /login handler

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::JsonBody;
use crate::services::validation::Credentials;
use crate::state::AppState;

/// POST /login - Exchange username and password for a token
///
/// Expected Output (200):
/// ```json
/// { "status": "success", "token": "eyJhbGciOiJIUzI1NiI..." }
/// ```
///
/// 400 when a field is missing, 401 for an unknown user or wrong password.
/// Both credential failures share one message.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = Credentials::from_payload(&body)?;

    let user_id = state
        .credentials
        .verify_credentials(&credentials.username, &credentials.password)
        .await?;
    let token = state.tokens.issue(user_id)?;

    tracing::info!("User {} logged in", user_id);

    Ok(Json(json!({
        "status": "success",
        "token": token
    })))
}
