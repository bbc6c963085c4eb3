// handlers/public/auth/signup.rs - POST /signup handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::JsonBody;
use crate::services::validation::Credentials;
use crate::state::AppState;

/// POST /signup - Register a new user and return a token right away
///
/// Expected Input:
/// ```json
/// { "username": "johndoe", "password": "mySecurePass123" }
/// ```
///
/// Expected Output (201):
/// ```json
/// { "status": "User registered successfully", "token": "eyJhbGciOiJIUzI1NiI..." }
/// ```
///
/// Fails with 400 when either field is missing or the username is taken.
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = Credentials::from_payload(&body)?;

    let user_id = state
        .credentials
        .create_user(&credentials.username, &credentials.password)
        .await?;
    let token = state.tokens.issue(user_id)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "User registered successfully",
            "token": token
        })),
    ))
}
