use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::TokenError;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, bound into request extensions by `jwt_auth_middleware`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Gate in front of every protected route.
///
/// Extracts the bearer token, verifies it and binds the caller's id into the
/// request before the handler runs. Any failure answers 401 immediately and
/// the handler is never invoked.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(|e| reject(&request, e))?;

    let user_id = state.tokens.verify(token).map_err(|e| reject(&request, e))?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

fn reject(request: &Request, err: TokenError) -> ApiError {
    tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), err);
    err.into()
}

/// Extract the token from an `Authorization: Bearer <token>` header.
/// A missing header and any other scheme both count as a missing token.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    let auth_str = headers
        .get(AUTHORIZATION)
        .ok_or(TokenError::Missing)?
        .to_str()
        .map_err(|_| TokenError::Missing)?;

    let mut parts = auth_str.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(TokenError::Missing),
    }
}
