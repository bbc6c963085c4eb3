pub mod auth;
pub mod json;

pub use auth::{extract_bearer_token, jwt_auth_middleware, AuthUser};
pub use json::JsonBody;
