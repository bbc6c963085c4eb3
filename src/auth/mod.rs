pub mod password;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by every identity token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user_id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is missing!")]
    Missing,

    #[error("Token has expired!")]
    Expired,

    #[error("Invalid token!")]
    Invalid,

    #[error("JWT signing secret is empty")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    Generation(String),
}

/// Mints and verifies HS256 identity tokens.
///
/// Tokens are stateless: nothing is stored server-side, so a token stays
/// valid until `exp` passes.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime_secs", &self.lifetime.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Longest accepted token lifetime, ten years.
    pub const MAX_LIFETIME_SECS: u64 = 10 * 365 * 24 * 60 * 60;

    pub fn new(secret: &[u8], lifetime_secs: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }
        if lifetime_secs == 0 || lifetime_secs > Self::MAX_LIFETIME_SECS {
            return Err(TokenError::Generation(format!(
                "token lifetime {}s is outside 1..={}",
                lifetime_secs,
                Self::MAX_LIFETIME_SECS
            )));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            // Bounded above, so the cast cannot wrap
            lifetime: Duration::seconds(lifetime_secs as i64),
        })
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        let exp = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| TokenError::Generation("token expiry out of range".to_string()))?;
        let claims = Claims {
            user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Self::ALGORITHM), &claims, &self.encoding)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Checks the signature and shape first, then compares `exp` against `now`.
    /// A token is expired from the second `exp` names onwards.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Missing);
        }

        let token_data = decode::<Claims>(token, &self.decoding, &self.validation())
            .map_err(|e| {
                tracing::debug!("Rejected token: {}", e);
                TokenError::Invalid
            })?;

        let claims = token_data.claims;
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims.user_id)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Self::ALGORITHM);
        // Expiry is judged against the caller's clock in verify_at
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn service() -> TokenService {
        TokenService::new(b"unit-test-secret", 3600).unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn issued_token_verifies_to_same_user() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id).unwrap();
        assert_eq!(tokens.verify(&token), Ok(user_id));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let token = tokens.issue_at(user_id, t0()).unwrap();

        assert_eq!(tokens.verify_at(&token, t0()), Ok(user_id));
        assert_eq!(tokens.verify_at(&token, t0() + Duration::seconds(3599)), Ok(user_id));
        assert_eq!(
            tokens.verify_at(&token, t0() + Duration::seconds(3600)),
            Err(TokenError::Expired)
        );
        assert_eq!(
            tokens.verify_at(&token, t0() + Duration::days(2)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn empty_token_is_missing() {
        assert_eq!(service().verify(""), Err(TokenError::Missing));
        assert_eq!(service().verify("   "), Err(TokenError::Missing));
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert_eq!(service().verify("not.a.jwt"), Err(TokenError::Invalid));
        assert_eq!(service().verify("abc"), Err(TokenError::Invalid));
    }

    #[test]
    fn token_from_other_secret_is_invalid() {
        let other = TokenService::new(b"another-secret", 3600).unwrap();
        let token = other.issue(Uuid::new_v4()).unwrap();
        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn wrong_algorithm_is_invalid() {
        let claims = Claims {
            user_id: Uuid::new_v4(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();
        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn token_without_exp_is_invalid() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({ "user_id": Uuid::new_v4() }),
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();
        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn token_with_non_uuid_subject_is_invalid() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({ "user_id": "64dfdsa76a89", "exp": Utc::now().timestamp() + 600 }),
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();
        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(TokenService::new(b"", 3600), Err(TokenError::InvalidSecret)));
    }

    #[test]
    fn oversized_lifetime_is_rejected() {
        assert!(matches!(
            TokenService::new(b"s", 10_000_000_000_000),
            Err(TokenError::Generation(_))
        ));
        assert!(matches!(TokenService::new(b"s", 0), Err(TokenError::Generation(_))));
        assert!(TokenService::new(b"s", TokenService::MAX_LIFETIME_SECS).is_ok());
    }

    #[test]
    fn expiry_past_the_calendar_is_an_error() {
        let tokens = TokenService::new(b"s", TokenService::MAX_LIFETIME_SECS).unwrap();
        let result = tokens.issue_at(Uuid::new_v4(), DateTime::<Utc>::MAX_UTC);
        assert!(matches!(result, Err(TokenError::Generation(_))));

        // The longest lifetime still issues from today
        assert!(tokens.issue(Uuid::new_v4()).is_ok());
    }
}
