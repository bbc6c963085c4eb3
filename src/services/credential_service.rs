use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::database::models::NewUser;
use crate::database::{DatabaseError, UserRepository};
use crate::services::ServiceError;

/// Registers users and checks their passwords.
///
/// bcrypt is deliberately slow, so hashing and verification run on the
/// blocking thread pool instead of a runtime worker.
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    bcrypt_cost: u32,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserRepository>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    /// Create a user, failing with `Conflict` when the username is taken.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<Uuid, ServiceError> {
        if self.users.find_by_username(username).await?.is_some() {
            debug!("Signup rejected, username '{}' already exists", username);
            return Err(Self::user_exists());
        }

        let password = password.to_string();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| ServiceError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let new_user = NewUser {
            username: username.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        // A concurrent signup can still win the race after the existence check
        match self.users.insert_user(new_user).await {
            Ok(user) => {
                info!("Registered user '{}' ({})", user.username, user.id);
                Ok(user.id)
            }
            Err(DatabaseError::UniqueViolation(_)) => Err(Self::user_exists()),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a username/password pair to a user id.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Uuid, ServiceError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            debug!("Login rejected, unknown username '{}'", username);
            return Err(ServiceError::Unauthorized);
        };

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| ServiceError::Internal(format!("verification task failed: {}", e)))?;

        if !matches {
            debug!("Login rejected, wrong password for '{}'", username);
            return Err(ServiceError::Unauthorized);
        }

        Ok(user.id)
    }

    fn user_exists() -> ServiceError {
        ServiceError::Conflict("User already exists".to_string())
    }
}
