use std::sync::Arc;

use crate::auth::{TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::Storage;
use crate::services::{CredentialService, NoteService};

/// Shared handler state. Cloning is cheap; everything inside is reference
/// counted or immutable.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub credentials: CredentialService,
    pub notes: NoteService,
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new<S>(config: AppConfig, storage: Arc<S>) -> Result<Self, TokenError>
    where
        S: Storage + 'static,
    {
        let tokens = TokenService::new(
            config.security.jwt_secret.as_bytes(),
            config.security.jwt_expiry_secs,
        )?;
        let credentials = CredentialService::new(storage.clone(), config.security.bcrypt_cost);
        let notes = NoteService::new(storage.clone());

        Ok(Self {
            config: Arc::new(config),
            tokens,
            credentials,
            notes,
            storage,
        })
    }
}
