/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::repos::error::RepoError;
use crate::repos::user_repo::UserRepo;
use crate::services::auth::AuthService;
use crate::services::auth::clock::Clock;
use crate::services::auth::codec::TokenCodec;
use crate::services::auth::error::AuthError;
use crate::services::auth::revocation::RevocationRegistry;
use crate::services::auth::signing_key::{SigningKey, SigningKeyError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("signing key: {0}")]
    SigningKey(#[from] SigningKeyError),

    #[error("token codec: {0}")]
    Token(#[from] AuthError),

    #[error("user store: {0}")]
    UserStore(#[from] RepoError),
}

pub fn build_auth_service(
    config: &Config,
    users: Arc<UserRepo>,
    clock: Arc<dyn Clock>,
) -> Result<Arc<AuthService>, StartupError> {
    let key = SigningKey::from_secret(config.signing_secret.as_bytes())?;
    let codec = Arc::new(TokenCodec::new(key, config.token_ttl_seconds, clock.clone())?);
    let revocations = Arc::new(RevocationRegistry::new(clock));

    let auth = AuthService::new(codec, revocations, users.clone(), users);
    Ok(Arc::new(auth))
}
