use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Full identity record behind a token subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity not found")]
    NotFound,

    #[error("identity store unavailable: {0}")]
    Unavailable(String),
}

/// Maps a verified token subject to an identity.
///
/// Implemented by the user store. A token can be cryptographically valid and still point
/// at an account that no longer exists; implementations report that as `NotFound`.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn lookup(&self, subject: &str) -> Result<Identity, IdentityError>;
}

/// Checks a username/password pair at login time.
///
/// - `Ok(Some(_))`: credentials match
/// - `Ok(None)`: unknown user or wrong password (callers must not tell them apart)
/// - `Err(_)`: store failure
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Identity>, IdentityError>;
}
