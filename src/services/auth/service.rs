use std::sync::Arc;

use tracing::{info, warn};

use crate::services::auth::authenticator::RequestAuthenticator;
use crate::services::auth::claims::Claims;
use crate::services::auth::codec::{IssuedToken, TokenCodec};
use crate::services::auth::error::AuthError;
use crate::services::auth::identity::{CredentialVerifier, IdentityError, IdentityResolver};
use crate::services::auth::principal::AuthenticatedPrincipal;
use crate::services::auth::revocation::RevocationRegistry;

/// Orchestrates the token lifecycle for the HTTP layer.
///
/// - TokenCodec signs and verifies tokens
/// - RevocationRegistry remembers logged-out tokens
/// - RequestAuthenticator turns a bearer token into a principal
/// - CredentialVerifier checks passwords at login
#[derive(Clone)]
pub struct AuthService {
    codec: Arc<TokenCodec>,
    revocations: Arc<RevocationRegistry>,
    authenticator: RequestAuthenticator,
    credentials: Arc<dyn CredentialVerifier>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("codec", &self.codec)
            .field("revocations", &self.revocations)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        codec: Arc<TokenCodec>,
        revocations: Arc<RevocationRegistry>,
        identities: Arc<dyn IdentityResolver>,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        let authenticator =
            RequestAuthenticator::new(codec.clone(), revocations.clone(), identities);
        Self {
            codec,
            revocations,
            authenticator,
            credentials,
        }
    }

    pub fn revocations(&self) -> &Arc<RevocationRegistry> {
        &self.revocations
    }

    /// Checks credentials and issues a token carrying the user's roles.
    ///
    /// Unknown users and wrong passwords both come back as `InvalidCredentials`.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let identity = self
            .credentials
            .verify_credentials(username, password)
            .await
            .map_err(|e| match e {
                IdentityError::NotFound => AuthError::InvalidCredentials,
                IdentityError::Unavailable(reason) => AuthError::IdentityUnavailable(reason),
            })?
            .ok_or_else(|| {
                warn!(username = %username, "login rejected");
                AuthError::InvalidCredentials
            })?;

        let issued = self.codec.issue(&identity.username, identity.roles)?;
        info!(username = %identity.username, "login succeeded");
        Ok(issued)
    }

    pub fn issue(&self, subject: &str, roles: Vec<String>) -> Result<IssuedToken, AuthError> {
        self.codec.issue(subject, roles)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.codec.verify(token)
    }

    /// Issues a replacement token. A logged-out token cannot be refreshed back to life.
    pub fn refresh(&self, token: &str) -> Result<IssuedToken, AuthError> {
        self.codec.refresh_with(token, |_| {
            if self.revocations.is_revoked(token) {
                Err(AuthError::Revoked)
            } else {
                Ok(())
            }
        })
    }

    /// Revokes `token` until its natural expiry.
    ///
    /// Returns `false` when it was already revoked.
    pub fn logout(&self, token: &str) -> Result<bool, AuthError> {
        let claims = self.codec.verify(token)?;
        let newly_revoked = self.revocations.revoke(token, claims.expires_at());
        info!(sub = %claims.sub, newly_revoked, "token revoked");
        Ok(newly_revoked)
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedPrincipal, AuthError> {
        self.authenticator.authenticate(token).await
    }
}
