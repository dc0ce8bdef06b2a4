//! Per-request authentication decision, independent of the HTTP framework.
//!
//! HeaderPresent → ExtractToken → Verify → RevocationCheck → ResolveIdentity → Authenticated
//!
//! Each arrow short-circuits on failure: a token that fails verification never reaches the
//! registry or the resolver, and a revoked token never reaches the resolver.

use std::sync::Arc;

use tracing::debug;

use crate::services::auth::codec::TokenCodec;
use crate::services::auth::error::AuthError;
use crate::services::auth::identity::{IdentityError, IdentityResolver};
use crate::services::auth::principal::AuthenticatedPrincipal;
use crate::services::auth::revocation::RevocationRegistry;

pub const BEARER_PREFIX: &str = "Bearer ";

/// Pulls the credential out of an `Authorization` header value.
///
/// Only the exact form `"Bearer " + token` counts. Anything else (other schemes,
/// lowercase `bearer`, no header at all) means "no credential offered", not an error.
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix(BEARER_PREFIX)
}

#[derive(Clone)]
pub struct RequestAuthenticator {
    codec: Arc<TokenCodec>,
    revocations: Arc<RevocationRegistry>,
    identities: Arc<dyn IdentityResolver>,
}

impl std::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("codec", &self.codec)
            .field("revocations", &self.revocations)
            .finish()
    }
}

impl RequestAuthenticator {
    pub fn new(
        codec: Arc<TokenCodec>,
        revocations: Arc<RevocationRegistry>,
        identities: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            codec,
            revocations,
            identities,
        }
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedPrincipal, AuthError> {
        let claims = self.codec.verify(token)?;

        if self.revocations.is_revoked(token) {
            return Err(AuthError::Revoked);
        }

        let identity = self
            .identities
            .lookup(&claims.sub)
            .await
            .map_err(|e| match e {
                IdentityError::NotFound => AuthError::IdentityNotFound,
                IdentityError::Unavailable(reason) => AuthError::IdentityUnavailable(reason),
            })?;

        debug!(sub = %claims.sub, "request authenticated");

        let expires_at = claims.expires_at();
        Ok(AuthenticatedPrincipal {
            identity,
            roles: claims.roles,
            expires_at,
        })
    }
}
