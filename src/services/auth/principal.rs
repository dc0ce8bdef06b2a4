use chrono::{DateTime, Utc};

use crate::services::auth::identity::Identity;

/// The caller behind one request, after token verification and identity lookup.
///
/// Request-scoped: built by the access middleware, stored in that request's extensions
/// and dropped with it.
///
/// - `roles` are the role claims of the verified token
/// - `expires_at` is the token's own expiry (handy for clients deciding when to refresh)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub identity: Identity,
    pub roles: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl AuthenticatedPrincipal {
    pub fn subject(&self) -> &str {
        &self.identity.username
    }
}
