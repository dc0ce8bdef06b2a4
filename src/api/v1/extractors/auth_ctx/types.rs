/*
 * Responsibility
 * - The "who is calling" type handlers see
 * - The access middleware writes it into request extensions; handlers only read it
 */
use std::sync::Arc;

use crate::services::auth::AuthenticatedPrincipal;

/// Caller of the current request.
///
/// A request without a bearer token is `Anonymous`; a request with a rejected token never
/// reaches a handler, so there is no third state.
#[derive(Debug, Clone, Default)]
pub enum AuthCtx {
    #[default]
    Anonymous,
    Authenticated(Arc<AuthenticatedPrincipal>),
}

impl AuthCtx {
    pub fn principal(&self) -> Option<&AuthenticatedPrincipal> {
        match self {
            AuthCtx::Anonymous => None,
            AuthCtx::Authenticated(principal) => Some(principal),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthCtx::Authenticated(_))
    }
}
