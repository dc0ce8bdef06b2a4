use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::AuthenticatedPrincipal;
use crate::state::AppState;

use super::AuthCtx;

/// Caller context for routes that serve anonymous callers too.
/// Nothing in extensions means the middleware saw no bearer token.
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(AuthCtxExtractor(
            parts.extensions.get::<AuthCtx>().cloned().unwrap_or_default(),
        ))
    }
}

/// Authenticated caller, or 401.
pub struct PrincipalExtractor(pub Arc<AuthenticatedPrincipal>);

impl FromRequestParts<AppState> for PrincipalExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthCtx>() {
            Some(AuthCtx::Authenticated(principal)) => Ok(PrincipalExtractor(principal.clone())),
            _ => Err(AppError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::game_repo::GameRepo;
    use crate::repos::user_repo::UserRepo;
    use crate::services::auth::{
        AuthService, Identity, ManualClock, RevocationRegistry, SigningKey, TokenCodec,
    };
    use axum::http::Request;
    use chrono::DateTime;
    use uuid::Uuid;

    fn state() -> AppState {
        let clock = Arc::new(ManualClock::at_epoch_2024());
        let key = SigningKey::from_secret(b"extractor-test-secret-0123456789abcdef").unwrap();
        let codec = Arc::new(TokenCodec::new(key, 60, clock.clone()).unwrap());
        let revocations = Arc::new(RevocationRegistry::new(clock));
        let users = Arc::new(UserRepo::new(4).unwrap());
        let auth = AuthService::new(codec, revocations, users.clone(), users.clone());
        AppState::new(Arc::new(auth), users, Arc::new(GameRepo::new()))
    }

    fn principal() -> Arc<AuthenticatedPrincipal> {
        Arc::new(AuthenticatedPrincipal {
            identity: Identity {
                id: Uuid::nil(),
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                roles: vec!["USER".to_string()],
            },
            roles: vec!["USER".to_string()],
            expires_at: DateTime::from_timestamp(1_704_070_800, 0).unwrap(),
        })
    }

    fn parts(ctx: Option<AuthCtx>) -> Parts {
        let mut req = Request::builder().uri("/").body(()).unwrap();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req.into_parts().0
    }

    #[tokio::test]
    async fn test_missing_ctx_is_anonymous() {
        let state = state();
        let AuthCtxExtractor(ctx) = AuthCtxExtractor::from_request_parts(&mut parts(None), &state)
            .await
            .unwrap();
        assert!(!ctx.is_authenticated());
        assert!(ctx.principal().is_none());
    }

    #[tokio::test]
    async fn test_principal_extractor() {
        let state = state();

        let err = PrincipalExtractor::from_request_parts(&mut parts(None), &state)
            .await
            .err();
        assert!(matches!(err, Some(AppError::Unauthorized)));

        let err = PrincipalExtractor::from_request_parts(
            &mut parts(Some(AuthCtx::Anonymous)),
            &state,
        )
        .await
        .err();
        assert!(matches!(err, Some(AppError::Unauthorized)));

        let PrincipalExtractor(found) = PrincipalExtractor::from_request_parts(
            &mut parts(Some(AuthCtx::Authenticated(principal()))),
            &state,
        )
        .await
        .unwrap();
        assert_eq!(found.subject(), "alice");
        assert_eq!(found.roles, vec!["USER".to_string()]);
    }
}
