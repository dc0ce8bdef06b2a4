//! Bearer token verification -> `AuthCtx` in request extensions.
//!
//! - No `Authorization: Bearer ...` header: forward untouched; handlers see `AuthCtx::Anonymous`
//! - Token present but rejected (malformed, bad signature, expired, revoked, unknown subject):
//!   401 here, the handler never runs
//! - Token accepted: `AuthCtx::Authenticated(principal)` is inserted, once per request

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthError, extract_bearer};
use crate::state::AppState;

/// Apply the access middleware to every route of `router`.
///
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 from_fn cannot take a State extractor, so pass it via from_fn_with_state
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Already authenticated upstream: keep that principal.
    if matches!(
        req.extensions().get::<AuthCtx>(),
        Some(AuthCtx::Authenticated(_))
    ) {
        return Ok(next.run(req).await);
    }

    let token = {
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        extract_bearer(header).map(str::to_owned)
    };

    let Some(token) = token else {
        return Ok(next.run(req).await);
    };

    let principal = match state.auth.authenticate(&token).await {
        Ok(principal) => principal,
        Err(err) => {
            match &err {
                AuthError::IdentityUnavailable(reason) => {
                    tracing::error!(reason = %reason, "identity lookup failed");
                }
                e if e.is_suspicious() => {
                    tracing::warn!(
                        kind = e.kind(),
                        method = %req.method(),
                        path = %req.uri().path(),
                        "access token rejected"
                    );
                }
                e => tracing::debug!(kind = e.kind(), "access token rejected"),
            }
            return Err(err.into());
        }
    };

    req.extensions_mut()
        .insert(AuthCtx::Authenticated(Arc::new(principal)));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::{body::to_bytes, http::StatusCode, routing::get};
    use chrono::DateTime;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::repos::game_repo::GameRepo;
    use crate::repos::user_repo::UserRepo;
    use crate::services::auth::{
        AuthService, AuthenticatedPrincipal, Identity, IdentityError, IdentityResolver,
        ManualClock, RevocationRegistry, SigningKey, TokenCodec,
    };

    #[derive(Default)]
    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityResolver for CountingResolver {
        async fn lookup(&self, subject: &str) -> Result<Identity, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(identity(subject))
        }
    }

    fn identity(username: &str) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            roles: vec!["USER".to_string()],
        }
    }

    fn state(resolver: Arc<CountingResolver>) -> AppState {
        let clock = Arc::new(ManualClock::at_epoch_2024());
        let key = SigningKey::from_secret(b"access-test-secret-0123456789abcdef").unwrap();
        let codec = Arc::new(TokenCodec::new(key, 3600, clock.clone()).unwrap());
        let revocations = Arc::new(RevocationRegistry::new(clock));
        let users = Arc::new(UserRepo::new(4).unwrap());
        let auth = AuthService::new(codec, revocations, resolver, users.clone());
        AppState::new(Arc::new(auth), users, Arc::new(GameRepo::new()))
    }

    /// `/who` answers the caller's username (empty for anonymous) and counts its runs.
    fn who_routes(hits: Arc<AtomicUsize>) -> Router<AppState> {
        Router::new().route(
            "/who",
            get(move |AuthCtxExtractor(ctx): AuthCtxExtractor| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    ctx.principal()
                        .map(|p| p.subject().to_string())
                        .unwrap_or_default()
                }
            }),
        )
    }

    fn get_who(bearer: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri("/who");
        if let Some(token) = bearer {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req.body(Body::empty()).unwrap()
    }

    async fn body_text(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_upstream_principal_is_kept_without_lookup() {
        let resolver = Arc::new(CountingResolver::default());
        let state = state(resolver.clone());
        let hits = Arc::new(AtomicUsize::new(0));

        let upstream = Arc::new(AuthenticatedPrincipal {
            identity: identity("carol"),
            roles: vec!["ADMIN".to_string()],
            expires_at: DateTime::from_timestamp(1_704_070_800, 0).unwrap(),
        });
        let router = apply(who_routes(hits.clone()), state.clone())
            .layer(middleware::from_fn(
                move |mut req: Request<Body>, next: Next| {
                    let principal = upstream.clone();
                    async move {
                        req.extensions_mut()
                            .insert(AuthCtx::Authenticated(principal));
                        next.run(req).await
                    }
                },
            ))
            .with_state(state);

        // the bearer is garbage; it must not even be looked at
        let res = router.oneshot(get_who(Some("not-a-token"))).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "carol");
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_revoked_bearer_stops_before_resolver_and_handler() {
        let resolver = Arc::new(CountingResolver::default());
        let state = state(resolver.clone());
        let hits = Arc::new(AtomicUsize::new(0));
        let router = apply(who_routes(hits.clone()), state.clone()).with_state(state.clone());

        let live = state.auth.issue("alice", Vec::new()).unwrap();
        let res = router
            .clone()
            .oneshot(get_who(Some(live.as_str())))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "alice");
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let revoked = state.auth.issue("alice", Vec::new()).unwrap();
        assert!(state.auth.logout(revoked.as_str()).unwrap());
        let res = router
            .clone()
            .oneshot(get_who(Some(revoked.as_str())))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_bearer_reaches_handler_anonymous() {
        let resolver = Arc::new(CountingResolver::default());
        let state = state(resolver.clone());
        let hits = Arc::new(AtomicUsize::new(0));
        let router = apply(who_routes(hits.clone()), state.clone()).with_state(state);

        let res = router.oneshot(get_who(None)).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "");
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
