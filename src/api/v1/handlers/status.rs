/*
 * Responsibility
 * - GET /auth/status: who the caller is, answered for anonymous callers too
 */
use axum::Json;
use serde::Serialize;

use crate::api::v1::extractors::AuthCtxExtractor;

#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

pub async fn auth_status(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        authenticated: ctx.is_authenticated(),
        username: ctx.principal().map(|p| p.subject().to_string()),
    })
}
