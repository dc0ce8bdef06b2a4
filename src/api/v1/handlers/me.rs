/*
 * Responsibility
 * - GET /me: the authenticated caller's identity
 */
use axum::Json;

use crate::api::v1::{dto::auth::UserResponse, extractors::PrincipalExtractor};

pub async fn me(PrincipalExtractor(principal): PrincipalExtractor) -> Json<UserResponse> {
    Json(principal.identity.clone().into())
}
