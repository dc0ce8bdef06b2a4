/*
 * Responsibility
 * - /auth/register, /auth/login (public)
 * - /auth/refresh, /auth/logout (bearer; the access middleware already verified the token)
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
};

use crate::{
    api::v1::{
        dto::auth::{LoginRequest, RegisterRequest, TokenResponse, UserResponse},
        extractors::PrincipalExtractor,
    },
    error::AppError,
    repos::user_repo::DEFAULT_ROLE,
    services::auth::extract_bearer,
    state::AppState,
};

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    extract_bearer(header).ok_or(AppError::Unauthorized)
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate()?;

    let identity = state
        .users
        .create(
            &req.username,
            &req.email,
            &req.password,
            vec![DEFAULT_ROLE.to_string()],
        )
        .await?;
    tracing::info!(username = %identity.username, "user registered");

    Ok((StatusCode::CREATED, Json(identity.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()?;

    let issued = state.auth.login(&req.username, &req.password).await?;

    Ok(Json(TokenResponse::bearer(issued)))
}

pub async fn refresh(
    State(state): State<AppState>,
    PrincipalExtractor(principal): PrincipalExtractor,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let token = bearer_token(&headers)?;
    let issued = state.auth.refresh(token)?;
    tracing::info!(sub = %principal.subject(), "token refreshed");

    Ok(Json(TokenResponse::bearer(issued)))
}

pub async fn logout(
    State(state): State<AppState>,
    PrincipalExtractor(_principal): PrincipalExtractor,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers)?;
    state.auth.logout(token)?;

    Ok(StatusCode::NO_CONTENT)
}
