/*
 * Responsibility
 * - /games CRUD on the caller's own shelf (bearer required)
 * - Another user's game id answers 404, same as a missing one
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::games::{GameRequest, GameResponse},
        extractors::PrincipalExtractor,
    },
    error::AppError,
    state::AppState,
};

pub async fn list_games(
    State(state): State<AppState>,
    PrincipalExtractor(principal): PrincipalExtractor,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    let rows = state.games.list(principal.identity.id)?;
    Ok(Json(rows.into_iter().map(GameResponse::from).collect()))
}

pub async fn create_game(
    State(state): State<AppState>,
    PrincipalExtractor(principal): PrincipalExtractor,
    Json(req): Json<GameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), AppError> {
    let fields = req.validate()?;
    let row = state.games.create(principal.identity.id, fields)?;
    tracing::debug!(game_id = %row.id, owner = %principal.subject(), "game added");

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn get_game(
    State(state): State<AppState>,
    PrincipalExtractor(principal): PrincipalExtractor,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameResponse>, AppError> {
    let row = state
        .games
        .get(principal.identity.id, game_id)?
        .ok_or_else(|| AppError::not_found("game"))?;
    Ok(Json(row.into()))
}

pub async fn update_game(
    State(state): State<AppState>,
    PrincipalExtractor(principal): PrincipalExtractor,
    Path(game_id): Path<Uuid>,
    Json(req): Json<GameRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let fields = req.validate()?;
    let row = state
        .games
        .update(principal.identity.id, game_id, fields)?
        .ok_or_else(|| AppError::not_found("game"))?;

    Ok(Json(row.into()))
}

pub async fn delete_game(
    State(state): State<AppState>,
    PrincipalExtractor(principal): PrincipalExtractor,
    Path(game_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.games.delete(principal.identity.id, game_id)? {
        return Err(AppError::not_found("game"));
    }
    tracing::debug!(game_id = %game_id, owner = %principal.subject(), "game deleted");

    Ok(StatusCode::NO_CONTENT)
}
