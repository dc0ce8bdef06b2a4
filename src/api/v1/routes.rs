/*
 * Responsibility
 * - URL layout of v1
 * - Every v1 route passes through the access middleware; which ones *require* a
 *   principal is decided by the handler's extractor
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{login, logout, refresh, register},
    games::{create_game, delete_game, get_game, list_games, update_game},
    health::health,
    me::me,
    status::auth_status,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/status", get(auth_status))
        .route("/me", get(me))
        .route("/games", get(list_games).post(create_game))
        .route(
            "/games/{game_id}",
            get(get_game).put(update_game).delete(delete_game),
        )
}
