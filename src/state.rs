/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Cheap to clone (everything inside is behind an Arc)
 */
use std::sync::Arc;

use crate::repos::game_repo::GameRepo;
use crate::repos::user_repo::UserRepo;
use crate::services::auth::AuthService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserRepo>,
    pub games: Arc<GameRepo>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, users: Arc<UserRepo>, games: Arc<GameRepo>) -> Self {
        Self { auth, users, games }
    }
}
