pub mod error;
pub mod game_repo;
pub mod user_repo;
