pub mod auth;
pub mod games;
