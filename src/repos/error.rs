/**
 * Responsibility
 * - Meaning the user store reports upward
 */
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("conflict on {field}")]
    Conflict { field: &'static str },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
