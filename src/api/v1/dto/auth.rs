/*
 * Responsibility
 * - Request/response DTOs for /auth and /me
 * - Registration field rules live in validate()
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::{Identity, IssuedToken};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;
const PASSWORD_MIN: usize = 8;
// bcrypt only reads the first 72 bytes
const PASSWORD_MAX_BYTES: usize = 72;
const EMAIL_MAX: usize = 254;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

fn valid_username(username: &str) -> bool {
    (USERNAME_MIN..=USERNAME_MAX).contains(&username.chars().count())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn valid_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX || email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

fn valid_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN
        && password.len() <= PASSWORD_MAX_BYTES
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !valid_username(&self.username) {
            return Err(AppError::bad_request(
                "INVALID_USERNAME",
                "username must be 3-32 characters of letters, digits or '_'",
            ));
        }
        if !valid_email(&self.email) {
            return Err(AppError::bad_request("INVALID_EMAIL", "email is not valid"));
        }
        if !valid_password(&self.password) {
            return Err(AppError::bad_request(
                "INVALID_PASSWORD",
                "password must be at least 8 characters and at most 72 bytes, with a letter and a digit",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(AppError::bad_request(
                "INVALID_REQUEST",
                "username and password are required",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

impl TokenResponse {
    /// `expires_in` counts from the moment of issuance, not from the configured TTL.
    pub fn bearer(issued: IssuedToken) -> Self {
        Self {
            expires_in: issued.expires_in(),
            access_token: issued.token,
            token_type: "Bearer".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            email: identity.email,
            roles: identity.roles,
        }
    }
}
