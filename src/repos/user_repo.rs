/*
 * Responsibility
 * - In-process user store (username / email uniqueness, role list)
 * - Answers identity lookups for the request authenticator
 * - Checks login credentials against a bcrypt hash
 */
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::services::auth::identity::{
    CredentialVerifier, Identity, IdentityError, IdentityResolver,
};

pub const DEFAULT_ROLE: &str = "USER";

// Hashed once at startup; unknown usernames are verified against it.
const DUMMY_PASSWORD: &str = "not-a-real-account-password";

#[derive(Clone)]
struct UserRow {
    identity: Identity,
    // bcrypt string ($2b$<cost>$<salt+hash>)
    password_hash: String,
}

#[derive(Default)]
struct Inner {
    // keyed by username (the token subject)
    by_username: HashMap<String, UserRow>,
    // lowercase emails in use
    emails: HashSet<String>,
}

pub struct UserRepo {
    inner: RwLock<Inner>,
    hash_cost: u32,
    dummy_hash: String,
}

impl std::fmt::Debug for UserRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRepo")
            .field("users", &self.len().unwrap_or_default())
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

/// bcrypt is deliberately slow; keep it off the async worker threads.
async fn hash_password(password: String, cost: u32) -> Result<String, RepoError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| RepoError::Unavailable(e.to_string()))?
        .map_err(|e| RepoError::Unavailable(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, RepoError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| RepoError::Unavailable(e.to_string()))?
        .map_err(|e| RepoError::Unavailable(e.to_string()))
}

impl UserRepo {
    pub fn new(hash_cost: u32) -> Result<Self, RepoError> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, hash_cost)
            .map_err(|e| RepoError::Unavailable(e.to_string()))?;
        Ok(Self {
            inner: RwLock::new(Inner::default()),
            hash_cost,
            dummy_hash,
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, RepoError> {
        self.inner
            .read()
            .map_err(|_| RepoError::Unavailable("user store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, RepoError> {
        self.inner
            .write()
            .map_err(|_| RepoError::Unavailable("user store lock poisoned".to_string()))
    }

    fn check_unique(inner: &Inner, username: &str, email_key: &str) -> Result<(), RepoError> {
        if inner.by_username.contains_key(username) {
            return Err(RepoError::Conflict { field: "username" });
        }
        if inner.emails.contains(email_key) {
            return Err(RepoError::Conflict { field: "email" });
        }
        Ok(())
    }

    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
        roles: Vec<String>,
    ) -> Result<Identity, RepoError> {
        let email_key = email.to_ascii_lowercase();

        // Cheap rejection before paying for the hash; re-checked under the write lock.
        Self::check_unique(&*self.read()?, username, &email_key)?;

        let password_hash = hash_password(password.to_string(), self.hash_cost).await?;

        let mut inner = self.write()?;
        Self::check_unique(&inner, username, &email_key)?;

        let identity = Identity {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            roles,
        };
        inner.emails.insert(email_key);
        inner.by_username.insert(
            username.to_string(),
            UserRow {
                identity: identity.clone(),
                password_hash,
            },
        );

        Ok(identity)
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<Identity>, RepoError> {
        let inner = self.read()?;
        Ok(inner.by_username.get(username).map(|row| row.identity.clone()))
    }

    /// Removes the account. Tokens already issued for it stop authenticating.
    pub fn delete(&self, username: &str) -> Result<bool, RepoError> {
        let mut inner = self.write()?;
        match inner.by_username.remove(username) {
            Some(row) => {
                inner.emails.remove(&row.identity.email.to_ascii_lowercase());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn len(&self) -> Result<usize, RepoError> {
        Ok(self.read()?.by_username.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepoError> {
        Ok(self.len()? == 0)
    }
}

impl From<RepoError> for IdentityError {
    fn from(e: RepoError) -> Self {
        IdentityError::Unavailable(e.to_string())
    }
}

#[async_trait]
impl IdentityResolver for UserRepo {
    async fn lookup(&self, subject: &str) -> Result<Identity, IdentityError> {
        self.find_by_username(subject)?
            .ok_or(IdentityError::NotFound)
    }
}

#[async_trait]
impl CredentialVerifier for UserRepo {
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        let row = self.read()?.by_username.get(username).cloned();

        match row {
            Some(row) => {
                let ok = verify_password(password.to_string(), row.password_hash).await?;
                Ok(ok.then_some(row.identity))
            }
            None => {
                // Same bcrypt work as a known user, so response time does not reveal
                // which usernames exist.
                verify_password(password.to_string(), self.dummy_hash.clone()).await?;
                Ok(None)
            }
        }
    }
}
