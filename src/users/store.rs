// Identity store abstraction and the in-memory implementation

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::users::models::{NewUser, ProfileUpdate, User};

/// Identity store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => ApiError::Conflict { message },
            StoreError::Database(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Lookup and mutation of user identities keyed by username
///
/// Single-key operations only; callers never rely on ordering across requests.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Fails with `StoreError::Conflict` when the username is taken
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Returns `None` when there is no such user
    async fn update_profile(
        &self,
        username: &str,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError>;

    /// Returns the removed user, or `None` when it was already gone
    async fn delete(&self, username: &str) -> Result<Option<User>, StoreError>;
}

/// Process-local identity store
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Message for a taken username; the name itself is not echoed back
pub const ALREADY_REGISTERED_MESSAGE: &str = "User has already been registered";

pub(crate) fn already_registered() -> StoreError {
    StoreError::Conflict(ALREADY_REGISTERED_MESSAGE.to_string())
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(already_registered());
        }

        let now = Utc::now();
        let stored = User {
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            given_name: user.given_name,
            address: user.address,
            zip_code: user.zip_code,
            created_at: now,
            updated_at: now,
        };
        users.insert(stored.username.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_profile(
        &self,
        username: &str,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(username) else {
            return Ok(None);
        };

        user.password_hash = update.password_hash;
        user.given_name = update.given_name;
        user.address = update.address;
        user.zip_code = update.zip_code;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.write().await.remove(username))
    }
}
