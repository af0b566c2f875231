// PostgreSQL-backed identity store

use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::{
    models::{NewUser, ProfileUpdate, User},
    store::{already_registered, IdentityStore, StoreError},
};

const USER_COLUMNS: &str =
    "username, password_hash, role, given_name, address, zip_code, created_at, updated_at";

/// User repository for database operations
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password_hash, role, given_name, address, zip_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.role)
        .bind(user.given_name)
        .bind(user.address)
        .bind(user.zip_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Check for unique constraint violation
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return already_registered();
                }
            }
            StoreError::from(e)
        })
    }

    async fn update_profile(
        &self,
        username: &str,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET password_hash = $1,
                given_name = $2,
                address = $3,
                zip_code = $4,
                updated_at = NOW()
            WHERE username = $5
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(update.password_hash)
        .bind(update.given_name)
        .bind(update.address)
        .bind(update.zip_code)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "DELETE FROM users WHERE username = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
