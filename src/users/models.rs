// User account models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

use crate::auth::models::Role;
use crate::validation::{validate_not_blank, validate_password_strength, validate_zip_code};

/// User database model
///
/// `username` is the primary key and the token subject.
#[derive(Clone, FromRow)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub given_name: String,
    pub address: String,
    pub zip_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("given_name", &self.given_name)
            .finish_non_exhaustive()
    }
}

/// Values for a user about to be stored
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub given_name: String,
    pub address: String,
    pub zip_code: String,
}

/// Replacement profile and credential for an existing user
#[derive(Clone)]
pub struct ProfileUpdate {
    pub password_hash: String,
    pub given_name: String,
    pub address: String,
    pub zip_code: String,
}

/// User response model (excludes password_hash and role)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub username: String,
    pub given_name: String,
    pub address: String,
    pub zip_code: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            given_name: user.given_name,
            address: user.address,
            zip_code: user.zip_code,
        }
    }
}

/// Registration request DTO
#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 1, max = 20, message = "Username must be between 1 and 20 characters"),
        custom = "validate_not_blank"
    )]
    pub username: String,
    #[validate(custom = "validate_password_strength")]
    pub password: String,
    #[validate(
        length(min = 1, max = 50, message = "Given name must be between 1 and 50 characters"),
        custom = "validate_not_blank"
    )]
    pub given_name: String,
    #[validate(
        length(min = 1, max = 150, message = "Address must be between 1 and 150 characters"),
        custom = "validate_not_blank"
    )]
    pub address: String,
    #[validate(custom = "validate_zip_code")]
    pub zip_code: String,
}

/// Profile update request DTO; the username comes from the token
#[derive(Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom = "validate_password_strength")]
    pub password: String,
    #[validate(
        length(min = 1, max = 50, message = "Given name must be between 1 and 50 characters"),
        custom = "validate_not_blank"
    )]
    pub given_name: String,
    #[validate(
        length(min = 1, max = 150, message = "Address must be between 1 and 150 characters"),
        custom = "validate_not_blank"
    )]
    pub address: String,
    #[validate(custom = "validate_zip_code")]
    pub zip_code: String,
}
