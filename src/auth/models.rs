// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::auth::token::AccessToken;
use crate::validation::validate_not_blank;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resource owner credential presentation
///
/// Fields are optional so a `null` or missing value reaches validation and
/// comes back as a field error instead of a body parsing failure.
#[derive(Deserialize, Validate)]
pub struct CredentialRequest {
    #[validate(
        required(message = "Username is required"),
        custom = "validate_not_blank"
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "Password is required"),
        custom = "validate_not_blank"
    )]
    pub password: Option<String>,
}

// Keeps the plaintext out of request logs
impl fmt::Debug for CredentialRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A validated credential, never persisted
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token endpoint response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<AccessToken> for TokenResponse {
    fn from(token: AccessToken) -> Self {
        let expires_at = token.expires_at();
        Self {
            token_type: "Bearer".to_string(),
            access_token: token.into_string(),
            expires_at,
        }
    }
}
