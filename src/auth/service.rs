// Authentication service - credential presentation flow

use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::auth::{
    clock::Clock,
    error::AuthError,
    models::{Credential, CredentialRequest},
    password::PasswordHasher,
    token::{AccessToken, TokenIssuer},
};
use crate::users::store::IdentityStore;

/// Exchanges resource owner credentials for an access token
///
/// Resource owner password credentials are a deprecated OAuth 2.0 grant; they
/// are kept here only because clients of this API log in with them.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        store: Arc<dyn IdentityStore>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            clock,
        }
    }

    /// Validate a credential request and issue a token for it
    pub async fn authenticate(&self, request: CredentialRequest) -> Result<AccessToken, AuthError> {
        request.validate()?;
        let credential = match (request.username, request.password) {
            (Some(username), Some(password)) => Credential::new(username, password),
            _ => return Err(AuthError::InvalidInput("username and password are required".to_string())),
        };

        self.login(credential).await
    }

    /// Verify a credential and issue a token
    ///
    /// Unknown usernames and wrong passwords both end in `CredentialMismatch`
    /// after the same amount of hashing work.
    pub async fn login(&self, credential: Credential) -> Result<AccessToken, AuthError> {
        let Credential { username, password } = credential;

        let stored_hash = self
            .store
            .find_by_username(&username)
            .await?
            .map(|user| user.password_hash);
        let known_user = stored_hash.is_some();

        let matched = self.hasher.verify_blocking(password, stored_hash).await?;
        if !matched {
            debug!("Credential mismatch for username={} (known={})", username, known_user);
            return Err(AuthError::CredentialMismatch);
        }

        let token = self.issuer.issue(&username, self.clock.now())?;
        info!("Issued access token: subject={}, expires_at={}", username, token.expires_at());
        Ok(token)
    }
}
