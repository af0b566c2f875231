// Password hashing and verification service

use crate::auth::error::AuthError;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use std::fmt;
use std::sync::OnceLock;

/// One-way password hash in PHC string format
///
/// The salt and cost parameters travel inside the string, so the same
/// plaintext never produces the same record twice.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordRecord {
    hash: String,
}

impl PasswordRecord {
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }
}

impl fmt::Debug for PasswordRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordRecord(<redacted>)")
    }
}

/// Argon2id hasher with a fixed work factor
///
/// Uses the argon2 crate defaults (19 MiB, 2 passes, 1 lane), which costs
/// tens of milliseconds per call. Verification always uses the parameters
/// embedded in the stored hash.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<PasswordRecord, AuthError> {
        if plaintext.is_empty() {
            return Err(AuthError::InvalidInput("password must not be empty".to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;

        Ok(PasswordRecord {
            hash: hash.to_string(),
        })
    }

    /// Verify a plaintext password against a stored hash
    /// Malformed hashes never match
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Spend the same effort as a real verification and report no match
    ///
    /// Used when the username is unknown so response timing does not reveal
    /// whether an account exists.
    pub fn verify_against_decoy(&self, plaintext: &str) -> bool {
        static DECOY: OnceLock<String> = OnceLock::new();
        let decoy = DECOY.get_or_init(|| {
            self.hash("decoy-password-never-assigned")
                .map(PasswordRecord::into_string)
                .unwrap_or_default()
        });
        let _ = self.verify(plaintext, decoy);
        false
    }

    /// `hash` on the blocking thread pool
    pub async fn hash_blocking(&self, plaintext: String) -> Result<PasswordRecord, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
    }

    /// `verify` on the blocking thread pool
    ///
    /// `None` for the hash runs the decoy verification instead.
    pub async fn verify_blocking(
        &self,
        plaintext: String,
        hash: Option<String>,
    ) -> Result<bool, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&plaintext, &hash),
            None => hasher.verify_against_decoy(&plaintext),
        })
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }
}
