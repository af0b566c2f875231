// JWT issuance and validation
//
// Tokens are stateless HS256 bearer credentials. There is no revocation list: a
// leaked token stays valid until `exp`, so `expire_in_days` bounds the exposure
// window. Role changes and account deletions still take effect immediately
// because the role gate re-reads the identity store on every gated request.

use crate::auth::error::AuthError;
use crate::config::{ConfigError, TOKEN_EXPIRE_IN_DAYS, TOKEN_HMAC_SECRET_KEY};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// HMAC-SHA-256 needs a key at least as long as its output
pub const MIN_SECRET_BYTES: usize = 32;

/// Upper bound on token lifetime accepted from configuration
pub const MAX_EXPIRE_IN_DAYS: i64 = 3650;

/// Signing settings shared by the issuer and the validator
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct SigningContext {
    audience: String,
    issuer: String,
    secret: Vec<u8>,
    expire_in_days: i64,
    leeway_seconds: u64,
}

impl SigningContext {
    pub fn new(
        audience: impl Into<String>,
        issuer: impl Into<String>,
        secret: Vec<u8>,
        expire_in_days: i64,
        leeway_seconds: u64,
    ) -> Result<Self, ConfigError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Invalid {
                key: TOKEN_HMAC_SECRET_KEY,
                reason: format!(
                    "decoded key is {} bytes, at least {} are required",
                    secret.len(),
                    MIN_SECRET_BYTES
                ),
            });
        }
        if !(0..=MAX_EXPIRE_IN_DAYS).contains(&expire_in_days) {
            return Err(ConfigError::Invalid {
                key: TOKEN_EXPIRE_IN_DAYS,
                reason: format!("must be between 0 and {}", MAX_EXPIRE_IN_DAYS),
            });
        }

        Ok(Self {
            audience: audience.into(),
            issuer: issuer.into(),
            secret,
            expire_in_days,
            leeway_seconds,
        })
    }

    /// Build from raw configuration strings: base64 secret and an integer day count
    pub fn from_settings(
        audience: &str,
        issuer: &str,
        secret_base64: &str,
        expire_in_days: &str,
        leeway_seconds: u64,
    ) -> Result<Self, ConfigError> {
        let secret = STANDARD
            .decode(secret_base64.trim())
            .map_err(|e| ConfigError::Invalid {
                key: TOKEN_HMAC_SECRET_KEY,
                reason: format!("not valid base64: {}", e),
            })?;
        let expire_in_days = expire_in_days
            .trim()
            .parse::<i64>()
            .map_err(|e| ConfigError::Invalid {
                key: TOKEN_EXPIRE_IN_DAYS,
                reason: e.to_string(),
            })?;

        Self::new(audience, issuer, secret, expire_in_days, leeway_seconds)
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn expire_in_days(&self) -> i64 {
        self.expire_in_days
    }

    pub fn leeway_seconds(&self) -> u64 {
        self.leeway_seconds
    }
}

// The secret never reaches logs
impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("secret", &"<redacted>")
            .field("expire_in_days", &self.expire_in_days)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub iss: String,
    pub aud: String,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A signed bearer token together with its expiry instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn into_string(self) -> String {
        self.token
    }
}

/// Mints signed access tokens
#[derive(Clone)]
pub struct TokenIssuer {
    context: Arc<SigningContext>,
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(context: Arc<SigningContext>) -> Self {
        let encoding_key = EncodingKey::from_secret(&context.secret);
        Self {
            context,
            encoding_key,
        }
    }

    /// Issue a token for `subject` valid for the configured number of days from `now`
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<AccessToken, AuthError> {
        if subject.is_empty() {
            return Err(AuthError::InvalidInput("token subject must not be empty".to_string()));
        }

        // whole seconds, so the reported expiry matches the encoded `exp`
        let issued_at = now.timestamp();
        let expires_at = issued_at + Duration::days(self.context.expire_in_days).num_seconds();

        let claims = Claims {
            sub: subject.to_string(),
            iss: self.context.issuer.clone(),
            aud: self.context.audience.clone(),
            exp: expires_at,
            iat: issued_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;

        Ok(AccessToken {
            token,
            expires_at: claims.expires_at(),
        })
    }
}

/// Verifies inbound bearer tokens
///
/// Checks signature, algorithm, issuer, audience and required claims through
/// `jsonwebtoken`, then expiry against the caller-supplied instant so tests can
/// move time forward. `leeway_seconds` defaults to zero: a token is rejected
/// from the exact second of its `exp`.
#[derive(Clone)]
pub struct TokenValidator {
    context: Arc<SigningContext>,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(context: Arc<SigningContext>) -> Self {
        let decoding_key = DecodingKey::from_secret(&context.secret);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[context.audience.as_str()]);
        validation.set_issuer(&[context.issuer.as_str()]);
        validation.set_required_spec_claims(&["sub", "exp", "iss", "aud"]);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            context,
            decoding_key,
            validation,
        }
    }

    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        let leeway = i64::try_from(self.context.leeway_seconds).unwrap_or(i64::MAX);
        if now.timestamp() >= claims.exp.saturating_add(leeway) {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }
}
