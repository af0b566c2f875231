// Authentication extractor and role-gate middleware for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::auth::{
    clock::Clock,
    error::AuthError,
    gate::RoleAuthorizationGate,
    models::Role,
    token::{Claims, TokenValidator},
};

/// What request handling needs to authenticate a bearer token
#[derive(Clone)]
pub struct AuthContext {
    pub validator: TokenValidator,
    pub clock: Arc<dyn Clock>,
}

impl AuthContext {
    pub fn new(validator: TokenValidator, clock: Arc<dyn Clock>) -> Self {
        Self { validator, clock }
    }

    /// Extract and validate the bearer token carried by `headers`
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = bearer_token(headers)?;
        self.validator.validate(token, self.clock.now())
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("authorization header is not ASCII".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidToken("expected a Bearer token".to_string()))
}

/// Authenticated caller for protected routes
///
/// Only proves the token is valid. Role checks happen in `enforce_role`,
/// which also inserts this value so handlers behind it skip a second decode.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AuthContext: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        let claims = AuthContext::from_ref(state).authenticate(&parts.headers)?;
        Ok(AuthenticatedUser {
            username: claims.sub,
        })
    }
}

/// Role requirement for a group of routes
#[derive(Clone)]
pub struct RequireRole {
    required_role: Role,
    auth: AuthContext,
    gate: RoleAuthorizationGate,
}

impl RequireRole {
    pub fn new(required_role: Role, auth: AuthContext, gate: RoleAuthorizationGate) -> Self {
        Self {
            required_role,
            auth,
            gate,
        }
    }

    pub fn required_role(&self) -> Role {
        self.required_role
    }
}

/// Middleware stage run before role-restricted handlers
///
/// Authenticates the bearer token, then asks the gate about the subject's
/// current role. Every failure short-circuits with the same 401.
///
/// Used with `axum::middleware::from_fn_with_state(RequireRole::new(..), enforce_role)`.
pub async fn enforce_role(
    State(rule): State<RequireRole>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();

    let claims = rule.auth.authenticate(request.headers())?;
    let user = rule
        .gate
        .authorize(rule.required_role(), &claims.sub)
        .await?
        .into_result()?;

    debug!(
        "Role check passed: username={}, required_role={}, endpoint={}",
        user.username,
        rule.required_role(),
        endpoint
    );
    request.extensions_mut().insert(AuthenticatedUser {
        username: user.username,
    });
    Ok(next.run(request).await)
}
