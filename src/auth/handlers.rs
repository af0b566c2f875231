// HTTP handlers for authentication endpoints

use axum::{extract::State, Json};

use crate::auth::{
    error::AuthError,
    models::{CredentialRequest, TokenResponse},
    service::AuthService,
};

/// Exchange credentials for a bearer token
/// POST /v1/authentication/token
pub async fn token_handler(
    State(service): State<AuthService>,
    Json(request): Json<CredentialRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let token = service.authenticate(request).await?;
    Ok(Json(token.into()))
}
