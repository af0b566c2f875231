// Rental API
// User registration, JWT authentication and role-gated account management

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod users;
pub mod validation;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use auth::{
    clock::Clock,
    gate::RoleAuthorizationGate,
    middleware::{enforce_role, AuthContext, RequireRole},
    models::Role,
    password::PasswordHasher,
    service::AuthService,
    token::{SigningContext, TokenIssuer, TokenValidator},
};
use users::store::IdentityStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IdentityStore>,
    pub hasher: PasswordHasher,
    pub auth_service: AuthService,
    pub auth: AuthContext,
    pub gate: RoleAuthorizationGate,
}

impl AppState {
    /// Wire the auth components around one signing context and one store
    pub fn new(signing: SigningContext, store: Arc<dyn IdentityStore>, clock: Arc<dyn Clock>) -> Self {
        let signing = Arc::new(signing);
        let hasher = PasswordHasher::new();
        let issuer = TokenIssuer::new(signing.clone());
        let validator = TokenValidator::new(signing);

        Self {
            auth_service: AuthService::new(store.clone(), hasher.clone(), issuer, clock.clone()),
            auth: AuthContext::new(validator, clock),
            gate: RoleAuthorizationGate::new(store.clone()),
            hasher,
            store,
        }
    }

    /// Middleware configuration for routes restricted to `role`
    pub fn require(&self, role: Role) -> RequireRole {
        RequireRole::new(role, self.auth.clone(), self.gate.clone())
    }
}

impl FromRef<AppState> for AuthContext {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}

/// Creates and configures the application router
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_only = middleware::from_fn_with_state(state.require(Role::Admin), enforce_role);

    let admin_routes = Router::new()
        .route("/v1/user/admin", post(users::create_admin_handler))
        .route(
            "/v1/user/:username",
            get(users::get_user_handler).delete(users::delete_user_handler),
        )
        .route_layer(admin_only);

    let routes = Router::new()
        .route("/v1/authentication/token", post(auth::token_handler))
        .route(
            "/v1/user",
            post(users::create_user_handler).put(users::update_me_handler),
        )
        .route(
            "/v1/user/me",
            get(users::me_handler).delete(users::delete_me_handler),
        );

    Router::new()
        .merge(routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests;
