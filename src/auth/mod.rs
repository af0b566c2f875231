// Authentication module
// Password hashing, JWT issuance/validation and role-gated authorization

pub mod clock;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use gate::{Authorization, RoleAuthorizationGate};
pub use handlers::token_handler;
pub use middleware::{enforce_role, AuthContext, AuthenticatedUser, RequireRole};
pub use models::{Credential, CredentialRequest, Role, TokenResponse};
pub use password::{PasswordHasher, PasswordRecord};
pub use service::AuthService;
pub use token::{AccessToken, Claims, SigningContext, TokenIssuer, TokenValidator};
