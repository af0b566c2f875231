// User account module
// Identity storage and the account management endpoints

pub mod handlers;
pub mod models;
pub mod repository;
pub mod store;

pub use handlers::*;
pub use models::{CreateUserRequest, NewUser, ProfileUpdate, UpdateUserRequest, User, UserResponse};
pub use repository::PgUserRepository;
pub use store::{IdentityStore, InMemoryIdentityStore, StoreError};
