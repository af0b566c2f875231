// Role-based authorization against persisted identity state
//
// The token carries only the subject. Every gated request looks the subject up
// again so role changes and account deletions apply on the next request, at the
// cost of one store read per gated call.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{error::AuthError, models::Role};
use crate::users::{models::User, store::IdentityStore};

/// Outcome of a gate check
#[derive(Debug)]
pub enum Authorization {
    Permitted(User),
    Denied,
}

impl Authorization {
    pub fn is_permitted(&self) -> bool {
        matches!(self, Authorization::Permitted(_))
    }

    /// Permitted identity, or the opaque rejection
    pub fn into_result(self) -> Result<User, AuthError> {
        match self {
            Authorization::Permitted(user) => Ok(user),
            Authorization::Denied => Err(AuthError::NotPermitted),
        }
    }
}

#[derive(Clone)]
pub struct RoleAuthorizationGate {
    store: Arc<dyn IdentityStore>,
}

impl RoleAuthorizationGate {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Decide whether `subject` currently holds `required_role`
    ///
    /// `Err` only when the store itself fails.
    pub async fn authorize(
        &self,
        required_role: Role,
        subject: &str,
    ) -> Result<Authorization, AuthError> {
        let Some(user) = self.store.find_by_username(subject).await? else {
            warn!(
                "Authorization denied: subject={} no longer exists, required_role={}",
                subject, required_role
            );
            return Ok(Authorization::Denied);
        };

        if user.role != required_role {
            warn!(
                "Authorization denied: subject={}, required_role={}, actual_role={}",
                subject, required_role, user.role
            );
            return Ok(Authorization::Denied);
        }

        debug!("Authorization granted: subject={}, role={}", subject, user.role);
        Ok(Authorization::Permitted(user))
    }
}
