use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::policy::{Policy, Scope, PERMISSIONS};

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Decide whether `role` may perform `action`.
///
/// For `Own`-scoped grants, `owner_id` is compared to `principal_id` by plain
/// equality. A missing `owner_id` means the action has no single owning
/// resource (listing, creating) and is allowed.
pub fn evaluate<P, I>(
    policy: &P,
    role: &str,
    action: &str,
    principal_id: &I,
    owner_id: Option<&I>,
) -> Decision
where
    P: Policy + ?Sized,
    I: PartialEq + ?Sized,
{
    match policy.scope(role, action) {
        None => Decision::Deny,
        Some(Scope::Any) => Decision::Allow,
        Some(Scope::Own) => match owner_id {
            None => Decision::Allow,
            Some(owner) => (owner == principal_id).into(),
        },
    }
}

/// The authenticated actor behind a request or client session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub id: Uuid,
    #[schema(example = "editor")]
    pub username: String,
    /// Role name as issued. Names this build does not recognize are granted nothing.
    #[schema(example = "Editor")]
    pub role: String,
}

impl Principal {
    /// Evaluate `action` for this principal against the built-in table.
    pub fn can(&self, action: &str, owner_id: Option<Uuid>) -> Decision {
        self.can_with(&PERMISSIONS, action, owner_id)
    }

    pub fn can_with<P: Policy + ?Sized>(
        &self,
        policy: &P,
        action: &str,
        owner_id: Option<Uuid>,
    ) -> Decision {
        evaluate(policy, &self.role, action, &self.id, owner_id.as_ref())
    }
}
