use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Action identifiers. Matched by exact string equality, no hierarchy.
pub mod actions {
    pub const POSTS_READ: &str = "posts:read";
    pub const POSTS_CREATE: &str = "posts:create";
    pub const POSTS_UPDATE: &str = "posts:update";
    pub const POSTS_DELETE: &str = "posts:delete";
    pub const USERS_MANAGE: &str = "users:manage";
}

/// Coarse-grained classification of a user account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
    sqlx::Type,
)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Editor, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Editor => "Editor",
            Role::Viewer => "Viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Breadth of a granted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Every resource.
    Any,
    /// Only resources owned by the acting principal.
    Own,
}

/// Anything that can answer "which scope does this role hold for this action".
///
/// Role names are plain strings here so that a principal carrying a role this
/// build does not know about is simply granted nothing.
pub trait Policy {
    fn scope(&self, role: &str, action: &str) -> Option<Scope>;
}

impl<P: Policy + ?Sized> Policy for &P {
    fn scope(&self, role: &str, action: &str) -> Option<Scope> {
        (**self).scope(role, action)
    }
}

type Grants = &'static [(&'static str, Scope)];

/// Static role → action → scope table.
#[derive(Debug)]
pub struct PermissionTable {
    entries: &'static [(Role, Grants)],
}

/// The process-wide permission table.
pub static PERMISSIONS: PermissionTable = PermissionTable {
    entries: &[
        (
            Role::Admin,
            &[
                (actions::POSTS_READ, Scope::Any),
                (actions::POSTS_CREATE, Scope::Any),
                (actions::POSTS_UPDATE, Scope::Any),
                (actions::POSTS_DELETE, Scope::Any),
                (actions::USERS_MANAGE, Scope::Any),
            ],
        ),
        (
            Role::Editor,
            &[
                (actions::POSTS_READ, Scope::Any),
                (actions::POSTS_CREATE, Scope::Any),
                (actions::POSTS_UPDATE, Scope::Own),
                (actions::POSTS_DELETE, Scope::Own),
            ],
        ),
        (Role::Viewer, &[(actions::POSTS_READ, Scope::Any)]),
    ],
};

impl PermissionTable {
    /// All (action, scope) pairs granted to `role`. Unknown roles grant nothing.
    pub fn grants(&self, role: &str) -> &'static [(&'static str, Scope)] {
        role.parse::<Role>()
            .ok()
            .and_then(|role| {
                self.entries
                    .iter()
                    .find(|(r, _)| *r == role)
                    .map(|(_, grants)| *grants)
            })
            .unwrap_or(&[])
    }

    /// Render the table in the shape browser clients consume.
    pub fn export(&self) -> PolicyMatrix {
        let roles = self
            .entries
            .iter()
            .map(|(role, grants)| {
                let actions = grants
                    .iter()
                    .map(|(action, scope)| (action.to_string(), *scope))
                    .collect();
                (role.to_string(), actions)
            })
            .collect();

        PolicyMatrix(roles)
    }
}

impl Policy for PermissionTable {
    fn scope(&self, role: &str, action: &str) -> Option<Scope> {
        self.grants(role)
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, scope)| *scope)
    }
}

/// Owned, serializable copy of a permission table, keyed by role then action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyMatrix(pub BTreeMap<String, BTreeMap<String, Scope>>);

impl Policy for PolicyMatrix {
    fn scope(&self, role: &str, action: &str) -> Option<Scope> {
        self.0.get(role)?.get(action).copied()
    }
}
