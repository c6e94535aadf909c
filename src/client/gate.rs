use uuid::Uuid;

use crate::rbac::{PermissionTable, Policy, Principal, PERMISSIONS};

/// Answers "may the signed-in user do this?" for showing or hiding UI controls.
///
/// Uses the same evaluation as the server, so a control is shown exactly when
/// the matching request would be accepted. Without a principal every answer is no.
#[derive(Debug, Clone)]
pub struct UiGate<P = &'static PermissionTable> {
    principal: Option<Principal>,
    policy: P,
}

impl UiGate {
    /// Gate backed by the built-in permission table.
    pub fn builtin(principal: Option<Principal>) -> Self {
        Self::new(principal, &PERMISSIONS)
    }
}

impl<P: Policy> UiGate<P> {
    pub fn new(principal: Option<Principal>, policy: P) -> Self {
        Self { principal, policy }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// `owner_id` is the author of the resource the control acts on, if any.
    pub fn can(&self, action: &str, owner_id: Option<Uuid>) -> bool {
        match &self.principal {
            Some(principal) => principal
                .can_with(&self.policy, action, owner_id)
                .is_allowed(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::{actions, Role};

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            username: role.as_str().to_lowercase(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_no_principal_sees_nothing() {
        let gate = UiGate::builtin(None);
        for action in [
            actions::POSTS_READ,
            actions::POSTS_CREATE,
            actions::POSTS_UPDATE,
            actions::POSTS_DELETE,
            actions::USERS_MANAGE,
        ] {
            assert!(!gate.can(action, None));
        }
    }

    #[test]
    fn test_editor_controls() {
        let editor = principal(Role::Editor);
        let own = editor.id;
        let gate = UiGate::builtin(Some(editor));

        assert!(gate.can(actions::POSTS_CREATE, None));
        assert!(gate.can(actions::POSTS_UPDATE, Some(own)));
        assert!(gate.can(actions::POSTS_DELETE, Some(own)));
        assert!(!gate.can(actions::POSTS_DELETE, Some(Uuid::new_v4())));
        assert!(!gate.can(actions::USERS_MANAGE, None));
    }

    #[test]
    fn test_viewer_only_reads() {
        let gate = UiGate::builtin(Some(principal(Role::Viewer)));

        assert!(gate.can(actions::POSTS_READ, None));
        assert!(!gate.can(actions::POSTS_CREATE, None));
        assert!(!gate.can(actions::POSTS_UPDATE, Some(Uuid::new_v4())));
    }

    #[test]
    fn test_exported_matrix_agrees_with_builtin() {
        let admin = principal(Role::Admin);
        let exported = UiGate::new(Some(admin.clone()), PERMISSIONS.export());
        let builtin = UiGate::builtin(Some(admin));
        let other = Some(Uuid::new_v4());

        for action in [actions::POSTS_UPDATE, actions::USERS_MANAGE, "posts:archive"] {
            assert_eq!(exported.can(action, other), builtin.can(action, other));
        }
    }
}
