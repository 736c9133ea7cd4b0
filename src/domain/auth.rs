use serde::{Deserialize, Serialize};

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::list::List;

/// Claims describing the authenticated caller, as decoded from the identity
/// token by the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Subject identifier from the token.
    pub sub: String,
    /// Email address, used as the stable user identifier in stored records.
    pub email: String,
    /// Hub the user belongs to.
    pub hub_id: i32,
    /// Display name.
    pub name: String,
    /// Assigned roles.
    pub roles: Vec<String>,
    /// Token expiry timestamp.
    pub exp: usize,
}

/// Returns true when `role` is among `roles`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

/// Capability check for acting on a list: the caller must belong to the
/// list's hub and be either a hub admin or an assigned collaborator.
///
/// Admins intentionally bypass the collaborator assignment so they can act
/// on any list in their hub.
pub fn has_list_access(user: &AuthenticatedUser, list: &List) -> bool {
    if user.hub_id != list.hub_id {
        return false;
    }

    if check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return true;
    }

    list.collaborators
        .iter()
        .any(|email| email == &user.email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn list_with_collaborators(hub_id: i32, collaborators: Vec<String>) -> List {
        let datetime = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        List {
            id: 1,
            hub_id,
            name: "Kitchen".to_string(),
            deleted: false,
            deleted_at: None,
            collaborators,
            created_at: datetime,
            updated_at: datetime,
        }
    }

    fn user(hub_id: i32, email: &str, roles: Vec<String>) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user".to_string(),
            email: email.to_string(),
            hub_id,
            name: "User".to_string(),
            roles,
            exp: 0,
        }
    }

    #[test]
    fn admin_has_access_without_assignment() {
        let list = list_with_collaborators(1, Vec::new());
        let admin = user(1, "admin@example.com", vec!["admin".to_string()]);
        assert!(has_list_access(&admin, &list));
    }

    #[test]
    fn collaborator_has_access() {
        let list = list_with_collaborators(1, vec!["cook@example.com".to_string()]);
        let cook = user(1, "cook@example.com", Vec::new());
        assert!(has_list_access(&cook, &list));
    }

    #[test]
    fn unassigned_user_is_denied() {
        let list = list_with_collaborators(1, vec!["cook@example.com".to_string()]);
        let other = user(1, "other@example.com", Vec::new());
        assert!(!has_list_access(&other, &list));
    }

    #[test]
    fn admin_from_another_hub_is_denied() {
        let list = list_with_collaborators(1, Vec::new());
        let admin = user(2, "admin@example.com", vec!["admin".to_string()]);
        assert!(!has_list_access(&admin, &list));
    }
}
