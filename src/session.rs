//! Authenticated session boundary: the current user, their role, and accessible institutes.

use crate::error::LoadError;
use crate::model::{EntityId, Organization};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of the session user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Student,
    Parent,
    Teacher,
    InstituteAdmin,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    pub role: UserRole,
    /// Institutes already known for this user; may be empty until loaded.
    #[serde(default)]
    pub institutes: Vec<Organization>,
}

impl User {
    pub fn institute(&self, organization_id: &str) -> Option<&Organization> {
        self.institutes.iter().find(|o| o.id.matches(organization_id))
    }
}

#[async_trait]
pub trait Session: Send + Sync {
    /// `None` once the session has ended.
    fn user(&self) -> Option<User>;

    /// Fetch (or refresh) the user's accessible institutes.
    async fn load_user_institutes(&self) -> Result<Vec<Organization>, LoadError>;
}

/// What upward sync depends on from the session: the user and how many institutes they have.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: Option<EntityId>,
    pub institute_count: usize,
}

impl SessionIdentity {
    pub fn of(user: Option<&User>) -> Self {
        match user {
            Some(u) => SessionIdentity {
                user_id: Some(u.id.clone()),
                institute_count: u.institutes.len(),
            },
            None => SessionIdentity::default(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_user_with_unknown_role() {
        let user: User = serde_json::from_value(json!({
            "id": 5,
            "role": "Librarian",
            "institutes": [{ "id": "N1", "name": "North" }]
        }))
        .unwrap();
        assert_eq!(user.role, UserRole::Other);
        assert!(user.institute("N1").is_some());
        assert_eq!(SessionIdentity::of(Some(&user)).institute_count, 1);
        assert!(!SessionIdentity::of(None).is_signed_in());
    }
}
