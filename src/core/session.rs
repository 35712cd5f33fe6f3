//! Authentication state types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// The signed-in user as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(default)]
    pub last_login_at: Option<String>,
    #[serde(default, rename = "lastLoginIP")]
    pub last_login_ip: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Token and user of the current session.
///
/// A user is only ever stored together with a token; the only constructors are
/// [`Session::anonymous`] and [`Session::authenticated`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: String, user: User) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// True iff a non-empty token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
pub(crate) fn sample_user() -> User {
    User {
        id: "123".to_string(),
        full_name: "John Doe".to_string(),
        email: "john@example.com".to_string(),
        role: Role::User,
        is_active: true,
        last_login_at: Some("2024-01-01".to_string()),
        last_login_ip: Some("127.0.0.1".to_string()),
        created_at: "2024-01-01".to_string(),
        updated_at: "2024-01-01".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialization() {
        let json = r#"{
            "id": "42",
            "fullName": "Jane Roe",
            "email": "jane@example.com",
            "role": "admin",
            "isActive": true,
            "lastLoginAt": "2024-03-01T10:00:00Z",
            "lastLoginIP": "10.0.0.1",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-02-01T00:00:00Z"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.full_name, "Jane Roe");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.last_login_ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_user_without_login_history() {
        let json = r#"{
            "id": "42",
            "fullName": "Jane Roe",
            "email": "jane@example.com",
            "role": "user",
            "isActive": false,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.last_login_at.is_none());
        assert!(user.last_login_ip.is_none());
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let session = Session::authenticated(String::new(), sample_user());
        assert!(!session.is_authenticated());
        assert!(!Session::anonymous().is_authenticated());
        assert!(Session::authenticated("t".to_string(), sample_user()).is_authenticated());
    }
}
