//! User model and related request/response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default role granted to every user
pub const ROLE_USER: &str = "ROLE_USER";

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Roles as stored; use [`User::roles`] to read them
    pub stored_roles: Vec<String>,
    pub password_hash: String,
    pub nom: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Roles of the user, always containing `ROLE_USER` exactly once
    pub fn roles(&self) -> Vec<String> {
        let mut roles = self.stored_roles.clone();
        roles.push(ROLE_USER.to_string());

        let mut seen = std::collections::HashSet::new();
        roles.retain(|r| seen.insert(r.clone()));
        roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| r == role)
    }
}

/// New user creation payload, built by the registration handler
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub nom: String,
    pub roles: Vec<String>,
    /// Plaintext password, hashed by the repository before storage
    pub password: String,
}

impl NewUser {
    /// Normalize inputs and merge the requested roles with the default one
    pub fn new(email: &str, nom: &str, password: &str, extra_roles: Vec<String>) -> Self {
        let mut roles = vec![ROLE_USER.to_string()];
        for role in extra_roles {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        Self {
            email: email.trim().to_lowercase(),
            nom: nom.trim().to_string(),
            roles,
            password: password.to_string(),
        }
    }
}

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub nom: Option<String>,
    pub roles: Option<Vec<String>>,
}

/// Request body for user login; `username` is accepted as an alias for `email`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User projection returned by the API; never carries the password hash
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub nom: String,
    pub roles: Vec<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            nom: user.nom.clone(),
            roles: user.roles(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_roles(stored_roles: Vec<String>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            stored_roles,
            password_hash: "hash".to_string(),
            nom: "A".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_roles_always_contain_role_user() {
        let user = user_with_roles(vec![]);
        assert_eq!(user.roles(), vec![ROLE_USER.to_string()]);
    }

    #[test]
    fn test_roles_deduplicated() {
        let user = user_with_roles(vec![
            "ROLE_ADMIN".to_string(),
            ROLE_USER.to_string(),
            "ROLE_ADMIN".to_string(),
        ]);
        let roles = user.roles();
        assert_eq!(roles, vec!["ROLE_ADMIN".to_string(), ROLE_USER.to_string()]);
    }

    #[test]
    fn test_new_user_normalizes_email_and_nom() {
        let new_user = NewUser::new("  John@Example.COM ", "  John  ", "secret1", vec![]);
        assert_eq!(new_user.email, "john@example.com");
        assert_eq!(new_user.nom, "John");
    }

    #[test]
    fn test_new_user_merges_roles_with_default() {
        let new_user = NewUser::new(
            "a@b.com",
            "A",
            "secret1",
            vec!["ROLE_ADMIN".to_string(), ROLE_USER.to_string()],
        );
        assert_eq!(
            new_user.roles,
            vec![ROLE_USER.to_string(), "ROLE_ADMIN".to_string()]
        );
    }

    #[test]
    fn test_login_request_accepts_username_alias() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username": "a@b.com", "password": "x"}"#).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_user_response_never_exposes_hash() {
        let user = user_with_roles(vec![]);
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }
}
