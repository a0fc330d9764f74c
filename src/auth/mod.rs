pub mod session;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::UserCredential;

pub use session::SessionStore;

/// Permission level attached to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity bound to a live session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    pub role: Role,
    pub name: String,
}

/// Read-only credential set consulted at login.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<UserCredential>,
}

impl UserDirectory {
    pub fn new(users: Vec<UserCredential>) -> Self {
        Self { users }
    }

    /// Returns the identity for a matching email/password pair.
    pub fn verify(&self, email: &str, password: &str) -> Option<SessionUser> {
        self.users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .map(|u| SessionUser {
                email: u.email.clone(),
                role: u.role,
                name: u.name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    fn directory() -> UserDirectory {
        UserDirectory::new(AuthConfig::demo_users().users)
    }

    #[test]
    fn verifies_known_credentials() {
        let user = directory().verify("admin@college.edu", "admin123").unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.name, "Admin User");
    }

    #[test]
    fn rejects_wrong_password_and_unknown_email() {
        let dir = directory();
        assert!(dir.verify("admin@college.edu", "faculty123").is_none());
        assert!(dir.verify("nobody@college.edu", "admin123").is_none());
        assert!(dir.verify("", "").is_none());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Faculty).unwrap(), "faculty");
        let role: Role = serde_json::from_value(serde_json::json!("student")).unwrap();
        assert_eq!(role, Role::Student);
    }
}
