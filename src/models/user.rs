use serde::{Deserialize, Serialize};

/// Account role as understood by the catalog service.
///
/// The service stores the role as a free-form `type` string; everything
/// that is not exactly `admin` is treated as a regular user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Admin,
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        if s == "admin" {
            Role::Admin
        } else {
            Role::User
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the admin user table (`GET /users`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    #[serde(rename = "type", default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        let admin: Role = serde_json::from_str(r#""admin""#).unwrap();
        assert!(admin.is_admin());

        // Anything that is not "admin" is a regular user
        for s in [r#""user""#, r#""USER""#, r#""moderator""#, r#""""#] {
            let role: Role = serde_json::from_str(s).unwrap();
            assert_eq!(role, Role::User);
        }

        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
    }

    #[test]
    fn test_user_account_parsing() {
        let users: Vec<UserAccount> =
            serde_json::from_str(r#"[{"id": "alice", "type": "admin"}, {"id": "bob"}]"#).unwrap();
        assert_eq!(users.len(), 2);
        assert!(users[0].role.is_admin());
        assert_eq!(users[1].role, Role::User);
    }
}
