//! User entity - an account that can join channels

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// System role given to every account on registration
pub const ROLE_USER: &str = "user";
/// System role for platform administrators
pub const ROLE_ADMIN: &str = "admin";

/// User account. The password hash is never part of the entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub name: String,
    pub surname: String,
    /// Always stored lowercase
    pub email: String,
    /// System-wide roles, unrelated to per-channel member roles
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: Snowflake, name: String, surname: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            surname,
            email: email.to_lowercase(),
            roles: vec![ROLE_USER.to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    /// "name surname", trimmed when the surname is empty
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ROLE_ADMIN)
    }

    pub fn set_name(&mut self, name: Option<String>, surname: Option<String>) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(surname) = surname {
            self.surname = surname;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            Snowflake::new(1),
            "Ada".to_string(),
            "Lovelace".to_string(),
            "Ada@Example.com".to_string(),
        )
    }

    #[test]
    fn test_new_user_defaults() {
        let user = user();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.roles, vec!["user".to_string()]);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_display_name() {
        let mut user = user();
        assert_eq!(user.display_name(), "Ada Lovelace");
        user.surname.clear();
        assert_eq!(user.display_name(), "Ada");
    }

    #[test]
    fn test_partial_rename() {
        let mut user = user();
        user.set_name(None, Some("Byron".to_string()));
        assert_eq!(user.name, "Ada");
        assert_eq!(user.surname, "Byron");
    }

    #[test]
    fn test_admin_role() {
        let mut user = user();
        user.roles.push(ROLE_ADMIN.to_string());
        assert!(user.is_admin());
    }
}
