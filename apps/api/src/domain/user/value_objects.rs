use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidateEmail;

use crate::domain::catalog::{display_as_str, limits, Enumerated};

/// Email value object representing a valid email address
///
/// # Invariants
/// - Syntactically valid (RFC 5322 subset, as checked by `validator`)
/// - At most 254 characters
/// - Stored lowercase, so uniqueness is case-insensitive
/// - Is immutable after construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Creates a new Email value object
    ///
    /// # Example
    /// ```
    /// use esg_platform_api::domain::user::value_objects::Email;
    ///
    /// let email = Email::new("Anna.Nowak@Example.com").expect("valid email");
    /// assert_eq!(email.as_str(), "anna.nowak@example.com");
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, String> {
        let email = email.into().trim().to_lowercase();
        if Self::is_valid(&email) {
            Ok(Email(email))
        } else {
            Err(format!("Invalid email: {}", email))
        }
    }

    fn is_valid(email: &str) -> bool {
        email.chars().count() <= limits::EMAIL_MAX_LENGTH && email.validate_email()
    }

    /// Returns the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user within their company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Manager,
    Employee,
    Viewer,
}

impl Enumerated for UserRole {
    const ALL: &'static [Self] = &[
        UserRole::SuperAdmin,
        UserRole::Admin,
        UserRole::Manager,
        UserRole::Employee,
        UserRole::Viewer,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::Admin => "ADMIN",
            UserRole::Manager => "MANAGER",
            UserRole::Employee => "EMPLOYEE",
            UserRole::Viewer => "VIEWER",
        }
    }
}

display_as_str!(UserRole);

impl UserRole {
    fn rank(&self) -> u8 {
        match self {
            UserRole::SuperAdmin => 4,
            UserRole::Admin => 3,
            UserRole::Manager => 2,
            UserRole::Employee => 1,
            UserRole::Viewer => 0,
        }
    }

    /// Returns true if a holder of this role may grant `role` to someone
    pub fn can_assign(&self, role: UserRole) -> bool {
        self.rank() >= role.rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_assign_only_up_to_their_own_rank() {
        assert!(UserRole::SuperAdmin.can_assign(UserRole::SuperAdmin));
        assert!(UserRole::Admin.can_assign(UserRole::Manager));
        assert!(UserRole::Admin.can_assign(UserRole::Admin));
        assert!(!UserRole::Admin.can_assign(UserRole::SuperAdmin));
        assert!(!UserRole::Viewer.can_assign(UserRole::Employee));
    }

    #[test]
    fn valid_email() {
        assert!(Email::new("test@example.com").is_ok());
    }

    #[test]
    fn valid_email_with_subdomain() {
        assert!(Email::new("user@mail.example.com").is_ok());
    }

    #[test]
    fn email_is_normalized() {
        let email = Email::new("  User@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn invalid_email_no_at_symbol() {
        assert!(Email::new("invalid").is_err());
    }

    #[test]
    fn invalid_email_missing_domain() {
        assert!(Email::new("a@").is_err());
    }

    #[test]
    fn invalid_email_empty() {
        assert!(Email::new("").is_err());
    }

    #[test]
    fn invalid_email_too_long() {
        let local = "a".repeat(60);
        let domain = format!("{}.com", "b".repeat(200));
        assert!(Email::new(format!("{local}@{domain}")).is_err());
    }

    #[test]
    fn email_display() {
        let email = Email::new("test@example.com").unwrap();
        assert_eq!(format!("{}", email), "test@example.com");
    }

    #[test]
    fn role_wire_names() {
        assert_eq!(UserRole::parse("SUPER_ADMIN"), Some(UserRole::SuperAdmin));
        assert_eq!(UserRole::Viewer.to_string(), "VIEWER");
        assert_eq!(UserRole::parse("OWNER"), None);
    }
}
