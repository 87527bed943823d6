use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::value_objects::{Email, UserRole};
use crate::domain::catalog::limits;
use crate::domain::validation::reader::{present, Mode, PayloadReader, Presence};
use crate::domain::validation::{ValidationError, ValidationErrors};

/// A validated payload for creating a user
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub company_id: Uuid,
    /// Plaintext password, hashed before the user is built
    pub password: String,
}

impl NewUser {
    /// Validates a create payload, reporting every violation at once
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Create);
        let email = read_email(&mut r);
        let first_name = r.string("firstName", Presence::Required, limits::NAME_MAX_LENGTH);
        let last_name = r.string("lastName", Presence::Required, limits::NAME_MAX_LENGTH);
        let role = r.enumerated::<UserRole>("role", Presence::Optional);
        let company_id = r.uuid("companyId", Presence::Required);
        let password = r.secret(
            "password",
            Presence::Required,
            limits::PASSWORD_MIN_LENGTH,
            limits::PASSWORD_MAX_LENGTH,
        );
        r.finish()?;

        Ok(Self {
            email: present(email, "email")?,
            first_name: present(first_name, "firstName")?,
            last_name: present(last_name, "lastName")?,
            role: role.unwrap_or(UserRole::Employee),
            company_id: present(company_id, "companyId")?,
            password: present(password, "password")?,
        })
    }
}

/// A validated partial update for a user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Update);
        let changes = Self {
            email: read_email(&mut r),
            first_name: r.string("firstName", Presence::Optional, limits::NAME_MAX_LENGTH),
            last_name: r.string("lastName", Presence::Optional, limits::NAME_MAX_LENGTH),
            role: r.enumerated::<UserRole>("role", Presence::Optional),
            is_active: r.boolean("isActive"),
        };
        r.finish()?;
        Ok(changes)
    }
}

fn read_email(r: &mut PayloadReader<'_>) -> Option<Email> {
    let raw = r.string("email", Presence::Required, limits::EMAIL_MAX_LENGTH)?;
    match Email::new(raw) {
        Ok(email) => Some(email),
        Err(_) => {
            r.push(ValidationError::invalid_format("email", "email address"));
            None
        }
    }
}

/// User aggregate
///
/// # Invariants
/// - Email is syntactically valid and unique (uniqueness enforced by storage)
/// - Belongs to exactly one company
/// - The password hash is never serialized
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: Uuid,
    email: Email,
    first_name: String,
    last_name: String,
    role: UserRole,
    company_id: Uuid,
    is_active: bool,
    #[serde(skip_serializing)]
    password_hash: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a new active user from a validated payload and a password hash
    pub fn new(new_user: NewUser, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            role: new_user.role,
            company_id: new_user.company_id,
            is_active: true,
            password_hash,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a validated partial update
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(first_name) = changes.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn company_id(&self) -> Uuid {
        self.company_id
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reconstructs a User from persistence layer data
    ///
    /// Bypasses validation; only repository implementations should call it.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        email: Email,
        first_name: String,
        last_name: String,
        role: UserRole,
        company_id: Uuid,
        is_active: bool,
        password_hash: String,
        last_login_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            first_name,
            last_name,
            role,
            company_id,
            is_active,
            password_hash,
            last_login_at,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn valid_payload() -> Map<String, Value> {
        payload(json!({
            "email": "anna@example.com",
            "firstName": "Anna",
            "lastName": "Nowak",
            "role": "MANAGER",
            "companyId": Uuid::new_v4().to_string(),
            "password": "correct-horse"
        }))
    }

    #[test]
    fn valid_payload_builds_new_user() {
        let new_user = NewUser::from_payload(&valid_payload()).unwrap();
        assert_eq!(new_user.email.as_str(), "anna@example.com");
        assert_eq!(new_user.role, UserRole::Manager);
    }

    #[test]
    fn role_defaults_to_employee() {
        let mut body = valid_payload();
        body.remove("role");
        let new_user = NewUser::from_payload(&body).unwrap();
        assert_eq!(new_user.role, UserRole::Employee);
    }

    #[test]
    fn missing_email_and_first_name_are_both_reported() {
        let mut body = valid_payload();
        body.remove("email");
        body.remove("firstName");

        let errors = NewUser::from_payload(&body).unwrap_err();
        assert_eq!(errors.missing_fields(), vec!["email", "firstName"]);
    }

    #[test]
    fn unknown_role_lists_five_roles() {
        let mut body = valid_payload();
        body.insert("role".into(), json!("OWNER"));

        let errors = NewUser::from_payload(&body).unwrap_err();
        match &errors.errors()[0] {
            ValidationError::NotAllowed { allowed_values, .. } => {
                assert_eq!(allowed_values.len(), 5)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut body = valid_payload();
        body.insert("email".into(), json!("not-an-email"));
        assert!(NewUser::from_payload(&body).unwrap_err().has_field("email"));
    }

    #[test]
    fn long_first_name_is_rejected() {
        let mut body = valid_payload();
        body.insert("firstName".into(), json!("x".repeat(101)));
        let errors = NewUser::from_payload(&body).unwrap_err();
        assert_eq!(errors.errors()[0], ValidationError::too_long("firstName", 100));
    }

    #[test]
    fn apply_changes_refreshes_updated_at() {
        let new_user = NewUser::from_payload(&valid_payload()).unwrap();
        let mut user = User::new(new_user, "hash".into());
        let before = user.updated_at();

        let changes = UserChanges::from_payload(&payload(json!({ "lastName": "Kowalska" }))).unwrap();
        user.apply(changes);

        assert_eq!(user.last_name(), "Kowalska");
        assert_eq!(user.first_name(), "Anna");
        assert!(user.updated_at() >= before);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let new_user = NewUser::from_payload(&valid_payload()).unwrap();
        let user = User::new(new_user, "secret-hash".into());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["firstName"], "Anna");
        assert_eq!(json["isActive"], true);
    }
}
