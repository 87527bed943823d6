use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::user::{Email, User, UserRole};

/// Optional criteria for listing users
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub company_id: Option<Uuid>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.company_id.map_or(true, |id| user.company_id() == id)
            && self.role.map_or(true, |r| user.role() == r)
            && self.is_active.map_or(true, |a| user.is_active() == a)
    }
}

/// Repository trait for the User aggregate
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Save a user (insert or update)
    ///
    /// Fails with `Conflict` if another user already uses the email.
    async fn save(&self, user: &User) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>>;

    /// List users ordered by last name, then first name
    async fn list(&self, filter: &UserFilter, page: PageRequest) -> RepositoryResult<Page<User>>;
}
