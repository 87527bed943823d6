use thiserror::Error;
use uuid::Uuid;

/// Failure of a repository operation
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// A uniqueness rule was violated (duplicate email or NIP)
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be turned back into a domain value
    #[error("Corrupt {entity} record: {reason}")]
    Corrupt { entity: &'static str, reason: String },
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
