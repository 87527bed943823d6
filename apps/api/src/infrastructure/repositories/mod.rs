// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory;
pub mod postgres_company_repository;
pub mod postgres_esg_metric_repository;
pub mod postgres_report_repository;
pub mod postgres_survey_repository;
pub mod postgres_task_repository;
pub mod postgres_user_repository;

pub use in_memory::InMemoryStore;
pub use postgres_company_repository::PostgresCompanyRepository;
pub use postgres_esg_metric_repository::PostgresEsgMetricRepository;
pub use postgres_report_repository::PostgresReportRepository;
pub use postgres_survey_repository::PostgresSurveyRepository;
pub use postgres_task_repository::PostgresTaskRepository;
pub use postgres_user_repository::PostgresUserRepository;

use crate::domain::pagination::PageRequest;
use crate::domain::repositories::RepositoryError;

/// Maps a driver error, turning unique violations into conflicts
pub(crate) fn database_error(context: &str, error: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            let message = match db.constraint() {
                Some("users_email_key") => "Email already registered".to_string(),
                Some("companies_nip_key") => "A company with this NIP already exists".to_string(),
                Some(constraint) => format!("Duplicate value violates {}", constraint),
                None => "Duplicate value".to_string(),
            };
            return RepositoryError::Conflict(message);
        }
    }
    RepositoryError::Database(format!("{}: {}", context, error))
}

/// LIMIT and OFFSET bind values for a page request
pub(crate) fn limit_offset(page: PageRequest) -> (i64, i64) {
    (
        i64::from(page.limit()),
        i64::try_from(page.offset()).unwrap_or(i64::MAX),
    )
}

/// Converts a COUNT(*) result into a page total
pub(crate) fn total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
