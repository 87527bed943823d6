// Repository interfaces (ports)
// Implementations live in the infrastructure layer

pub mod company_repository;
pub mod errors;
pub mod esg_metric_repository;
pub mod report_repository;
pub mod survey_repository;
pub mod task_repository;
pub mod user_repository;

pub use company_repository::{CompanyFilter, CompanyRepository};
pub use errors::{RepositoryError, RepositoryResult};
pub use esg_metric_repository::{EsgMetricFilter, EsgMetricRepository};
pub use report_repository::{ReportFilter, ReportRepository};
pub use survey_repository::{SurveyFilter, SurveyRepository};
pub use task_repository::{TaskFilter, TaskRepository};
pub use user_repository::{UserFilter, UserRepository};
