use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::report::{Report, ReportStatus, ReportType};

/// Optional criteria for listing reports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub company_id: Option<Uuid>,
    pub report_type: Option<ReportType>,
    pub status: Option<ReportStatus>,
    pub period: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        self.company_id.map_or(true, |id| report.company_id() == id)
            && self.report_type.map_or(true, |t| report.report_type() == t)
            && self.status.map_or(true, |s| report.status() == s)
            && self.period.as_deref().map_or(true, |p| report.period() == p)
    }
}

/// Repository trait for reports
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Save a report (insert or update)
    async fn save(&self, report: &Report) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Report>>;

    /// List reports, newest first
    async fn list(&self, filter: &ReportFilter, page: PageRequest) -> RepositoryResult<Page<Report>>;

    /// Delete a report, failing with `NotFound` if it does not exist
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
