use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::esg_metric::{EsgCategory, EsgMetric};
use crate::domain::pagination::{Page, PageRequest};

/// Optional criteria for listing metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EsgMetricFilter {
    pub company_id: Option<Uuid>,
    pub category: Option<EsgCategory>,
    pub period: Option<String>,
    pub verified: Option<bool>,
}

impl EsgMetricFilter {
    pub fn matches(&self, metric: &EsgMetric) -> bool {
        self.company_id.map_or(true, |id| metric.company_id() == id)
            && self.category.map_or(true, |c| metric.category() == c)
            && self.period.as_deref().map_or(true, |p| metric.period() == p)
            && self.verified.map_or(true, |v| metric.verified() == v)
    }
}

/// Repository trait for ESG metrics
#[async_trait]
pub trait EsgMetricRepository: Send + Sync {
    /// Save a metric (insert or update)
    async fn save(&self, metric: &EsgMetric) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<EsgMetric>>;

    /// List metrics, newest first
    async fn list(&self, filter: &EsgMetricFilter, page: PageRequest) -> RepositoryResult<Page<EsgMetric>>;

    /// Every metric a company recorded for one period
    async fn find_for_period(&self, company_id: Uuid, period: &str) -> RepositoryResult<Vec<EsgMetric>>;

    /// Delete a metric, failing with `NotFound` if it does not exist
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
