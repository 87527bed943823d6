use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::catalog::Industry;
use crate::domain::company::{Company, CompanySize, Nip};
use crate::domain::pagination::{Page, PageRequest};

/// Optional criteria for listing companies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyFilter {
    pub industry: Option<Industry>,
    pub size: Option<CompanySize>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring of the company name
    pub search: Option<String>,
}

impl CompanyFilter {
    pub fn matches(&self, company: &Company) -> bool {
        self.industry.map_or(true, |i| company.industry() == i)
            && self.size.map_or(true, |s| company.size() == s)
            && self.is_active.map_or(true, |a| company.is_active() == a)
            && self.search.as_deref().map_or(true, |needle| {
                company.name().to_lowercase().contains(&needle.to_lowercase())
            })
    }
}

/// Repository trait for the Company aggregate
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Save a company (insert or update)
    ///
    /// Fails with `Conflict` if another company already uses the NIP.
    async fn save(&self, company: &Company) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Company>>;

    async fn find_by_nip(&self, nip: &Nip) -> RepositoryResult<Option<Company>>;

    /// List companies ordered by name
    async fn list(&self, filter: &CompanyFilter, page: PageRequest) -> RepositoryResult<Page<Company>>;

    /// Deactivate a company together with all of its users
    ///
    /// Returns the number of users that were deactivated.
    async fn deactivate(&self, id: Uuid) -> RepositoryResult<u64>;
}
