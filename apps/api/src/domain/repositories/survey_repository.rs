use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::survey::{Survey, SurveyResponse, SurveyStatus, SurveyType};

/// Optional criteria for listing surveys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyFilter {
    pub company_id: Option<Uuid>,
    pub survey_type: Option<SurveyType>,
    pub status: Option<SurveyStatus>,
}

impl SurveyFilter {
    pub fn matches(&self, survey: &Survey) -> bool {
        self.company_id.map_or(true, |id| survey.company_id() == id)
            && self.survey_type.map_or(true, |t| survey.survey_type() == t)
            && self.status.map_or(true, |s| survey.status() == s)
    }
}

/// Repository trait for surveys and their responses
#[async_trait]
pub trait SurveyRepository: Send + Sync {
    /// Save a survey (insert or update)
    async fn save(&self, survey: &Survey) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Survey>>;

    /// List surveys, newest first
    async fn list(&self, filter: &SurveyFilter, page: PageRequest) -> RepositoryResult<Page<Survey>>;

    /// Delete a survey and its responses, failing with `NotFound` if it does not exist
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;

    async fn save_response(&self, response: &SurveyResponse) -> RepositoryResult<()>;

    /// Responses to one survey in submission order
    async fn list_responses(&self, survey_id: Uuid, page: PageRequest) -> RepositoryResult<Page<SurveyResponse>>;
}
