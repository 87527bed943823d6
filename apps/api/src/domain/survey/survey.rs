use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::value_objects::{SurveyStatus, SurveyType};
use crate::domain::catalog::limits;
use crate::domain::errors::TransitionError;
use crate::domain::validation::reader::{present, Mode, PayloadReader, Presence};
use crate::domain::validation::{ValidationError, ValidationErrors};

fn check_window(
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (start_date, end_date) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::cross_field(
            &["startDate", "endDate"],
            "endDate must not be earlier than startDate",
        )),
        _ => Ok(()),
    }
}

/// A validated payload for creating a survey
#[derive(Debug, Clone, PartialEq)]
pub struct NewSurvey {
    pub company_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub survey_type: SurveyType,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_anonymous: bool,
}

impl NewSurvey {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Create);
        let company_id = r.uuid("companyId", Presence::Required);
        let title = r.string("title", Presence::Required, limits::TITLE_MAX_LENGTH);
        let description = r.string("description", Presence::Optional, limits::DESCRIPTION_MAX_LENGTH);
        let survey_type = r.enumerated::<SurveyType>("type", Presence::Required);
        let start_date = r.datetime("startDate", Presence::Optional);
        let end_date = r.end_datetime("endDate", Presence::Optional);
        let is_anonymous = r.boolean("isAnonymous");
        if let Err(e) = check_window(start_date, end_date) {
            r.push(e);
        }
        r.finish()?;

        Ok(Self {
            company_id: present(company_id, "companyId")?,
            title: present(title, "title")?,
            description,
            survey_type: present(survey_type, "type")?,
            start_date,
            end_date,
            is_anonymous: is_anonymous.unwrap_or(false),
        })
    }
}

/// A validated partial update for a survey
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub survey_type: Option<SurveyType>,
    pub status: Option<SurveyStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_anonymous: Option<bool>,
}

impl SurveyChanges {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Update);
        let changes = Self {
            title: r.string("title", Presence::Optional, limits::TITLE_MAX_LENGTH),
            description: r.string("description", Presence::Optional, limits::DESCRIPTION_MAX_LENGTH),
            survey_type: r.enumerated::<SurveyType>("type", Presence::Optional),
            status: r.enumerated::<SurveyStatus>("status", Presence::Optional),
            start_date: r.datetime("startDate", Presence::Optional),
            end_date: r.end_datetime("endDate", Presence::Optional),
            is_anonymous: r.boolean("isAnonymous"),
        };
        if let Err(e) = check_window(changes.start_date, changes.end_date) {
            r.push(e);
        }
        r.finish()?;
        Ok(changes)
    }
}

/// Why a survey update or response was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Survey is not accepting responses: {0}")]
    Closed(String),
}

/// Survey aggregate
///
/// # Invariants
/// - `end_date >= start_date` when both are set
/// - Responses are accepted only while ACTIVE and inside the date window
/// - Anonymous surveys never record who responded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    id: Uuid,
    company_id: Uuid,
    title: String,
    description: Option<String>,
    #[serde(rename = "type")]
    survey_type: SurveyType,
    status: SurveyStatus,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    is_anonymous: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Survey {
    pub fn new(new_survey: NewSurvey) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id: new_survey.company_id,
            title: new_survey.title,
            description: new_survey.description,
            survey_type: new_survey.survey_type,
            status: SurveyStatus::Draft,
            start_date: new_survey.start_date,
            end_date: new_survey.end_date,
            is_anonymous: new_survey.is_anonymous,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition_to(&mut self, next: SurveyStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError::new("survey", self.status, next));
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    /// Applies a validated partial update against the merged date window
    ///
    /// Nothing is changed if the update is refused.
    pub fn apply(&mut self, changes: SurveyChanges) -> Result<(), SurveyError> {
        let start_date = changes.start_date.or(self.start_date);
        let end_date = changes.end_date.or(self.end_date);
        check_window(start_date, end_date).map_err(ValidationErrors::from)?;

        if let Some(next) = changes.status {
            if next != self.status {
                self.transition_to(next)?;
            }
        }
        self.start_date = start_date;
        self.end_date = end_date;
        if let Some(title) = changes.title {
            self.title = title;
        }
        if changes.description.is_some() {
            self.description = changes.description;
        }
        if let Some(survey_type) = changes.survey_type {
            self.survey_type = survey_type;
        }
        if let Some(is_anonymous) = changes.is_anonymous {
            self.is_anonymous = is_anonymous;
        }
        self.touch();
        Ok(())
    }

    /// Records an answer set from `respondent_id`
    ///
    /// `answers` must be a JSON object. The respondent is dropped for
    /// anonymous surveys.
    pub fn accept_response(
        &self,
        respondent_id: Uuid,
        answers: Value,
        at: DateTime<Utc>,
    ) -> Result<SurveyResponse, SurveyError> {
        if self.status != SurveyStatus::Active {
            return Err(SurveyError::Closed(format!("status is {}", self.status)));
        }
        if self.start_date.is_some_and(|start| at < start) {
            return Err(SurveyError::Closed("survey has not started yet".to_string()));
        }
        if self.end_date.is_some_and(|end| at > end) {
            return Err(SurveyError::Closed("survey has ended".to_string()));
        }
        if !answers.is_object() {
            return Err(ValidationErrors::single(ValidationError::invalid_format("answers", "object")).into());
        }

        Ok(SurveyResponse {
            id: Uuid::new_v4(),
            survey_id: self.id,
            respondent_id: if self.is_anonymous {
                None
            } else {
                Some(respondent_id)
            },
            answers,
            submitted_at: at,
        })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn company_id(&self) -> Uuid {
        self.company_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn survey_type(&self) -> SurveyType {
        self.survey_type
    }

    pub fn status(&self) -> SurveyStatus {
        self.status
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reconstructs a Survey from persistence layer data
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        company_id: Uuid,
        title: String,
        description: Option<String>,
        survey_type: SurveyType,
        status: SurveyStatus,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        is_anonymous: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            company_id,
            title,
            description,
            survey_type,
            status,
            start_date,
            end_date,
            is_anonymous,
            created_at,
            updated_at,
        }
    }
}

/// One submitted answer set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub id: Uuid,
    pub survey_id: Uuid,
    pub respondent_id: Option<Uuid>,
    pub answers: Value,
    pub submitted_at: DateTime<Utc>,
}
