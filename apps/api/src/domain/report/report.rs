use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::content::ReportContent;
use super::value_objects::{ReportStatus, ReportType};
use crate::domain::catalog::{limits, Framework};
use crate::domain::errors::TransitionError;
use crate::domain::validation::reader::{present, Mode, PayloadReader, Presence};
use crate::domain::validation::{ValidationError, ValidationErrors};

/// Parses report content and checks it matches the report type
fn read_content(r: &mut PayloadReader<'_>, report_type: Option<ReportType>) -> Option<ReportContent> {
    let raw = r.object("content", Presence::Optional)?;
    let content: ReportContent = match serde_json::from_value(raw) {
        Ok(content) => content,
        Err(_) => {
            r.push(ValidationError::invalid_format("content", "report content"));
            return None;
        }
    };
    if let Some(report_type) = report_type {
        if content.report_type() != report_type {
            r.push(ValidationError::cross_field(
                &["type", "content"],
                format!(
                    "content of kind {} does not match report type {}",
                    content.report_type(),
                    report_type
                ),
            ));
            return None;
        }
    }
    Some(content)
}

fn read_file_url(r: &mut PayloadReader<'_>) -> Option<String> {
    let url = r.string("fileUrl", Presence::Optional, limits::URL_MAX_LENGTH)?;
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/') {
        Some(url)
    } else {
        r.push(ValidationError::invalid_format("fileUrl", "URL"));
        None
    }
}

/// A validated payload for creating a report by hand
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub company_id: Uuid,
    pub title: String,
    pub report_type: ReportType,
    pub framework: Option<Framework>,
    pub period: String,
    pub content: Option<ReportContent>,
    pub file_url: Option<String>,
}

impl NewReport {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Create);
        let company_id = r.uuid("companyId", Presence::Required);
        let title = r.string("title", Presence::Required, limits::TITLE_MAX_LENGTH);
        let report_type = r.enumerated::<ReportType>("type", Presence::Required);
        let framework = r.enumerated::<Framework>("framework", Presence::Optional);
        let period = r.string("period", Presence::Required, limits::PERIOD_MAX_LENGTH);
        let content = read_content(&mut r, report_type);
        let file_url = read_file_url(&mut r);
        if let Some(status) = r.enumerated::<ReportStatus>("status", Presence::Optional) {
            if status != ReportStatus::Draft {
                r.push(ValidationError::cross_field(
                    &["status"],
                    "new reports always start as DRAFT",
                ));
            }
        }
        r.finish()?;

        Ok(Self {
            company_id: present(company_id, "companyId")?,
            title: present(title, "title")?,
            report_type: present(report_type, "type")?,
            framework,
            period: present(period, "period")?,
            content,
            file_url,
        })
    }
}

/// A validated partial update for a report
///
/// The report type is fixed at creation because content is keyed by it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportChanges {
    pub title: Option<String>,
    pub framework: Option<Framework>,
    pub period: Option<String>,
    pub status: Option<ReportStatus>,
    pub content: Option<ReportContent>,
    pub file_url: Option<String>,
}

impl ReportChanges {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Update);
        if r.is_present("type") {
            r.push(ValidationError::cross_field(
                &["type"],
                "report type cannot be changed after creation",
            ));
        }
        let changes = Self {
            title: r.string("title", Presence::Optional, limits::TITLE_MAX_LENGTH),
            framework: r.enumerated::<Framework>("framework", Presence::Optional),
            period: r.string("period", Presence::Optional, limits::PERIOD_MAX_LENGTH),
            status: r.enumerated::<ReportStatus>("status", Presence::Optional),
            content: read_content(&mut r, None),
            file_url: read_file_url(&mut r),
        };
        r.finish()?;
        Ok(changes)
    }
}

/// Why a report update was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportUpdateError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Report aggregate root
///
/// # Invariants
/// - Status only moves forward one step, or to ARCHIVED from any live state
/// - `published_at` is set exactly when the report reaches PUBLISHED
/// - Content, when present, matches the report type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    id: Uuid,
    company_id: Uuid,
    title: String,
    #[serde(rename = "type")]
    report_type: ReportType,
    framework: Option<Framework>,
    period: String,
    status: ReportStatus,
    content: Option<ReportContent>,
    file_url: Option<String>,
    published_at: Option<DateTime<Utc>>,
    created_by_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Report {
    /// Creates a DRAFT report authored by `created_by_id`
    pub fn new(new_report: NewReport, created_by_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id: new_report.company_id,
            title: new_report.title,
            report_type: new_report.report_type,
            framework: new_report.framework,
            period: new_report.period,
            status: ReportStatus::Draft,
            content: new_report.content,
            file_url: new_report.file_url,
            published_at: None,
            created_by_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the report to `next` if the lifecycle allows it
    ///
    /// Reaching PUBLISHED stamps `published_at`.
    pub fn transition_to(&mut self, next: ReportStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError::new("report", self.status, next));
        }
        self.status = next;
        if next == ReportStatus::Published {
            self.published_at = Some(Utc::now());
        }
        self.touch();
        Ok(())
    }

    /// Applies a validated partial update, including any status change
    ///
    /// Nothing is changed if the update is refused.
    pub fn apply(&mut self, changes: ReportChanges) -> Result<(), ReportUpdateError> {
        if let Some(content) = &changes.content {
            if content.report_type() != self.report_type {
                return Err(ValidationErrors::single(ValidationError::cross_field(
                    &["type", "content"],
                    format!(
                        "content of kind {} does not match report type {}",
                        content.report_type(),
                        self.report_type
                    ),
                ))
                .into());
            }
        }
        if let Some(next) = changes.status {
            if next != self.status {
                self.transition_to(next)?;
            }
        }
        if let Some(title) = changes.title {
            self.title = title;
        }
        if changes.framework.is_some() {
            self.framework = changes.framework;
        }
        if let Some(period) = changes.period {
            self.period = period;
        }
        if changes.content.is_some() {
            self.content = changes.content;
        }
        if changes.file_url.is_some() {
            self.file_url = changes.file_url;
        }
        self.touch();
        Ok(())
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

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    pub fn framework(&self) -> Option<Framework> {
        self.framework
    }

    pub fn period(&self) -> &str {
        &self.period
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn content(&self) -> Option<&ReportContent> {
        self.content.as_ref()
    }

    pub fn file_url(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn created_by_id(&self) -> Uuid {
        self.created_by_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reconstructs a Report from persistence layer data
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        company_id: Uuid,
        title: String,
        report_type: ReportType,
        framework: Option<Framework>,
        period: String,
        status: ReportStatus,
        content: Option<ReportContent>,
        file_url: Option<String>,
        published_at: Option<DateTime<Utc>>,
        created_by_id: Uuid,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            company_id,
            title,
            report_type,
            framework,
            period,
            status,
            content,
            file_url,
            published_at,
            created_by_id,
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
            "companyId": Uuid::new_v4().to_string(),
            "title": "Sustainability Report 2024",
            "type": "SUSTAINABILITY",
            "framework": "GRI",
            "period": "2024"
        }))
    }

    fn draft() -> Report {
        Report::new(NewReport::from_payload(&valid_payload()).unwrap(), Uuid::new_v4())
    }

    #[test]
    fn new_report_starts_as_draft() {
        let report = draft();
        assert_eq!(report.status(), ReportStatus::Draft);
        assert_eq!(report.framework(), Some(Framework::Gri));
        assert!(report.published_at().is_none());
    }

    #[test]
    fn long_title_is_rejected() {
        let mut body = valid_payload();
        body.insert("title".into(), json!("t".repeat(201)));
        let errors = NewReport::from_payload(&body).unwrap_err();
        assert_eq!(errors.errors()[0], ValidationError::too_long("title", 200));
    }

    #[test]
    fn unknown_framework_is_rejected() {
        let mut body = valid_payload();
        body.insert("framework".into(), json!("ISO14001"));
        assert!(NewReport::from_payload(&body).unwrap_err().has_field("framework"));
    }

    #[test]
    fn creating_with_non_draft_status_is_rejected() {
        let mut body = valid_payload();
        body.insert("status".into(), json!("PUBLISHED"));
        assert!(NewReport::from_payload(&body).unwrap_err().has_field("status"));
    }

    #[test]
    fn content_kind_must_match_type() {
        let mut body = valid_payload();
        body.insert("content".into(), json!({ "kind": "CUSTOM", "data": {} }));
        let errors = NewReport::from_payload(&body).unwrap_err();
        assert!(errors.has_field("content"));
    }

    #[test]
    fn matching_custom_content_is_accepted() {
        let mut body = valid_payload();
        body.insert("type".into(), json!("CUSTOM"));
        body.insert("content".into(), json!({ "kind": "CUSTOM", "data": { "sections": { "a": 1 } } }));
        let new_report = NewReport::from_payload(&body).unwrap();
        assert!(matches!(new_report.content, Some(ReportContent::Custom(_))));
    }

    #[test]
    fn full_lifecycle_to_publication() {
        let mut report = draft();
        report.transition_to(ReportStatus::Review).unwrap();
        report.transition_to(ReportStatus::Approved).unwrap();
        report.transition_to(ReportStatus::Published).unwrap();

        assert_eq!(report.status(), ReportStatus::Published);
        assert!(report.published_at().is_some());
    }

    #[test]
    fn cannot_skip_to_published() {
        let mut report = draft();
        let err = report.transition_to(ReportStatus::Published).unwrap_err();
        assert_eq!(err.from, "DRAFT");
        assert_eq!(err.to, "PUBLISHED");
        assert_eq!(report.status(), ReportStatus::Draft);
    }

    #[test]
    fn cannot_move_backward() {
        let mut report = draft();
        report.transition_to(ReportStatus::Review).unwrap();
        assert!(report.transition_to(ReportStatus::Draft).is_err());
    }

    #[test]
    fn draft_can_be_archived() {
        let mut report = draft();
        report.transition_to(ReportStatus::Archived).unwrap();
        assert_eq!(report.status(), ReportStatus::Archived);
    }

    #[test]
    fn apply_with_invalid_status_leaves_report_unchanged() {
        let mut report = draft();
        let changes = ReportChanges::from_payload(&payload(json!({
            "title": "Renamed",
            "status": "APPROVED"
        })))
        .unwrap();

        assert!(matches!(report.apply(changes), Err(ReportUpdateError::Transition(_))));
        assert_eq!(report.title(), "Sustainability Report 2024");
    }

    #[test]
    fn changing_type_is_rejected() {
        let errors = ReportChanges::from_payload(&payload(json!({ "type": "CUSTOM" }))).unwrap_err();
        assert!(errors.has_field("type"));
    }

    #[test]
    fn serializes_type_and_status() {
        let json = serde_json::to_value(draft()).unwrap();
        assert_eq!(json["type"], "SUSTAINABILITY");
        assert_eq!(json["status"], "DRAFT");
        assert_eq!(json["framework"], "GRI");
        assert!(json["createdById"].is_string());
    }
}
