//! Aggregating validation of inbound entity payloads
//!
//! Every entity's `from_payload` constructor reads its fields through a
//! [`PayloadReader`], which collects all violations instead of stopping at
//! the first. [`validate`] and [`validate_changes`] dispatch on
//! [`EntityKind`] for callers that hold an untyped JSON value.

pub mod errors;
pub mod reader;

pub use errors::{LengthConstraint, ValidationError, ValidationErrors};
pub use reader::{Mode, PayloadReader, Presence};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::company::{CompanyChanges, NewCompany};
use crate::domain::esg_metric::{EsgMetricChanges, NewEsgMetric};
use crate::domain::report::{NewReport, ReportChanges};
use crate::domain::survey::{NewSurvey, SurveyChanges};
use crate::domain::task::{NewTask, TaskChanges};
use crate::domain::user::{NewUser, UserChanges};

/// The entity a payload describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    User,
    Company,
    EsgMetric,
    Report,
    Survey,
    Task,
}

/// A create payload that passed validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedEntity {
    User(NewUser),
    Company(NewCompany),
    EsgMetric(NewEsgMetric),
    Report(NewReport),
    Survey(NewSurvey),
    Task(NewTask),
}

/// An update payload that passed validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedChanges {
    User(UserChanges),
    Company(CompanyChanges),
    EsgMetric(EsgMetricChanges),
    Report(ReportChanges),
    Survey(SurveyChanges),
    Task(TaskChanges),
}

/// Checks that a payload is a JSON object
pub fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    payload
        .as_object()
        .ok_or_else(|| ValidationErrors::single(ValidationError::invalid_format("body", "JSON object")))
}

/// Validates a create payload for `kind`, enforcing required fields
///
/// # Example
/// ```
/// use esg_platform_api::domain::validation::{validate, EntityKind};
/// use serde_json::json;
///
/// let errors = validate(&json!({ "lastName": "Nowak" }), EntityKind::User).unwrap_err();
/// assert_eq!(errors.missing_fields(), vec!["email", "firstName", "companyId", "password"]);
/// ```
pub fn validate(payload: &Value, kind: EntityKind) -> Result<ValidatedEntity, ValidationErrors> {
    let payload = as_object(payload)?;
    Ok(match kind {
        EntityKind::User => ValidatedEntity::User(NewUser::from_payload(payload)?),
        EntityKind::Company => ValidatedEntity::Company(NewCompany::from_payload(payload)?),
        EntityKind::EsgMetric => ValidatedEntity::EsgMetric(NewEsgMetric::from_payload(payload)?),
        EntityKind::Report => ValidatedEntity::Report(NewReport::from_payload(payload)?),
        EntityKind::Survey => ValidatedEntity::Survey(NewSurvey::from_payload(payload)?),
        EntityKind::Task => ValidatedEntity::Task(NewTask::from_payload(payload)?),
    })
}

/// Validates a partial update for `kind`; only present fields are checked
pub fn validate_changes(payload: &Value, kind: EntityKind) -> Result<ValidatedChanges, ValidationErrors> {
    let payload = as_object(payload)?;
    Ok(match kind {
        EntityKind::User => ValidatedChanges::User(UserChanges::from_payload(payload)?),
        EntityKind::Company => ValidatedChanges::Company(CompanyChanges::from_payload(payload)?),
        EntityKind::EsgMetric => ValidatedChanges::EsgMetric(EsgMetricChanges::from_payload(payload)?),
        EntityKind::Report => ValidatedChanges::Report(ReportChanges::from_payload(payload)?),
        EntityKind::Survey => ValidatedChanges::Survey(SurveyChanges::from_payload(payload)?),
        EntityKind::Task => ValidatedChanges::Task(TaskChanges::from_payload(payload)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn valid_payloads_pass_for_every_kind() {
        let company_id = Uuid::new_v4().to_string();
        let user_id = Uuid::new_v4().to_string();
        let cases = [
            (
                EntityKind::User,
                json!({
                    "email": "anna@example.com",
                    "firstName": "Anna",
                    "lastName": "Kowalska",
                    "companyId": company_id,
                    "password": "correct-horse"
                }),
            ),
            (
                EntityKind::Company,
                json!({
                    "name": "Acme",
                    "nip": "5260250274",
                    "industry": "Technology",
                    "size": "SMALL",
                    "street": "Prosta 1",
                    "city": "Kraków",
                    "postalCode": "30-001",
                    "country": "Poland"
                }),
            ),
            (
                EntityKind::EsgMetric,
                json!({
                    "companyId": company_id,
                    "category": "ENVIRONMENTAL",
                    "type": "SCOPE_1",
                    "name": "Direct emissions",
                    "value": 12.5,
                    "unit": "tCO2e",
                    "period": "2024"
                }),
            ),
            (
                EntityKind::Report,
                json!({
                    "companyId": company_id,
                    "title": "Annual sustainability report",
                    "type": "SUSTAINABILITY",
                    "framework": "GRI",
                    "period": "2024"
                }),
            ),
            (
                EntityKind::Survey,
                json!({
                    "companyId": company_id,
                    "title": "Pulse",
                    "type": "CUSTOM",
                    "startDate": "2024-05-01",
                    "endDate": "2024-06-01"
                }),
            ),
            (
                EntityKind::Task,
                json!({
                    "companyId": company_id,
                    "title": "Collect invoices",
                    "assignedToId": user_id
                }),
            ),
        ];

        for (kind, payload) in cases {
            assert!(validate(&payload, kind).is_ok(), "{:?} payload should validate", kind);
        }
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let errors = validate(&json!({ "lastName": "Nowak" }), EntityKind::User).unwrap_err();
        let missing = errors.missing_fields();
        assert!(missing.contains(&"email"));
        assert!(missing.contains(&"firstName"));
    }

    #[test]
    fn non_object_payload_is_invalid_format() {
        let errors = validate(&json!([1, 2, 3]), EntityKind::Company).unwrap_err();
        assert!(matches!(&errors.errors()[0], ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn unknown_enum_value_lists_allowed_values() {
        let payload = json!({ "priority": "CRITICAL" });
        let errors = validate_changes(&payload, EntityKind::Task).unwrap_err();
        match &errors.errors()[0] {
            ValidationError::NotAllowed { field, allowed_values } => {
                assert_eq!(field, "priority");
                assert_eq!(allowed_values.len(), 4);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn updates_only_check_present_fields() {
        assert!(validate_changes(&json!({ "title": "New title" }), EntityKind::Survey).is_ok());
        assert!(validate_changes(&json!({}), EntityKind::Company).is_ok());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let payload = json!({ "title": "x", "favouriteColour": "green" });
        assert!(validate_changes(&payload, EntityKind::Task).is_ok());
    }

    #[test]
    fn survey_window_is_cross_checked() {
        let payload = json!({
            "companyId": Uuid::new_v4().to_string(),
            "title": "Pulse",
            "type": "CUSTOM",
            "startDate": "2024-06-01",
            "endDate": "2024-05-01"
        });
        let errors = validate(&payload, EntityKind::Survey).unwrap_err();
        assert!(matches!(&errors.errors()[0], ValidationError::CrossField { .. }));
    }
}
