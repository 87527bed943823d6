use serde::{Deserialize, Serialize};

use crate::domain::catalog::{display_as_str, Enumerated};

/// Topic of a survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "survey_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurveyType {
    EmployeeSatisfaction,
    DiversityInclusion,
    WorkplaceSafety,
    EthicsCompliance,
    Custom,
}

impl Enumerated for SurveyType {
    const ALL: &'static [Self] = &[
        SurveyType::EmployeeSatisfaction,
        SurveyType::DiversityInclusion,
        SurveyType::WorkplaceSafety,
        SurveyType::EthicsCompliance,
        SurveyType::Custom,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            SurveyType::EmployeeSatisfaction => "EMPLOYEE_SATISFACTION",
            SurveyType::DiversityInclusion => "DIVERSITY_INCLUSION",
            SurveyType::WorkplaceSafety => "WORKPLACE_SAFETY",
            SurveyType::EthicsCompliance => "ETHICS_COMPLIANCE",
            SurveyType::Custom => "CUSTOM",
        }
    }
}

/// Represents the lifecycle status of a survey
///
/// # Status Transitions
/// ```text
/// Draft -> Active -> Completed
///   └--------└----------└-----> Archived
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "survey_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurveyStatus {
    Draft,
    Active,
    Completed,
    Archived,
}

impl SurveyStatus {
    /// Checks if a transition from current status to next status is valid
    pub fn can_transition_to(&self, next: SurveyStatus) -> bool {
        use SurveyStatus::*;
        matches!(
            (self, next),
            (Draft, Active) | (Active, Completed) | (Draft | Active | Completed, Archived)
        )
    }
}

impl Enumerated for SurveyStatus {
    const ALL: &'static [Self] = &[
        SurveyStatus::Draft,
        SurveyStatus::Active,
        SurveyStatus::Completed,
        SurveyStatus::Archived,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            SurveyStatus::Draft => "DRAFT",
            SurveyStatus::Active => "ACTIVE",
            SurveyStatus::Completed => "COMPLETED",
            SurveyStatus::Archived => "ARCHIVED",
        }
    }
}

display_as_str!(SurveyType, SurveyStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        assert!(SurveyStatus::Draft.can_transition_to(SurveyStatus::Active));
        assert!(SurveyStatus::Active.can_transition_to(SurveyStatus::Completed));
        assert!(SurveyStatus::Completed.can_transition_to(SurveyStatus::Archived));
        assert!(SurveyStatus::Draft.can_transition_to(SurveyStatus::Archived));
    }

    #[test]
    fn invalid_transitions() {
        assert!(!SurveyStatus::Draft.can_transition_to(SurveyStatus::Completed));
        assert!(!SurveyStatus::Completed.can_transition_to(SurveyStatus::Active));
        assert!(!SurveyStatus::Archived.can_transition_to(SurveyStatus::Draft));
    }

    #[test]
    fn type_wire_names() {
        assert_eq!(SurveyType::parse("WORKPLACE_SAFETY"), Some(SurveyType::WorkplaceSafety));
        assert_eq!(SurveyType::EthicsCompliance.to_string(), "ETHICS_COMPLIANCE");
    }
}
