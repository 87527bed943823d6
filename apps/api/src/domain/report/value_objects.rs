use serde::{Deserialize, Serialize};

use crate::domain::catalog::{display_as_str, Enumerated};

/// Kind of ESG report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "report_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Sustainability,
    EsgScorecard,
    CarbonFootprint,
    DiversityInclusion,
    Governance,
    Custom,
}

impl Enumerated for ReportType {
    const ALL: &'static [Self] = &[
        ReportType::Sustainability,
        ReportType::EsgScorecard,
        ReportType::CarbonFootprint,
        ReportType::DiversityInclusion,
        ReportType::Governance,
        ReportType::Custom,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            ReportType::Sustainability => "SUSTAINABILITY",
            ReportType::EsgScorecard => "ESG_SCORECARD",
            ReportType::CarbonFootprint => "CARBON_FOOTPRINT",
            ReportType::DiversityInclusion => "DIVERSITY_INCLUSION",
            ReportType::Governance => "GOVERNANCE",
            ReportType::Custom => "CUSTOM",
        }
    }
}

/// Represents the lifecycle status of a report
///
/// # Status Transitions
/// ```text
/// Draft -> Review -> Approved -> Published
///   └--------└----------└-----------└-----> Archived
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "report_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Draft,
    Review,
    Approved,
    Published,
    Archived,
}

impl ReportStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// Reports move forward one step at a time and may be archived from any
    /// state; they never move backwards.
    ///
    /// # Example
    /// ```
    /// use esg_platform_api::domain::report::value_objects::ReportStatus;
    ///
    /// assert!(ReportStatus::Draft.can_transition_to(ReportStatus::Review));
    /// assert!(!ReportStatus::Draft.can_transition_to(ReportStatus::Published));
    /// ```
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        matches!(
            (self, next),
            (Draft, Review)
                | (Review, Approved)
                | (Approved, Published)
                | (Draft | Review | Approved | Published, Archived)
        )
    }
}

impl Enumerated for ReportStatus {
    const ALL: &'static [Self] = &[
        ReportStatus::Draft,
        ReportStatus::Review,
        ReportStatus::Approved,
        ReportStatus::Published,
        ReportStatus::Archived,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "DRAFT",
            ReportStatus::Review => "REVIEW",
            ReportStatus::Approved => "APPROVED",
            ReportStatus::Published => "PUBLISHED",
            ReportStatus::Archived => "ARCHIVED",
        }
    }
}

display_as_str!(ReportType, ReportStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_steps_are_valid() {
        assert!(ReportStatus::Draft.can_transition_to(ReportStatus::Review));
        assert!(ReportStatus::Review.can_transition_to(ReportStatus::Approved));
        assert!(ReportStatus::Approved.can_transition_to(ReportStatus::Published));
    }

    #[test]
    fn archival_is_allowed_from_every_live_state() {
        for status in [
            ReportStatus::Draft,
            ReportStatus::Review,
            ReportStatus::Approved,
            ReportStatus::Published,
        ] {
            assert!(status.can_transition_to(ReportStatus::Archived));
        }
    }

    #[test]
    fn skipping_forward_is_invalid() {
        assert!(!ReportStatus::Draft.can_transition_to(ReportStatus::Approved));
        assert!(!ReportStatus::Review.can_transition_to(ReportStatus::Published));
    }

    #[test]
    fn moving_backward_is_invalid() {
        assert!(!ReportStatus::Review.can_transition_to(ReportStatus::Draft));
        assert!(!ReportStatus::Published.can_transition_to(ReportStatus::Approved));
    }

    #[test]
    fn archived_is_terminal() {
        for status in ReportStatus::ALL {
            assert!(!ReportStatus::Archived.can_transition_to(*status));
        }
    }

    #[test]
    fn status_display() {
        assert_eq!(ReportStatus::Published.to_string(), "PUBLISHED");
        assert_eq!(ReportType::EsgScorecard.to_string(), "ESG_SCORECARD");
    }
}
