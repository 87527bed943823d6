use serde::{Deserialize, Serialize};

use crate::domain::catalog::{display_as_str, Enumerated, UnitFamily};

/// ESG pillar a metric reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "esg_category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EsgCategory {
    Environmental,
    Social,
    Governance,
}

impl EsgCategory {
    /// Unit families a metric of this category may be measured in
    ///
    /// Environmental metrics may use physical units; social and governance
    /// metrics are dimensionless.
    pub fn allowed_families(&self) -> &'static [UnitFamily] {
        match self {
            EsgCategory::Environmental => UnitFamily::ALL,
            EsgCategory::Social | EsgCategory::Governance => &[
                UnitFamily::Percentage,
                UnitFamily::Count,
                UnitFamily::Ratio,
                UnitFamily::Score,
            ],
        }
    }

    /// Returns true if `unit` belongs to a family this category accepts
    pub fn accepts_unit(&self, unit: &str) -> bool {
        UnitFamily::of_unit(unit)
            .iter()
            .any(|family| self.allowed_families().contains(family))
    }
}

impl Enumerated for EsgCategory {
    const ALL: &'static [Self] = &[
        EsgCategory::Environmental,
        EsgCategory::Social,
        EsgCategory::Governance,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            EsgCategory::Environmental => "ENVIRONMENTAL",
            EsgCategory::Social => "SOCIAL",
            EsgCategory::Governance => "GOVERNANCE",
        }
    }
}

display_as_str!(EsgCategory);
