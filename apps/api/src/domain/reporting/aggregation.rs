use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ReportingError;
use crate::domain::catalog::Enumerated;
use crate::domain::esg_metric::{EsgCategory, EsgMetric};

/// Sum of one category's metric values
///
/// Unverified metrics are included in `total` and flagged through
/// `unverified_count` / `includes_unverified`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub total: Decimal,
    pub metric_count: usize,
    pub unverified_count: usize,
    pub includes_unverified: bool,
}

impl CategoryTotal {
    fn add(&mut self, metric: &EsgMetric) -> Result<(), ReportingError> {
        self.total = self
            .total
            .checked_add(metric.value())
            .ok_or(ReportingError::Overflow(metric.category().as_str()))?;
        self.metric_count += 1;
        if !metric.verified() {
            self.unverified_count += 1;
            self.includes_unverified = true;
        }
        Ok(())
    }
}

/// Per-category totals for one company and reporting period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAggregate {
    pub company_id: Uuid,
    pub period: String,
    #[serde(rename = "ENVIRONMENTAL")]
    pub environmental: CategoryTotal,
    #[serde(rename = "SOCIAL")]
    pub social: CategoryTotal,
    #[serde(rename = "GOVERNANCE")]
    pub governance: CategoryTotal,
}

impl CategoryAggregate {
    fn empty(company_id: Uuid, period: &str) -> Self {
        Self {
            company_id,
            period: period.to_string(),
            environmental: CategoryTotal::default(),
            social: CategoryTotal::default(),
            governance: CategoryTotal::default(),
        }
    }

    pub fn get(&self, category: EsgCategory) -> &CategoryTotal {
        match category {
            EsgCategory::Environmental => &self.environmental,
            EsgCategory::Social => &self.social,
            EsgCategory::Governance => &self.governance,
        }
    }

    fn get_mut(&mut self, category: EsgCategory) -> &mut CategoryTotal {
        match category {
            EsgCategory::Environmental => &mut self.environmental,
            EsgCategory::Social => &mut self.social,
            EsgCategory::Governance => &mut self.governance,
        }
    }

    /// Number of metrics that contributed to any category
    pub fn metric_count(&self) -> usize {
        self.environmental.metric_count + self.social.metric_count + self.governance.metric_count
    }

    pub fn unverified_count(&self) -> usize {
        self.environmental.unverified_count
            + self.social.unverified_count
            + self.governance.unverified_count
    }
}

/// Sums metric values by category for one company and period
///
/// Metrics for other companies or periods are ignored. An empty selection
/// yields zero totals for all three categories.
///
/// # Errors
/// - `Overflow` if a category total exceeds the decimal range
///
/// # Example
/// ```
/// use esg_platform_api::domain::reporting::aggregate_by_category;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let summary = aggregate_by_category(&[], Uuid::new_v4(), "2024").unwrap();
/// assert_eq!(summary.environmental.total, Decimal::ZERO);
/// assert_eq!(summary.metric_count(), 0);
/// ```
pub fn aggregate_by_category(
    metrics: &[EsgMetric],
    company_id: Uuid,
    period: &str,
) -> Result<CategoryAggregate, ReportingError> {
    let mut aggregate = CategoryAggregate::empty(company_id, period);
    for metric in metrics
        .iter()
        .filter(|m| m.company_id() == company_id && m.period() == period)
    {
        aggregate.get_mut(metric.category()).add(metric)?;
    }
    Ok(aggregate)
}

/// Converts a carbon quantity to tonnes of CO2 equivalent
///
/// Returns `None` for units outside the carbon family.
pub fn to_tonnes_co2e(value: Decimal, unit: &str) -> Option<Decimal> {
    match unit {
        "tCO2e" => Some(value),
        "kgCO2e" => Some(value / Decimal::from(1_000)),
        "gCO2e" => Some(value / Decimal::from(1_000_000)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::esg_metric::NewEsgMetric;

    fn metric(
        company_id: Uuid,
        category: EsgCategory,
        value: Decimal,
        unit: &str,
        period: &str,
        verified: bool,
    ) -> EsgMetric {
        EsgMetric::new(NewEsgMetric {
            company_id,
            category,
            metric_type: "TEST".into(),
            name: "Test metric".into(),
            value,
            unit: unit.into(),
            period: period.into(),
            source: None,
            verified,
            notes: None,
        })
    }

    #[test]
    fn sums_by_category() {
        let company = Uuid::new_v4();
        let metrics = vec![
            metric(company, EsgCategory::Environmental, Decimal::new(105, 1), "tCO2e", "2024", true),
            metric(company, EsgCategory::Environmental, Decimal::new(2, 0), "tCO2e", "2024", true),
            metric(company, EsgCategory::Social, Decimal::new(40, 0), "%", "2024", true),
            metric(company, EsgCategory::Governance, Decimal::new(7, 0), "score", "2024", true),
        ];

        let summary = aggregate_by_category(&metrics, company, "2024").unwrap();
        assert_eq!(summary.environmental.total, Decimal::new(125, 1));
        assert_eq!(summary.environmental.metric_count, 2);
        assert_eq!(summary.social.total, Decimal::from(40));
        assert_eq!(summary.governance.total, Decimal::from(7));
        assert_eq!(summary.metric_count(), 4);
    }

    #[test]
    fn ignores_other_companies_and_periods() {
        let company = Uuid::new_v4();
        let metrics = vec![
            metric(company, EsgCategory::Social, Decimal::ONE, "count", "2024", true),
            metric(company, EsgCategory::Social, Decimal::TEN, "count", "2023", true),
            metric(Uuid::new_v4(), EsgCategory::Social, Decimal::TEN, "count", "2024", true),
        ];

        let summary = aggregate_by_category(&metrics, company, "2024").unwrap();
        assert_eq!(summary.social.total, Decimal::ONE);
        assert_eq!(summary.metric_count(), 1);
    }

    #[test]
    fn unverified_metrics_are_included_and_flagged() {
        let company = Uuid::new_v4();
        let metrics = vec![
            metric(company, EsgCategory::Social, Decimal::ONE, "count", "2024", true),
            metric(company, EsgCategory::Social, Decimal::ONE, "count", "2024", false),
        ];

        let summary = aggregate_by_category(&metrics, company, "2024").unwrap();
        assert_eq!(summary.social.total, Decimal::TWO);
        assert_eq!(summary.social.unverified_count, 1);
        assert!(summary.social.includes_unverified);
        assert!(!summary.environmental.includes_unverified);
    }

    #[test]
    fn empty_input_yields_zeros() {
        let company = Uuid::new_v4();
        let summary = aggregate_by_category(&[], company, "2024").unwrap();
        for category in [EsgCategory::Environmental, EsgCategory::Social, EsgCategory::Governance] {
            assert_eq!(summary.get(category).total, Decimal::ZERO);
            assert_eq!(summary.get(category).metric_count, 0);
        }
    }

    #[test]
    fn aggregation_is_idempotent_and_order_independent() {
        let company = Uuid::new_v4();
        let mut metrics = vec![
            metric(company, EsgCategory::Environmental, Decimal::new(1, 1), "tCO2e", "2024", true),
            metric(company, EsgCategory::Environmental, Decimal::new(2, 1), "tCO2e", "2024", false),
            metric(company, EsgCategory::Environmental, Decimal::new(3, 1), "tCO2e", "2024", true),
        ];

        let first = aggregate_by_category(&metrics, company, "2024").unwrap();
        let second = aggregate_by_category(&metrics, company, "2024").unwrap();
        metrics.reverse();
        let reversed = aggregate_by_category(&metrics, company, "2024").unwrap();

        assert_eq!(first, second);
        assert_eq!(first, reversed);
        assert_eq!(first.environmental.total, Decimal::new(6, 1));
    }

    #[test]
    fn serializes_category_keys_in_upper_case() {
        let summary = aggregate_by_category(&[], Uuid::new_v4(), "2024").unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["ENVIRONMENTAL"]["metricCount"], 0);
        assert_eq!(json["SOCIAL"]["includesUnverified"], false);
        assert_eq!(json["period"], "2024");
    }

    #[test]
    fn overflowing_category_total_is_an_error() {
        let company = Uuid::new_v4();
        let near_max = Decimal::MAX - Decimal::ONE;
        let metrics = vec![
            metric(company, EsgCategory::Environmental, near_max, "tCO2e", "2024", true),
            metric(company, EsgCategory::Environmental, near_max, "tCO2e", "2024", true),
        ];

        let result = aggregate_by_category(&metrics, company, "2024");
        assert!(matches!(result, Err(ReportingError::Overflow("ENVIRONMENTAL"))));
    }

    #[test]
    fn carbon_units_normalize_to_tonnes() {
        assert_eq!(to_tonnes_co2e(Decimal::from(2500), "kgCO2e"), Some(Decimal::new(25, 1)));
        assert_eq!(to_tonnes_co2e(Decimal::from(3), "tCO2e"), Some(Decimal::from(3)));
        assert_eq!(to_tonnes_co2e(Decimal::from(1), "kWh"), None);
    }
}
