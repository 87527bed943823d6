use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::value_objects::ReportType;
use crate::domain::esg_metric::{EsgCategory, EsgMetric};
use crate::domain::reporting::aggregation::{CategoryAggregate, CategoryTotal};

/// One metric as it appears inside a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricLine {
    pub metric_id: Uuid,
    pub category: EsgCategory,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub name: String,
    pub value: Decimal,
    pub unit: String,
    pub verified: bool,
}

impl From<&EsgMetric> for MetricLine {
    fn from(metric: &EsgMetric) -> Self {
        Self {
            metric_id: metric.id(),
            category: metric.category(),
            metric_type: metric.metric_type().to_string(),
            name: metric.name().to_string(),
            value: metric.value(),
            unit: metric.unit().to_string(),
            verified: metric.verified(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityContent {
    pub summary: CategoryAggregate,
    pub metrics: Vec<MetricLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardContent {
    pub summary: CategoryAggregate,
    /// Share of verified metrics, in percent with two decimal places
    pub verified_share: Decimal,
    pub metrics: Vec<MetricLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonFootprintContent {
    /// All carbon metrics normalized to tonnes of CO2 equivalent
    pub total_tco2e: Decimal,
    pub metrics: Vec<MetricLine>,
}

/// Content focused on a single ESG category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryContent {
    pub category: EsgCategory,
    pub summary: CategoryTotal,
    pub metrics: Vec<MetricLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomContent {
    #[serde(default)]
    pub metrics: Vec<MetricLine>,
    /// Free-form sections supplied by the report author
    #[serde(default)]
    pub sections: Map<String, Value>,
}

/// Structured report body, tagged by the kind of report it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportContent {
    Sustainability(SustainabilityContent),
    EsgScorecard(ScorecardContent),
    CarbonFootprint(CarbonFootprintContent),
    DiversityInclusion(CategoryContent),
    Governance(CategoryContent),
    Custom(CustomContent),
}

impl ReportContent {
    /// The report type this content belongs to
    pub fn report_type(&self) -> ReportType {
        match self {
            ReportContent::Sustainability(_) => ReportType::Sustainability,
            ReportContent::EsgScorecard(_) => ReportType::EsgScorecard,
            ReportContent::CarbonFootprint(_) => ReportType::CarbonFootprint,
            ReportContent::DiversityInclusion(_) => ReportType::DiversityInclusion,
            ReportContent::Governance(_) => ReportType::Governance,
            ReportContent::Custom(_) => ReportType::Custom,
        }
    }

    /// Metric lines carried by the content
    pub fn metrics(&self) -> &[MetricLine] {
        match self {
            ReportContent::Sustainability(c) => &c.metrics,
            ReportContent::EsgScorecard(c) => &c.metrics,
            ReportContent::CarbonFootprint(c) => &c.metrics,
            ReportContent::DiversityInclusion(c) | ReportContent::Governance(c) => &c.metrics,
            ReportContent::Custom(c) => &c.metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn custom_content_round_trips_through_json() {
        let value = json!({ "kind": "CUSTOM", "data": { "sections": { "intro": "Hello" } } });
        let content: ReportContent = serde_json::from_value(value).unwrap();

        assert_eq!(content.report_type(), ReportType::Custom);
        assert!(content.metrics().is_empty());
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let value = json!({ "kind": "QUARTERLY", "data": {} });
        assert!(serde_json::from_value::<ReportContent>(value).is_err());
    }

    #[test]
    fn carbon_content_serializes_with_kind_tag() {
        let content = ReportContent::CarbonFootprint(CarbonFootprintContent {
            total_tco2e: Decimal::new(15, 1),
            metrics: Vec::new(),
        });
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["kind"], "CARBON_FOOTPRINT");
        assert_eq!(json["data"]["totalTco2e"], 1.5);
    }
}
