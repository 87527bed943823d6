use rust_decimal::Decimal;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::aggregation::{aggregate_by_category, to_tonnes_co2e};
use super::errors::ReportingError;
use super::policy::SelectionPolicy;
use crate::domain::catalog::{limits, Enumerated, Framework};
use crate::domain::company::Company;
use crate::domain::esg_metric::{EsgCategory, EsgMetric};
use crate::domain::report::content::{
    CarbonFootprintContent, CategoryContent, CustomContent, MetricLine, ScorecardContent,
    SustainabilityContent,
};
use crate::domain::report::{NewReport, Report, ReportContent, ReportType};
use crate::domain::validation::reader::{present, Mode, PayloadReader, Presence};
use crate::domain::validation::ValidationErrors;

/// A request to derive a report from stored metrics
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReportRequest {
    pub company_id: Uuid,
    pub report_type: ReportType,
    /// Raw framework code, checked during generation
    pub framework: Option<String>,
    pub period: String,
    pub title: Option<String>,
    pub created_by_id: Uuid,
}

impl GenerateReportRequest {
    pub fn from_payload(
        payload: &Map<String, Value>,
        created_by_id: Uuid,
    ) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Create);
        let company_id = r.uuid("companyId", Presence::Required);
        let report_type = r.enumerated::<ReportType>("type", Presence::Required);
        let framework = r.string("framework", Presence::Optional, limits::PERIOD_MAX_LENGTH);
        let period = r.string("period", Presence::Required, limits::PERIOD_MAX_LENGTH);
        let title = r.string("title", Presence::Optional, limits::TITLE_MAX_LENGTH);
        r.finish()?;

        Ok(Self {
            company_id: present(company_id, "companyId")?,
            report_type: present(report_type, "type")?,
            framework,
            period: present(period, "period")?,
            title,
            created_by_id,
        })
    }
}

/// Parses an optional framework code
pub fn parse_framework(code: Option<&str>) -> Result<Option<Framework>, ReportingError> {
    code.map(|code| {
        Framework::parse(code).ok_or_else(|| ReportingError::UnknownFramework(code.to_string()))
    })
    .transpose()
}

/// Builds a DRAFT report for `company` from its metrics
///
/// `company` is authoritative: metrics belonging to other companies or
/// periods are ignored. The selection policy then narrows the metrics to the
/// ones relevant for the report type and framework.
///
/// # Errors
/// - `UnknownFramework` if the framework code is not recognized
/// - `InsufficientData` if the company has no metrics for the period or
///   none survive the selection policy
/// - `Overflow` if a summed total exceeds the decimal range
pub fn generate_report(
    request: &GenerateReportRequest,
    company: &Company,
    metrics: &[EsgMetric],
    policy: &SelectionPolicy,
) -> Result<Report, ReportingError> {
    let framework = parse_framework(request.framework.as_deref())?;
    let insufficient = || ReportingError::InsufficientData {
        company_id: company.id(),
        period: request.period.clone(),
    };

    let in_period: Vec<&EsgMetric> = metrics
        .iter()
        .filter(|m| m.company_id() == company.id() && m.period() == request.period)
        .collect();
    if in_period.is_empty() {
        return Err(insufficient());
    }

    let selected: Vec<EsgMetric> = policy
        .select(request.report_type, framework, in_period)
        .into_iter()
        .cloned()
        .collect();
    if selected.is_empty() {
        return Err(insufficient());
    }

    let content = build_content(request.report_type, company.id(), &request.period, &selected)?;
    let title = request.title.clone().unwrap_or_else(|| {
        format!("{} report {} for {}", request.report_type, request.period, company.name())
    });

    Ok(Report::new(
        NewReport {
            company_id: company.id(),
            title,
            report_type: request.report_type,
            framework,
            period: request.period.clone(),
            content: Some(content),
            file_url: None,
        },
        request.created_by_id,
    ))
}

fn build_content(
    report_type: ReportType,
    company_id: Uuid,
    period: &str,
    metrics: &[EsgMetric],
) -> Result<ReportContent, ReportingError> {
    let lines: Vec<MetricLine> = metrics.iter().map(MetricLine::from).collect();
    let summary = aggregate_by_category(metrics, company_id, period)?;

    let content = match report_type {
        ReportType::Sustainability => ReportContent::Sustainability(SustainabilityContent {
            summary,
            metrics: lines,
        }),
        ReportType::EsgScorecard => ReportContent::EsgScorecard(ScorecardContent {
            verified_share: verified_share(metrics),
            summary,
            metrics: lines,
        }),
        ReportType::CarbonFootprint => ReportContent::CarbonFootprint(CarbonFootprintContent {
            total_tco2e: total_tonnes_co2e(metrics)?,
            metrics: lines,
        }),
        ReportType::DiversityInclusion => ReportContent::DiversityInclusion(CategoryContent {
            category: EsgCategory::Social,
            summary: summary.social,
            metrics: lines,
        }),
        ReportType::Governance => ReportContent::Governance(CategoryContent {
            category: EsgCategory::Governance,
            summary: summary.governance,
            metrics: lines,
        }),
        ReportType::Custom => ReportContent::Custom(CustomContent {
            metrics: lines,
            ..CustomContent::default()
        }),
    };
    Ok(content)
}

/// Sum of the carbon metrics, in tonnes of CO2 equivalent
fn total_tonnes_co2e(metrics: &[EsgMetric]) -> Result<Decimal, ReportingError> {
    metrics
        .iter()
        .filter_map(|m| to_tonnes_co2e(m.value(), m.unit()))
        .try_fold(Decimal::ZERO, |total, tonnes| {
            total
                .checked_add(tonnes)
                .ok_or(ReportingError::Overflow(EsgCategory::Environmental.as_str()))
        })
}

/// Percentage of verified metrics, rounded to two decimal places
fn verified_share(metrics: &[EsgMetric]) -> Decimal {
    if metrics.is_empty() {
        return Decimal::ZERO;
    }
    let verified = metrics.iter().filter(|m| m.verified()).count();
    (Decimal::from(verified) * Decimal::ONE_HUNDRED / Decimal::from(metrics.len())).round_dp(2)
}
