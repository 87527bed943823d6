use super::errors::ReportingError;
use crate::domain::report::Report;

const HEADER: [&str; 8] = ["metricId", "category", "type", "name", "value", "unit", "verified", "period"];

/// Renders the metric lines of a report as CSV
///
/// Reports without content produce only the header row.
pub fn export_csv(report: &Report) -> Result<Vec<u8>, ReportingError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    let lines = report.content().map(|c| c.metrics()).unwrap_or_default();
    for line in lines {
        writer.write_record([
            line.metric_id.to_string(),
            line.category.to_string(),
            line.metric_type.clone(),
            line.name.clone(),
            line.value.to_string(),
            line.unit.clone(),
            line.verified.to_string(),
            report.period().to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ReportingError::Export(csv::Error::from(e.into_error())))
}

/// File name offered to clients downloading the export
pub fn export_file_name(report: &Report) -> String {
    let slug: String = report
        .title()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!("{}-{}.csv", slug, report.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::NewReport;
    use crate::domain::report::ReportType;
    use crate::domain::reporting::{generate_report, GenerateReportRequest, SelectionPolicy};
    use crate::domain::company::{Company, NewCompany};
    use crate::domain::esg_metric::{EsgCategory, EsgMetric, NewEsgMetric};
    use rust_decimal::Decimal;
    use serde_json::json;
    use uuid::Uuid;

    fn company() -> Company {
        let payload = json!({
            "name": "Acme",
            "nip": "5260250274",
            "industry": "Energy",
            "size": "LARGE",
            "street": "Prosta 1",
            "city": "Gdańsk",
            "postalCode": "80-001",
            "country": "Poland"
        });
        Company::new(NewCompany::from_payload(payload.as_object().unwrap()).unwrap())
    }

    #[test]
    fn empty_report_exports_header_only() {
        let report = Report::new(
            NewReport {
                company_id: Uuid::new_v4(),
                title: "Draft".into(),
                report_type: ReportType::Custom,
                framework: None,
                period: "2024".into(),
                content: None,
                file_url: None,
            },
            Uuid::new_v4(),
        );
        let csv = String::from_utf8(export_csv(&report).unwrap()).unwrap();
        assert_eq!(csv, "metricId,category,type,name,value,unit,verified,period\n");
    }

    #[test]
    fn exports_one_row_per_metric() {
        let company = company();
        let metric = EsgMetric::new(NewEsgMetric {
            company_id: company.id(),
            category: EsgCategory::Environmental,
            metric_type: "SCOPE_1".into(),
            name: "Direct emissions, boilers".into(),
            value: Decimal::new(1255, 1),
            unit: "tCO2e".into(),
            period: "2024".into(),
            source: None,
            verified: true,
            notes: None,
        });
        let request = GenerateReportRequest {
            company_id: company.id(),
            report_type: ReportType::CarbonFootprint,
            framework: None,
            period: "2024".into(),
            title: None,
            created_by_id: Uuid::new_v4(),
        };
        let report = generate_report(&request, &company, &[metric], &SelectionPolicy::default()).unwrap();

        let csv = String::from_utf8(export_csv(&report).unwrap()).unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].contains("ENVIRONMENTAL,SCOPE_1,\"Direct emissions, boilers\",125.5,tCO2e,true,2024"));
    }

    #[test]
    fn file_name_is_slugged() {
        let report = Report::new(
            NewReport {
                company_id: Uuid::new_v4(),
                title: "Carbon Footprint 2024 / Q1".into(),
                report_type: ReportType::Custom,
                framework: None,
                period: "2024".into(),
                content: None,
                file_url: None,
            },
            Uuid::new_v4(),
        );
        let name = export_file_name(&report);
        assert!(name.starts_with("carbon-footprint-2024-q1-"));
        assert!(name.ends_with(".csv"));
    }
}
