// Aggregation and reporting over ESG metrics

pub mod aggregation;
pub mod errors;
pub mod export;
pub mod generation;
pub mod policy;

pub use aggregation::{aggregate_by_category, to_tonnes_co2e, CategoryAggregate, CategoryTotal};
pub use errors::ReportingError;
pub use export::{export_csv, export_file_name};
pub use generation::{generate_report, parse_framework, GenerateReportRequest};
pub use policy::SelectionPolicy;
