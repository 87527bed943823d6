use thiserror::Error;
use uuid::Uuid;

/// Preconditions of report generation and export that were not met
#[derive(Debug, Error)]
pub enum ReportingError {
    #[error("No metrics available for company {company_id} in period {period}")]
    InsufficientData { company_id: Uuid, period: String },

    #[error("Sum of {0} metric values exceeds the supported range")]
    Overflow(&'static str),

    #[error("Unknown framework: {0}")]
    UnknownFramework(String),

    #[error("Failed to export report: {0}")]
    Export(#[from] csv::Error),
}
