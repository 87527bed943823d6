// Report domain module
// Contains the report aggregate, its lifecycle and typed content

#![allow(clippy::module_inception)]

pub mod content;
pub mod report;
pub mod value_objects;

pub use content::{MetricLine, ReportContent};
pub use report::{NewReport, Report, ReportChanges, ReportUpdateError};
pub use value_objects::{ReportStatus, ReportType};
