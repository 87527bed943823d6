// ESG metric domain module

pub mod metric;
pub mod value_objects;

pub use metric::{EsgMetric, EsgMetricChanges, NewEsgMetric};
pub use value_objects::EsgCategory;
