// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod catalog;
pub mod company;
pub mod errors;
pub mod esg_metric;
pub mod pagination;
pub mod report;
pub mod reporting;
pub mod repositories;
pub mod survey;
pub mod task;
pub mod user;
pub mod validation;
