// Survey domain module

#![allow(clippy::module_inception)]

pub mod survey;
pub mod value_objects;

pub use survey::{NewSurvey, Survey, SurveyChanges, SurveyError, SurveyResponse};
pub use value_objects::{SurveyStatus, SurveyType};
