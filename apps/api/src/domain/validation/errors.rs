use serde::Serialize;
use thiserror::Error;

/// Which side of a length bound was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthConstraint {
    Min,
    Max,
}

impl std::fmt::Display for LengthConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthConstraint::Min => write!(f, "at least"),
            LengthConstraint::Max => write!(f, "at most"),
        }
    }
}

/// A single rule violation found while validating a payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: String },

    #[error("{field} must be {constraint} {limit} characters")]
    Length {
        field: String,
        constraint: LengthConstraint,
        limit: usize,
    },

    #[error("{field} must be one of: {}", .allowed_values.join(", "))]
    NotAllowed {
        field: String,
        allowed_values: Vec<String>,
    },

    #[error("{field} is not a valid {expected}")]
    InvalidFormat { field: String, expected: String },

    #[error("{field} must be between -{limit} and {limit}")]
    OutOfRange { field: String, limit: String },

    #[error("{message}")]
    CrossField { fields: Vec<String>, message: String },
}

impl ValidationError {
    pub fn missing(field: &str) -> Self {
        Self::Missing {
            field: field.to_string(),
        }
    }

    pub fn too_long(field: &str, limit: usize) -> Self {
        Self::Length {
            field: field.to_string(),
            constraint: LengthConstraint::Max,
            limit,
        }
    }

    pub fn too_short(field: &str, limit: usize) -> Self {
        Self::Length {
            field: field.to_string(),
            constraint: LengthConstraint::Min,
            limit,
        }
    }

    pub fn not_allowed(field: &str, allowed_values: Vec<String>) -> Self {
        Self::NotAllowed {
            field: field.to_string(),
            allowed_values,
        }
    }

    pub fn invalid_format(field: &str, expected: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.to_string(),
            expected: expected.into(),
        }
    }

    pub fn out_of_range(field: &str, limit: impl ToString) -> Self {
        Self::OutOfRange {
            field: field.to_string(),
            limit: limit.to_string(),
        }
    }

    pub fn cross_field(fields: &[&str], message: impl Into<String>) -> Self {
        Self::CrossField {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            message: message.into(),
        }
    }

    /// Returns true if this violation concerns `name`
    pub fn concerns(&self, name: &str) -> bool {
        match self {
            ValidationError::Missing { field }
            | ValidationError::Length { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::OutOfRange { field, .. } => field == name,
            ValidationError::CrossField { fields, .. } => fields.iter().any(|f| f == name),
        }
    }
}

/// Every violation found in one validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("validation failed: {}", summarize(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }

    pub fn single(error: ValidationError) -> Self {
        Self(vec![error])
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if any violation concerns `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.concerns(field))
    }

    /// Names of the required fields reported missing
    pub fn missing_fields(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|e| match e {
                ValidationError::Missing { field } => Some(field.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.0
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_allowed_message_lists_values() {
        let err = ValidationError::not_allowed("size", vec!["MICRO".into(), "SMALL".into()]);
        assert_eq!(err.to_string(), "size must be one of: MICRO, SMALL");
    }

    #[test]
    fn length_message() {
        let err = ValidationError::too_long("title", 200);
        assert_eq!(err.to_string(), "title must be at most 200 characters");
    }

    #[test]
    fn serializes_with_kind_tag_and_camel_case_fields() {
        let err = ValidationError::not_allowed("role", vec!["ADMIN".into()]);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "notAllowed");
        assert_eq!(json["field"], "role");
        assert_eq!(json["allowedValues"][0], "ADMIN");
    }

    #[test]
    fn cross_field_concerns_every_named_field() {
        let err = ValidationError::cross_field(&["startDate", "endDate"], "bad range");
        assert!(err.concerns("startDate"));
        assert!(err.concerns("endDate"));
        assert!(!err.concerns("title"));
    }

    #[test]
    fn errors_summary_joins_messages() {
        let errors = ValidationErrors::new(vec![
            ValidationError::missing("email"),
            ValidationError::missing("firstName"),
        ]);
        assert_eq!(
            errors.to_string(),
            "validation failed: email is required; firstName is required"
        );
        assert_eq!(errors.missing_fields(), vec!["email", "firstName"]);
    }
}
