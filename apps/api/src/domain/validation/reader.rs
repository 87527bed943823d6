use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{ValidationError, ValidationErrors};
use crate::domain::catalog::Enumerated;

/// Whether required fields are enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Full payload for a new record
    Create,
    /// Partial payload; absent fields mean "no change"
    Update,
}

/// Whether a field must be present in create mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Reads typed fields out of a JSON object while collecting every violation
///
/// Each accessor returns `None` when the field is absent, null or invalid and
/// records the reason. Callers read every field first and call [`finish`]
/// once, so a payload with several problems reports all of them.
///
/// [`finish`]: PayloadReader::finish
pub struct PayloadReader<'a> {
    payload: &'a Map<String, Value>,
    mode: Mode,
    errors: Vec<ValidationError>,
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a Map<String, Value>, mode: Mode) -> Self {
        Self {
            payload,
            mode,
            errors: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the raw value unless it is absent or null
    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        self.payload.get(name).filter(|v| !v.is_null())
    }

    /// Returns true if the field carries a non-null value
    pub fn is_present(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    fn absent(&mut self, name: &str, presence: Presence) {
        if presence == Presence::Required && self.mode == Mode::Create {
            self.errors.push(ValidationError::missing(name));
        }
    }

    /// Reads a trimmed string bounded by `max` characters
    ///
    /// Blank strings count as absent.
    pub fn string(&mut self, name: &str, presence: Presence, max: usize) -> Option<String> {
        let Some(value) = self.raw(name) else {
            self.absent(name, presence);
            return None;
        };
        let Some(text) = value.as_str() else {
            self.push(ValidationError::invalid_format(name, "string"));
            return None;
        };
        let text = text.trim();
        if text.is_empty() {
            self.absent(name, presence);
            return None;
        }
        if text.chars().count() > max {
            self.push(ValidationError::too_long(name, max));
            return None;
        }
        Some(text.to_string())
    }

    /// Reads a string without trimming, bounded on both sides
    pub fn secret(&mut self, name: &str, presence: Presence, min: usize, max: usize) -> Option<String> {
        let Some(value) = self.raw(name) else {
            self.absent(name, presence);
            return None;
        };
        let Some(text) = value.as_str() else {
            self.push(ValidationError::invalid_format(name, "string"));
            return None;
        };
        let length = text.chars().count();
        if length < min {
            self.push(ValidationError::too_short(name, min));
            return None;
        }
        if length > max {
            self.push(ValidationError::too_long(name, max));
            return None;
        }
        Some(text.to_string())
    }

    pub fn uuid(&mut self, name: &str, presence: Presence) -> Option<Uuid> {
        let text = self.string(name, presence, 36)?;
        match Uuid::parse_str(&text) {
            Ok(id) => Some(id),
            Err(_) => {
                self.push(ValidationError::invalid_format(name, "UUID"));
                None
            }
        }
    }

    /// Reads a member of a closed value set
    pub fn enumerated<E: Enumerated>(&mut self, name: &str, presence: Presence) -> Option<E> {
        let Some(value) = self.raw(name) else {
            self.absent(name, presence);
            return None;
        };
        match value.as_str().and_then(E::parse) {
            Some(member) => Some(member),
            None => {
                self.push(ValidationError::not_allowed(name, E::allowed_values()));
                None
            }
        }
    }

    /// Reads an exact decimal from a JSON number or a numeric string
    pub fn decimal(&mut self, name: &str, presence: Presence) -> Option<Decimal> {
        let Some(value) = self.raw(name) else {
            self.absent(name, presence);
            return None;
        };
        let parsed = match value {
            Value::Number(number) => parse_decimal(&number.to_string()),
            Value::String(text) => parse_decimal(text.trim()),
            _ => None,
        };
        if parsed.is_none() {
            self.push(ValidationError::invalid_format(name, "number"));
        }
        parsed
    }

    pub fn boolean(&mut self, name: &str) -> Option<bool> {
        let value = self.raw(name)?;
        match value.as_bool() {
            Some(flag) => Some(flag),
            None => {
                self.push(ValidationError::invalid_format(name, "boolean"));
                None
            }
        }
    }

    /// Reads an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC)
    pub fn datetime(&mut self, name: &str, presence: Presence) -> Option<DateTime<Utc>> {
        self.datetime_with(name, presence, parse_datetime)
    }

    /// Like [`datetime`](Self::datetime), but a plain date covers the whole
    /// day and resolves to its last microsecond
    pub fn end_datetime(&mut self, name: &str, presence: Presence) -> Option<DateTime<Utc>> {
        self.datetime_with(name, presence, parse_end_datetime)
    }

    fn datetime_with(
        &mut self,
        name: &str,
        presence: Presence,
        parse: fn(&str) -> Option<DateTime<Utc>>,
    ) -> Option<DateTime<Utc>> {
        let text = self.string(name, presence, 64)?;
        match parse(&text) {
            Some(at) => Some(at),
            None => {
                self.push(ValidationError::invalid_format(name, "date"));
                None
            }
        }
    }

    pub fn object(&mut self, name: &str, presence: Presence) -> Option<Value> {
        let Some(value) = self.raw(name) else {
            self.absent(name, presence);
            return None;
        };
        if value.is_object() {
            Some(value.clone())
        } else {
            self.push(ValidationError::invalid_format(name, "object"));
            None
        }
    }

    /// Returns every collected violation, or `Ok` if there were none
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(self.errors))
        }
    }
}

/// Unwraps a field that `finish` has already proven present
pub fn present<T>(value: Option<T>, field: &str) -> Result<T, ValidationErrors> {
    value.ok_or_else(|| ValidationError::missing(field).into())
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

pub(crate) fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_or_date(text, |date| date.and_hms_opt(0, 0, 0))
}

/// Microsecond precision matches what PostgreSQL stores
pub(crate) fn parse_end_datetime(text: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_or_date(text, |date| date.and_hms_micro_opt(23, 59, 59, 999_999))
}

fn parse_timestamp_or_date(
    text: &str,
    time_of_day: impl FnOnce(NaiveDate) -> Option<NaiveDateTime>,
) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(time_of_day)
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Framework;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let payload = object(json!({}));
        let mut reader = PayloadReader::new(&payload, Mode::Create);
        reader.string("email", Presence::Required, 254);
        reader.string("firstName", Presence::Required, 100);
        reader.string("notes", Presence::Optional, 100);

        let errors = reader.finish().unwrap_err();
        assert_eq!(errors.missing_fields(), vec!["email", "firstName"]);
    }

    #[test]
    fn update_mode_does_not_require_fields() {
        let payload = object(json!({}));
        let mut reader = PayloadReader::new(&payload, Mode::Update);
        assert!(reader.string("email", Presence::Required, 254).is_none());
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn blank_string_counts_as_missing() {
        let payload = object(json!({ "name": "   " }));
        let mut reader = PayloadReader::new(&payload, Mode::Create);
        reader.string("name", Presence::Required, 100);
        assert!(reader.finish().unwrap_err().has_field("name"));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let payload = object(json!({ "unit": "m³m³" }));
        let mut reader = PayloadReader::new(&payload, Mode::Create);
        assert_eq!(reader.string("unit", Presence::Required, 4).as_deref(), Some("m³m³"));
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn unknown_enum_value_lists_allowed_values() {
        let payload = object(json!({ "framework": "ISO" }));
        let mut reader = PayloadReader::new(&payload, Mode::Create);
        assert!(reader.enumerated::<Framework>("framework", Presence::Optional).is_none());

        let errors = reader.finish().unwrap_err();
        match &errors.errors()[0] {
            ValidationError::NotAllowed { field, allowed_values } => {
                assert_eq!(field, "framework");
                assert_eq!(allowed_values.len(), 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decimal_accepts_numbers_and_numeric_strings() {
        let payload = object(json!({ "a": 12.5, "b": "0.125", "c": 7, "d": "seven" }));
        let mut reader = PayloadReader::new(&payload, Mode::Create);
        assert_eq!(reader.decimal("a", Presence::Required), Some(Decimal::new(125, 1)));
        assert_eq!(reader.decimal("b", Presence::Required), Some(Decimal::new(125, 3)));
        assert_eq!(reader.decimal("c", Presence::Required), Some(Decimal::from(7)));
        assert_eq!(reader.decimal("d", Presence::Required), None);
        assert!(reader.finish().unwrap_err().has_field("d"));
    }

    #[test]
    fn dates_accept_plain_dates_and_timestamps() {
        assert!(parse_datetime("2024-06-01").is_some());
        assert!(parse_datetime("2024-06-01T10:00:00Z").is_some());
        assert!(parse_datetime("01/06/2024").is_none());
    }

    #[test]
    fn plain_end_dates_cover_the_whole_day() {
        let end = parse_end_datetime("2024-06-01").unwrap();
        assert_eq!(end.to_rfc3339(), "2024-06-01T23:59:59.999999+00:00");
        assert!(end > parse_datetime("2024-06-01T18:00:00Z").unwrap());

        let exact = parse_end_datetime("2024-06-01T10:00:00Z").unwrap();
        assert_eq!(exact, parse_datetime("2024-06-01T10:00:00Z").unwrap());
    }

    #[test]
    fn wrong_json_type_is_a_format_error() {
        let payload = object(json!({ "title": 42, "isAnonymous": "yes" }));
        let mut reader = PayloadReader::new(&payload, Mode::Create);
        reader.string("title", Presence::Required, 200);
        reader.boolean("isAnonymous");
        let errors = reader.finish().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn secret_enforces_both_bounds() {
        let payload = object(json!({ "password": "short" }));
        let mut reader = PayloadReader::new(&payload, Mode::Create);
        assert!(reader.secret("password", Presence::Required, 8, 128).is_none());
        let errors = reader.finish().unwrap_err();
        assert_eq!(errors.errors()[0], ValidationError::too_short("password", 8));
    }
}
