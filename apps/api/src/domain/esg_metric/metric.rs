use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::value_objects::EsgCategory;
use crate::domain::catalog::{limits, Enumerated, UnitFamily};
use crate::domain::validation::reader::{present, Mode, PayloadReader, Presence};
use crate::domain::validation::{ValidationError, ValidationErrors};

/// Checks that `unit` is known and fits the category's unit families
fn check_unit(category: EsgCategory, unit: &str) -> Result<(), ValidationError> {
    if UnitFamily::of_unit(unit).is_empty() {
        let known = UnitFamily::all_units().into_iter().map(String::from).collect();
        return Err(ValidationError::not_allowed("unit", known));
    }
    if !category.accepts_unit(unit) {
        let families: Vec<&str> = category.allowed_families().iter().map(|f| f.as_str()).collect();
        return Err(ValidationError::cross_field(
            &["category", "unit"],
            format!(
                "unit {} is not valid for {} metrics (expected one of the {} unit families)",
                unit,
                category,
                families.join("/")
            ),
        ));
    }
    Ok(())
}

/// Checks that `value` is within the accepted magnitude
fn check_value(value: Decimal) -> Result<(), ValidationError> {
    if value.abs() > Decimal::from(limits::METRIC_VALUE_MAX_ABS) {
        return Err(ValidationError::out_of_range("value", limits::METRIC_VALUE_MAX_ABS));
    }
    Ok(())
}

/// A validated payload for recording a metric
#[derive(Debug, Clone, PartialEq)]
pub struct NewEsgMetric {
    pub company_id: Uuid,
    pub category: EsgCategory,
    pub metric_type: String,
    pub name: String,
    pub value: Decimal,
    pub unit: String,
    pub period: String,
    pub source: Option<String>,
    pub verified: bool,
    pub notes: Option<String>,
}

impl NewEsgMetric {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Create);
        let company_id = r.uuid("companyId", Presence::Required);
        let category = r.enumerated::<EsgCategory>("category", Presence::Required);
        let metric_type = r.string("type", Presence::Required, limits::NAME_MAX_LENGTH);
        let name = r.string("name", Presence::Required, limits::NAME_MAX_LENGTH);
        let value = r.decimal("value", Presence::Required);
        let unit = r.string("unit", Presence::Required, 16);
        let period = r.string("period", Presence::Required, limits::PERIOD_MAX_LENGTH);
        let source = r.string("source", Presence::Optional, limits::SOURCE_MAX_LENGTH);
        let verified = r.boolean("verified");
        let notes = r.string("notes", Presence::Optional, limits::DESCRIPTION_MAX_LENGTH);

        if let (Some(category), Some(unit)) = (category, unit.as_deref()) {
            if let Err(e) = check_unit(category, unit) {
                r.push(e);
            }
        }
        if let Some(Err(e)) = value.map(check_value) {
            r.push(e);
        }
        r.finish()?;

        Ok(Self {
            company_id: present(company_id, "companyId")?,
            category: present(category, "category")?,
            metric_type: present(metric_type, "type")?,
            name: present(name, "name")?,
            value: present(value, "value")?,
            unit: present(unit, "unit")?,
            period: present(period, "period")?,
            source,
            verified: verified.unwrap_or(false),
            notes,
        })
    }
}

/// A validated partial update for a metric
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EsgMetricChanges {
    pub category: Option<EsgCategory>,
    pub metric_type: Option<String>,
    pub name: Option<String>,
    pub value: Option<Decimal>,
    pub unit: Option<String>,
    pub period: Option<String>,
    pub source: Option<String>,
    pub verified: Option<bool>,
    pub notes: Option<String>,
}

impl EsgMetricChanges {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Update);
        let changes = Self {
            category: r.enumerated::<EsgCategory>("category", Presence::Optional),
            metric_type: r.string("type", Presence::Optional, limits::NAME_MAX_LENGTH),
            name: r.string("name", Presence::Optional, limits::NAME_MAX_LENGTH),
            value: r.decimal("value", Presence::Optional),
            unit: r.string("unit", Presence::Optional, 16),
            period: r.string("period", Presence::Optional, limits::PERIOD_MAX_LENGTH),
            source: r.string("source", Presence::Optional, limits::SOURCE_MAX_LENGTH),
            verified: r.boolean("verified"),
            notes: r.string("notes", Presence::Optional, limits::DESCRIPTION_MAX_LENGTH),
        };
        if let Some(Err(e)) = changes.value.map(check_value) {
            r.push(e);
        }
        r.finish()?;
        Ok(changes)
    }
}

/// A single quantified ESG data point for a company and period
///
/// # Invariants
/// - The unit belongs to a unit family accepted by the category
/// - Values are exact decimals so that sums do not drift
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EsgMetric {
    id: Uuid,
    company_id: Uuid,
    category: EsgCategory,
    #[serde(rename = "type")]
    metric_type: String,
    name: String,
    value: Decimal,
    unit: String,
    period: String,
    source: Option<String>,
    verified: bool,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EsgMetric {
    pub fn new(new_metric: NewEsgMetric) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id: new_metric.company_id,
            category: new_metric.category,
            metric_type: new_metric.metric_type,
            name: new_metric.name,
            value: new_metric.value,
            unit: new_metric.unit,
            period: new_metric.period,
            source: new_metric.source,
            verified: new_metric.verified,
            notes: new_metric.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update, re-checking the unit against the category
    ///
    /// The metric is left untouched when the merged record would be invalid.
    pub fn apply(&mut self, changes: EsgMetricChanges) -> Result<(), ValidationErrors> {
        let category = changes.category.unwrap_or(self.category);
        let unit = changes.unit.as_deref().unwrap_or(&self.unit);
        check_unit(category, unit)?;

        self.category = category;
        if let Some(unit) = changes.unit {
            self.unit = unit;
        }
        if let Some(metric_type) = changes.metric_type {
            self.metric_type = metric_type;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(value) = changes.value {
            self.value = value;
        }
        if let Some(period) = changes.period {
            self.period = period;
        }
        if changes.source.is_some() {
            self.source = changes.source;
        }
        if let Some(verified) = changes.verified {
            self.verified = verified;
        }
        if changes.notes.is_some() {
            self.notes = changes.notes;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Unit families this metric's unit belongs to
    pub fn unit_families(&self) -> Vec<UnitFamily> {
        UnitFamily::of_unit(&self.unit)
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn company_id(&self) -> Uuid {
        self.company_id
    }

    pub fn category(&self) -> EsgCategory {
        self.category
    }

    pub fn metric_type(&self) -> &str {
        &self.metric_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn period(&self) -> &str {
        &self.period
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reconstructs an EsgMetric from persistence layer data
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        company_id: Uuid,
        category: EsgCategory,
        metric_type: String,
        name: String,
        value: Decimal,
        unit: String,
        period: String,
        source: Option<String>,
        verified: bool,
        notes: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            company_id,
            category,
            metric_type,
            name,
            value,
            unit,
            period,
            source,
            verified,
            notes,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn valid_payload() -> Map<String, Value> {
        payload(json!({
            "companyId": Uuid::new_v4().to_string(),
            "category": "ENVIRONMENTAL",
            "type": "SCOPE_1_EMISSIONS",
            "name": "Direct emissions",
            "value": 1250.75,
            "unit": "tCO2e",
            "period": "2024"
        }))
    }

    #[test]
    fn valid_metric_defaults_to_unverified() {
        let metric = NewEsgMetric::from_payload(&valid_payload()).unwrap();
        assert_eq!(metric.value, Decimal::new(125075, 2));
        assert!(!metric.verified);
    }

    #[test]
    fn carbon_unit_on_social_metric_is_cross_field_error() {
        let mut body = valid_payload();
        body.insert("category".into(), json!("SOCIAL"));

        let errors = NewEsgMetric::from_payload(&body).unwrap_err();
        assert!(matches!(
            &errors.errors()[0],
            ValidationError::CrossField { fields, .. } if fields == &["category", "unit"]
        ));
    }

    #[test]
    fn unknown_unit_lists_known_units() {
        let mut body = valid_payload();
        body.insert("unit".into(), json!("barrels"));

        let errors = NewEsgMetric::from_payload(&body).unwrap_err();
        match &errors.errors()[0] {
            ValidationError::NotAllowed { field, allowed_values } => {
                assert_eq!(field, "unit");
                assert!(allowed_values.contains(&"kgCO2e".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let mut body = valid_payload();
        body.insert("value".into(), json!("lots"));
        assert!(NewEsgMetric::from_payload(&body).unwrap_err().has_field("value"));
    }

    #[test]
    fn oversized_value_is_out_of_range() {
        let mut body = valid_payload();
        body.insert("value".into(), json!("60000000000000000000000000000"));

        let errors = NewEsgMetric::from_payload(&body).unwrap_err();
        assert!(matches!(
            &errors.errors()[0],
            ValidationError::OutOfRange { field, .. } if field == "value"
        ));

        body.insert("value".into(), json!(-1e16));
        assert!(NewEsgMetric::from_payload(&body).unwrap_err().has_field("value"));

        body.insert("value".into(), json!(limits::METRIC_VALUE_MAX_ABS));
        assert!(NewEsgMetric::from_payload(&body).is_ok());
    }

    #[test]
    fn update_rejects_oversized_value() {
        let changes = EsgMetricChanges::from_payload(&payload(json!({ "value": "1e20" })));
        assert!(changes.unwrap_err().has_field("value"));
    }

    #[test]
    fn update_rechecks_unit_against_new_category() {
        let mut metric = EsgMetric::new(NewEsgMetric::from_payload(&valid_payload()).unwrap());
        let changes = EsgMetricChanges::from_payload(&payload(json!({ "category": "GOVERNANCE" }))).unwrap();

        assert!(metric.apply(changes).is_err());
        assert_eq!(metric.category(), EsgCategory::Environmental);
    }

    #[test]
    fn update_with_compatible_unit_succeeds() {
        let mut metric = EsgMetric::new(NewEsgMetric::from_payload(&valid_payload()).unwrap());
        let changes = EsgMetricChanges::from_payload(&payload(json!({
            "category": "GOVERNANCE",
            "unit": "score",
            "verified": true
        })))
        .unwrap();

        metric.apply(changes).unwrap();
        assert_eq!(metric.unit(), "score");
        assert!(metric.verified());
    }

    #[test]
    fn serializes_type_field() {
        let metric = EsgMetric::new(NewEsgMetric::from_payload(&valid_payload()).unwrap());
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["type"], "SCOPE_1_EMISSIONS");
        assert_eq!(json["category"], "ENVIRONMENTAL");
        assert_eq!(json["value"], 1250.75);
    }
}
