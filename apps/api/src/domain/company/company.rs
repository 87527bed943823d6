use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::value_objects::{CompanySize, Nip, Regon};
use crate::domain::catalog::{limits, Country, Industry};
use crate::domain::validation::reader::{present, Mode, PayloadReader, Presence};
use crate::domain::validation::{ValidationError, ValidationErrors};

/// Company fields shared by create and update payloads
#[derive(Debug, Clone, Default, PartialEq)]
struct CompanyFields {
    name: Option<String>,
    nip: Option<Nip>,
    regon: Option<Regon>,
    industry: Option<Industry>,
    size: Option<CompanySize>,
    website: Option<String>,
    description: Option<String>,
    street: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country: Option<Country>,
}

impl CompanyFields {
    fn read(r: &mut PayloadReader<'_>) -> Self {
        let nip = r
            .string("nip", Presence::Required, 20)
            .and_then(|raw| match Nip::new(&raw) {
                Ok(nip) => Some(nip),
                Err(_) => {
                    r.push(ValidationError::invalid_format("nip", "NIP"));
                    None
                }
            });
        let regon = r
            .string("regon", Presence::Optional, 20)
            .and_then(|raw| match Regon::new(&raw) {
                Ok(regon) => Some(regon),
                Err(_) => {
                    r.push(ValidationError::invalid_format("regon", "REGON"));
                    None
                }
            });
        let website = r
            .string("website", Presence::Optional, limits::URL_MAX_LENGTH)
            .and_then(|url| {
                if url.starts_with("http://") || url.starts_with("https://") {
                    Some(url)
                } else {
                    r.push(ValidationError::invalid_format("website", "http(s) URL"));
                    None
                }
            });

        Self {
            name: r.string("name", Presence::Required, limits::NAME_MAX_LENGTH),
            nip,
            regon,
            industry: r.enumerated::<Industry>("industry", Presence::Required),
            size: r.enumerated::<CompanySize>("size", Presence::Required),
            website,
            description: r.string("description", Presence::Optional, limits::DESCRIPTION_MAX_LENGTH),
            street: r.string("street", Presence::Required, limits::NAME_MAX_LENGTH),
            city: r.string("city", Presence::Required, limits::NAME_MAX_LENGTH),
            postal_code: r.string("postalCode", Presence::Required, limits::POSTAL_CODE_MAX_LENGTH),
            country: r.enumerated::<Country>("country", Presence::Required),
        }
    }
}

/// A validated payload for creating a company
#[derive(Debug, Clone, PartialEq)]
pub struct NewCompany {
    pub name: String,
    pub nip: Nip,
    pub regon: Option<Regon>,
    pub industry: Industry,
    pub size: CompanySize,
    pub website: Option<String>,
    pub description: Option<String>,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: Country,
}

impl NewCompany {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Create);
        let fields = CompanyFields::read(&mut r);
        r.finish()?;

        Ok(Self {
            name: present(fields.name, "name")?,
            nip: present(fields.nip, "nip")?,
            regon: fields.regon,
            industry: present(fields.industry, "industry")?,
            size: present(fields.size, "size")?,
            website: fields.website,
            description: fields.description,
            street: present(fields.street, "street")?,
            city: present(fields.city, "city")?,
            postal_code: present(fields.postal_code, "postalCode")?,
            country: present(fields.country, "country")?,
        })
    }
}

/// A validated partial update for a company
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyChanges {
    fields: CompanyFields,
}

impl CompanyChanges {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut r = PayloadReader::new(payload, Mode::Update);
        let fields = CompanyFields::read(&mut r);
        r.finish()?;
        Ok(Self { fields })
    }

    /// The new NIP, if the update changes it
    pub fn nip(&self) -> Option<&Nip> {
        self.fields.nip.as_ref()
    }
}

/// Company aggregate root
///
/// Owns every user, metric, report, survey and task. Deactivation is soft:
/// the company and its history stay readable, but no new child records may be
/// attached to an inactive company.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    id: Uuid,
    name: String,
    nip: Nip,
    regon: Option<Regon>,
    industry: Industry,
    size: CompanySize,
    website: Option<String>,
    description: Option<String>,
    is_active: bool,
    street: String,
    city: String,
    postal_code: String,
    country: Country,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Company {
    pub fn new(new_company: NewCompany) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: new_company.name,
            nip: new_company.nip,
            regon: new_company.regon,
            industry: new_company.industry,
            size: new_company.size,
            website: new_company.website,
            description: new_company.description,
            is_active: true,
            street: new_company.street,
            city: new_company.city,
            postal_code: new_company.postal_code,
            country: new_company.country,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: CompanyChanges) {
        let f = changes.fields;
        if let Some(name) = f.name {
            self.name = name;
        }
        if let Some(nip) = f.nip {
            self.nip = nip;
        }
        if f.regon.is_some() {
            self.regon = f.regon;
        }
        if let Some(industry) = f.industry {
            self.industry = industry;
        }
        if let Some(size) = f.size {
            self.size = size;
        }
        if f.website.is_some() {
            self.website = f.website;
        }
        if f.description.is_some() {
            self.description = f.description;
        }
        if let Some(street) = f.street {
            self.street = street;
        }
        if let Some(city) = f.city {
            self.city = city;
        }
        if let Some(postal_code) = f.postal_code {
            self.postal_code = postal_code;
        }
        if let Some(country) = f.country {
            self.country = country;
        }
        self.touch();
    }

    /// Soft-deactivates the company
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nip(&self) -> &Nip {
        &self.nip
    }

    pub fn regon(&self) -> Option<&Regon> {
        self.regon.as_ref()
    }

    pub fn industry(&self) -> Industry {
        self.industry
    }

    pub fn size(&self) -> CompanySize {
        self.size
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn country(&self) -> Country {
        self.country
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reconstructs a Company from persistence layer data
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        name: String,
        nip: Nip,
        regon: Option<Regon>,
        industry: Industry,
        size: CompanySize,
        website: Option<String>,
        description: Option<String>,
        is_active: bool,
        street: String,
        city: String,
        postal_code: String,
        country: Country,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            nip,
            regon,
            industry,
            size,
            website,
            description,
            is_active,
            street,
            city,
            postal_code,
            country,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Map<String, Value> {
        json!({
            "name": "Zielona Energia S.A.",
            "nip": "526-025-02-74",
            "industry": "Energy",
            "size": "LARGE",
            "street": "ul. Prosta 1",
            "city": "Warszawa",
            "postalCode": "00-001",
            "country": "Poland"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn valid_payload_builds_company() {
        let company = Company::new(NewCompany::from_payload(&valid_payload()).unwrap());
        assert_eq!(company.nip().as_str(), "5260250274");
        assert_eq!(company.industry(), Industry::Energy);
        assert!(company.is_active());
    }

    #[test]
    fn missing_nip_is_reported() {
        let mut body = valid_payload();
        body.remove("nip");
        let errors = NewCompany::from_payload(&body).unwrap_err();
        assert_eq!(errors.missing_fields(), vec!["nip"]);
    }

    #[test]
    fn unknown_industry_and_size_are_both_reported() {
        let mut body = valid_payload();
        body.insert("industry".into(), json!("Gaming"));
        body.insert("size".into(), json!("HUGE"));
        let errors = NewCompany::from_payload(&body).unwrap_err();
        assert!(errors.has_field("industry"));
        assert!(errors.has_field("size"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn invalid_website_scheme_is_rejected() {
        let mut body = valid_payload();
        body.insert("website".into(), json!("ftp://example.com"));
        assert!(NewCompany::from_payload(&body).unwrap_err().has_field("website"));
    }

    #[test]
    fn invalid_regon_is_rejected() {
        let mut body = valid_payload();
        body.insert("regon".into(), json!("12"));
        assert!(NewCompany::from_payload(&body).unwrap_err().has_field("regon"));
    }

    #[test]
    fn deactivate_keeps_data() {
        let mut company = Company::new(NewCompany::from_payload(&valid_payload()).unwrap());
        company.deactivate();
        assert!(!company.is_active());
        assert_eq!(company.city(), "Warszawa");
    }

    #[test]
    fn partial_update_changes_only_given_fields() {
        let mut company = Company::new(NewCompany::from_payload(&valid_payload()).unwrap());
        let changes = CompanyChanges::from_payload(
            json!({ "city": "Kraków", "size": "MEDIUM" }).as_object().unwrap(),
        )
        .unwrap();
        company.apply(changes);
        assert_eq!(company.city(), "Kraków");
        assert_eq!(company.size(), CompanySize::Medium);
        assert_eq!(company.name(), "Zielona Energia S.A.");
    }

    #[test]
    fn serializes_camel_case_with_display_names() {
        let company = Company::new(NewCompany::from_payload(&valid_payload()).unwrap());
        let json = serde_json::to_value(&company).unwrap();
        assert_eq!(json["postalCode"], "00-001");
        assert_eq!(json["industry"], "Energy");
        assert_eq!(json["nip"], "5260250274");
    }
}
