//! Static lookup tables shared by validation, aggregation and the API layer.
//!
//! Every enumerated value list and numeric limit lives here so that rules
//! reference one table instead of scattered literals.

/// Field length and password limits
pub mod limits {
    pub const PASSWORD_MIN_LENGTH: usize = 8;
    pub const PASSWORD_MAX_LENGTH: usize = 128;
    pub const EMAIL_MAX_LENGTH: usize = 254;
    pub const NAME_MAX_LENGTH: usize = 100;
    pub const DESCRIPTION_MAX_LENGTH: usize = 1000;
    pub const TITLE_MAX_LENGTH: usize = 200;
    pub const PERIOD_MAX_LENGTH: usize = 50;
    pub const SOURCE_MAX_LENGTH: usize = 200;
    pub const POSTAL_CODE_MAX_LENGTH: usize = 20;
    pub const URL_MAX_LENGTH: usize = 2048;
    /// Largest accepted metric magnitude. Keeps per-category sums far below
    /// `Decimal::MAX` even for millions of metrics.
    pub const METRIC_VALUE_MAX_ABS: i64 = 1_000_000_000_000_000;
}

/// Pagination defaults and hard cap
pub mod paging {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;
}

/// A closed set of string-coded values
///
/// Implemented by every enumeration that arrives over the wire so the
/// validation layer can parse it and report the allowed values on failure.
pub trait Enumerated: Sized + Copy + 'static {
    /// Every member in declaration order
    const ALL: &'static [Self];

    /// The wire representation of this member
    fn as_str(&self) -> &'static str;

    /// Parses the wire representation, returning `None` for unknown values
    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|member| member.as_str() == value)
    }

    /// The wire representations of all members
    fn allowed_values() -> Vec<String> {
        Self::ALL.iter().map(|member| member.as_str().to_string()).collect()
    }
}

/// Implements `Display` through `Enumerated::as_str`
macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str($crate::domain::catalog::Enumerated::as_str(self))
                }
            }
        )+
    };
}

pub(crate) use display_as_str;

/// ESG reporting standard a report is prepared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "esg_framework", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Framework {
    Gri,
    Sasb,
    Tcfd,
    EuTaxonomy,
    Cdp,
    Ungc,
}

impl Enumerated for Framework {
    const ALL: &'static [Self] = &[
        Framework::Gri,
        Framework::Sasb,
        Framework::Tcfd,
        Framework::EuTaxonomy,
        Framework::Cdp,
        Framework::Ungc,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Framework::Gri => "GRI",
            Framework::Sasb => "SASB",
            Framework::Tcfd => "TCFD",
            Framework::EuTaxonomy => "EU_TAXONOMY",
            Framework::Cdp => "CDP",
            Framework::Ungc => "UNGC",
        }
    }
}

/// Group of interchangeable measurement units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitFamily {
    Carbon,
    Energy,
    Water,
    Waste,
    Percentage,
    Count,
    Ratio,
    Score,
}

impl UnitFamily {
    /// Units belonging to this family
    pub fn units(&self) -> &'static [&'static str] {
        match self {
            UnitFamily::Carbon => &["tCO2e", "kgCO2e", "gCO2e"],
            UnitFamily::Energy => &["kWh", "MWh", "GJ", "therms"],
            UnitFamily::Water => &["L", "m³", "gal"],
            UnitFamily::Waste => &["kg", "t", "m³"],
            UnitFamily::Percentage => &["%"],
            UnitFamily::Count => &["count"],
            UnitFamily::Ratio => &["ratio"],
            UnitFamily::Score => &["score"],
        }
    }

    /// Families that accept `unit`; `m³` is both a water and a waste unit
    pub fn of_unit(unit: &str) -> Vec<UnitFamily> {
        Self::ALL
            .iter()
            .copied()
            .filter(|family| family.units().contains(&unit))
            .collect()
    }

    /// Every known unit across all families, without duplicates
    pub fn all_units() -> Vec<&'static str> {
        let mut units: Vec<&'static str> = Vec::new();
        for family in Self::ALL {
            for unit in family.units() {
                if !units.contains(unit) {
                    units.push(unit);
                }
            }
        }
        units
    }
}

impl Enumerated for UnitFamily {
    const ALL: &'static [Self] = &[
        UnitFamily::Carbon,
        UnitFamily::Energy,
        UnitFamily::Water,
        UnitFamily::Waste,
        UnitFamily::Percentage,
        UnitFamily::Count,
        UnitFamily::Ratio,
        UnitFamily::Score,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            UnitFamily::Carbon => "CARBON",
            UnitFamily::Energy => "ENERGY",
            UnitFamily::Water => "WATER",
            UnitFamily::Waste => "WASTE",
            UnitFamily::Percentage => "PERCENTAGE",
            UnitFamily::Count => "COUNT",
            UnitFamily::Ratio => "RATIO",
            UnitFamily::Score => "SCORE",
        }
    }
}

/// Industry sector a company operates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Industry {
    Technology,
    Finance,
    Healthcare,
    Manufacturing,
    Retail,
    Energy,
    Transportation,
    #[serde(rename = "Real Estate")]
    RealEstate,
    Education,
    #[serde(rename = "Food & Beverage")]
    FoodBeverage,
    Telecommunications,
    Construction,
    Agriculture,
    Mining,
    Utilities,
    Media,
    Pharmaceuticals,
    Automotive,
    Aerospace,
    Other,
}

impl Enumerated for Industry {
    const ALL: &'static [Self] = &[
        Industry::Technology,
        Industry::Finance,
        Industry::Healthcare,
        Industry::Manufacturing,
        Industry::Retail,
        Industry::Energy,
        Industry::Transportation,
        Industry::RealEstate,
        Industry::Education,
        Industry::FoodBeverage,
        Industry::Telecommunications,
        Industry::Construction,
        Industry::Agriculture,
        Industry::Mining,
        Industry::Utilities,
        Industry::Media,
        Industry::Pharmaceuticals,
        Industry::Automotive,
        Industry::Aerospace,
        Industry::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Industry::Technology => "Technology",
            Industry::Finance => "Finance",
            Industry::Healthcare => "Healthcare",
            Industry::Manufacturing => "Manufacturing",
            Industry::Retail => "Retail",
            Industry::Energy => "Energy",
            Industry::Transportation => "Transportation",
            Industry::RealEstate => "Real Estate",
            Industry::Education => "Education",
            Industry::FoodBeverage => "Food & Beverage",
            Industry::Telecommunications => "Telecommunications",
            Industry::Construction => "Construction",
            Industry::Agriculture => "Agriculture",
            Industry::Mining => "Mining",
            Industry::Utilities => "Utilities",
            Industry::Media => "Media",
            Industry::Pharmaceuticals => "Pharmaceuticals",
            Industry::Automotive => "Automotive",
            Industry::Aerospace => "Aerospace",
            Industry::Other => "Other",
        }
    }
}

/// Country of a company's registered address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Country {
    Poland,
    Germany,
    #[serde(rename = "United Kingdom")]
    UnitedKingdom,
    France,
    Italy,
    Spain,
    Netherlands,
    Belgium,
    Austria,
    Switzerland,
    #[serde(rename = "Czech Republic")]
    CzechRepublic,
    Slovakia,
    Hungary,
    Other,
}

impl Enumerated for Country {
    const ALL: &'static [Self] = &[
        Country::Poland,
        Country::Germany,
        Country::UnitedKingdom,
        Country::France,
        Country::Italy,
        Country::Spain,
        Country::Netherlands,
        Country::Belgium,
        Country::Austria,
        Country::Switzerland,
        Country::CzechRepublic,
        Country::Slovakia,
        Country::Hungary,
        Country::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Country::Poland => "Poland",
            Country::Germany => "Germany",
            Country::UnitedKingdom => "United Kingdom",
            Country::France => "France",
            Country::Italy => "Italy",
            Country::Spain => "Spain",
            Country::Netherlands => "Netherlands",
            Country::Belgium => "Belgium",
            Country::Austria => "Austria",
            Country::Switzerland => "Switzerland",
            Country::CzechRepublic => "Czech Republic",
            Country::Slovakia => "Slovakia",
            Country::Hungary => "Hungary",
            Country::Other => "Other",
        }
    }
}

display_as_str!(Framework, UnitFamily, Industry, Country);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framework_parse_round_trips_codes() {
        assert_eq!(Framework::parse("EU_TAXONOMY"), Some(Framework::EuTaxonomy));
        assert_eq!(Framework::parse("gri"), None);
        assert_eq!(Framework::allowed_values().len(), 6);
    }

    #[test]
    fn cubic_meters_belong_to_water_and_waste() {
        let families = UnitFamily::of_unit("m³");
        assert_eq!(families, vec![UnitFamily::Water, UnitFamily::Waste]);
    }

    #[test]
    fn unknown_unit_has_no_family() {
        assert!(UnitFamily::of_unit("furlongs").is_empty());
    }

    #[test]
    fn all_units_are_unique() {
        let units = UnitFamily::all_units();
        assert_eq!(units.iter().filter(|u| **u == "m³").count(), 1);
        assert!(units.contains(&"tCO2e"));
        assert!(units.contains(&"score"));
    }

    #[test]
    fn industry_uses_display_names() {
        assert_eq!(Industry::parse("Food & Beverage"), Some(Industry::FoodBeverage));
        assert_eq!(Industry::RealEstate.to_string(), "Real Estate");
        assert_eq!(Industry::ALL.len(), 20);
    }

    #[test]
    fn country_table_is_complete() {
        assert_eq!(Country::ALL.len(), 14);
        assert_eq!(Country::parse("Czech Republic"), Some(Country::CzechRepublic));
        assert_eq!(Country::parse("Atlantis"), None);
    }

    #[test]
    fn framework_display() {
        assert_eq!(Framework::Tcfd.to_string(), "TCFD");
    }
}
