use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::catalog::{display_as_str, Enumerated};

/// Headcount band of a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "company_size", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanySize {
    Micro,
    Small,
    Medium,
    Large,
}

impl Enumerated for CompanySize {
    const ALL: &'static [Self] = &[
        CompanySize::Micro,
        CompanySize::Small,
        CompanySize::Medium,
        CompanySize::Large,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            CompanySize::Micro => "MICRO",
            CompanySize::Small => "SMALL",
            CompanySize::Medium => "MEDIUM",
            CompanySize::Large => "LARGE",
        }
    }
}

display_as_str!(CompanySize);

const NIP_WEIGHTS: [u32; 9] = [6, 5, 7, 2, 3, 4, 5, 6, 7];
const REGON9_WEIGHTS: [u32; 8] = [8, 9, 2, 3, 4, 5, 6, 7];
const REGON14_WEIGHTS: [u32; 13] = [2, 4, 8, 5, 0, 9, 7, 3, 6, 1, 2, 4, 8];

/// Polish tax identification number (NIP)
///
/// # Invariants
/// - Exactly 10 digits once separators (`-`, spaces) are removed
/// - Last digit is the mod-11 checksum of the first nine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nip(String);

impl Nip {
    /// Parses and normalizes a NIP
    ///
    /// # Example
    /// ```
    /// use esg_platform_api::domain::company::value_objects::Nip;
    ///
    /// let nip = Nip::new("526-025-02-74").expect("valid NIP");
    /// assert_eq!(nip.as_str(), "5260250274");
    /// ```
    pub fn new(raw: &str) -> Result<Self, String> {
        let digits = strip_separators(raw);
        if digits.len() != 10 {
            return Err(format!("NIP must have 10 digits: {}", raw));
        }
        let values = digit_values(&digits).ok_or_else(|| format!("NIP must be numeric: {}", raw))?;

        let checksum = weighted_sum(&values[..9], &NIP_WEIGHTS) % 11;
        if checksum == 10 || checksum != values[9] {
            return Err(format!("NIP checksum mismatch: {}", raw));
        }
        Ok(Nip(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Polish business registry number (REGON), 9 or 14 digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Regon(String);

impl Regon {
    pub fn new(raw: &str) -> Result<Self, String> {
        let digits = strip_separators(raw);
        let values = digit_values(&digits).ok_or_else(|| format!("REGON must be numeric: {}", raw))?;

        let weights: &[u32] = match values.len() {
            9 => &REGON9_WEIGHTS,
            14 => &REGON14_WEIGHTS,
            _ => return Err(format!("REGON must have 9 or 14 digits: {}", raw)),
        };
        let last = values.len() - 1;
        let checksum = (weighted_sum(&values[..last], weights) % 11) % 10;
        if checksum != values[last] {
            return Err(format!("REGON checksum mismatch: {}", raw));
        }
        Ok(Regon(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Regon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn strip_separators(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '-' | ' ')).collect()
}

fn digit_values(digits: &str) -> Option<Vec<u32>> {
    digits.chars().map(|c| c.to_digit(10)).collect()
}

fn weighted_sum(values: &[u32], weights: &[u32]) -> u32 {
    values.iter().zip(weights).map(|(v, w)| v * w).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_nip() {
        assert!(Nip::new("5260250274").is_ok());
    }

    #[test]
    fn nip_with_separators_is_normalized() {
        assert_eq!(Nip::new("526 025 02 74").unwrap().as_str(), "5260250274");
    }

    #[test]
    fn nip_with_bad_checksum_fails() {
        assert!(Nip::new("5260250275").is_err());
    }

    #[test]
    fn nip_with_wrong_length_fails() {
        assert!(Nip::new("123").is_err());
    }

    #[test]
    fn nip_with_letters_fails() {
        assert!(Nip::new("52602502AB").is_err());
    }

    #[test]
    fn valid_nine_digit_regon() {
        assert!(Regon::new("123456785").is_ok());
    }

    #[test]
    fn regon_with_bad_checksum_fails() {
        assert!(Regon::new("123456786").is_err());
    }

    #[test]
    fn regon_with_wrong_length_fails() {
        assert!(Regon::new("1234567").is_err());
    }

    #[test]
    fn size_wire_names() {
        assert_eq!(CompanySize::parse("LARGE"), Some(CompanySize::Large));
        assert_eq!(CompanySize::Micro.to_string(), "MICRO");
    }
}
