//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that drive file generation: the
//! submission competence, facility codes, and postal codes.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Submission competence (`YYYYMM`)
///
/// # Examples
///
/// ```
/// use bpagen::domain::ids::Competence;
/// use std::str::FromStr;
///
/// let competence = Competence::from_str("202403").unwrap();
/// assert_eq!(competence.year(), 2024);
/// assert_eq!(competence.month(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Competence(String);

impl Competence {
    /// Creates a new Competence from a `YYYYMM` string
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.len() != 6 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!(
                "Competence must be six digits in YYYYMM form, got: '{value}'"
            ));
        }

        let month: u32 = trimmed[4..].parse().map_err(|_| "Invalid month".to_string())?;
        if !(1..=12).contains(&month) {
            return Err(format!("Competence month out of range: {month:02}"));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Competence of the given calendar date
    pub fn from_date(date: impl Datelike) -> Self {
        Self(format!("{:04}{:02}", date.year(), date.month()))
    }

    /// Competence of the current local month
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0[..4].parse().unwrap_or_default()
    }

    pub fn month(&self) -> u32 {
        self.0[4..].parse().unwrap_or_default()
    }

    /// Returns the competence as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Competence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Competence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Competence {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Competence> for String {
    fn from(value: Competence) -> Self {
        value.0
    }
}

impl AsRef<str> for Competence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Health facility code (CNES)
///
/// Seven digits at most; shorter codes are accepted as stored and padded by
/// the record encoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacilityCode(String);

impl FacilityCode {
    pub fn new(code: impl Into<String>) -> Result<Self, String> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err("Facility code cannot be empty".to_string());
        }
        if code.len() > 7 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!(
                "Facility code must be up to seven digits, got: '{code}'"
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FacilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FacilityCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for FacilityCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Brazilian postal code (CEP), normalised to eight digits
///
/// # Examples
///
/// ```
/// use bpagen::domain::ids::PostalCode;
///
/// let cep = PostalCode::normalize("07400-959").unwrap();
/// assert_eq!(cep.as_str(), "07400959");
/// assert_eq!(cep.hyphenated(), "07400-959");
/// assert!(PostalCode::normalize("7400").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostalCode(String);

impl PostalCode {
    /// Strictly validates an eight-digit code
    pub fn new(code: impl Into<String>) -> Result<Self, String> {
        let code = code.into();
        if code.len() != 8 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("Postal code must have eight digits, got: '{code}'"));
        }
        Ok(Self(code))
    }

    /// Drops every non-digit character and accepts the result when it has
    /// exactly eight digits
    pub fn normalize(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        Self::new(digits).ok()
    }

    /// `NNNNN-NNN` form used by some providers
    pub fn hyphenated(&self) -> String {
        format!("{}-{}", &self.0[..5], &self.0[5..])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostalCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_competence_valid() {
        let competence = Competence::new("202412").unwrap();
        assert_eq!(competence.as_str(), "202412");
        assert_eq!(competence.year(), 2024);
        assert_eq!(competence.month(), 12);
    }

    #[test]
    fn test_competence_rejects_bad_month() {
        assert!(Competence::new("202413").is_err());
        assert!(Competence::new("202400").is_err());
    }

    #[test]
    fn test_competence_rejects_wrong_shape() {
        assert!(Competence::new("2024-03").is_err());
        assert!(Competence::new("20243").is_err());
        assert!(Competence::new("").is_err());
    }

    #[test]
    fn test_competence_from_date() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 14).unwrap();
        assert_eq!(Competence::from_date(date).as_str(), "202507");
    }

    #[test]
    fn test_competence_serde_validates() {
        let ok: Competence = serde_json::from_str("\"202401\"").unwrap();
        assert_eq!(ok.as_str(), "202401");
        assert!(serde_json::from_str::<Competence>("\"2024\"").is_err());
    }

    #[test]
    fn test_facility_code() {
        assert!(FacilityCode::new("6896847").is_ok());
        assert!(FacilityCode::new("").is_err());
        assert!(FacilityCode::new("12345678").is_err());
        assert!(FacilityCode::new("12a4567").is_err());
    }

    #[test]
    fn test_postal_code_normalize() {
        assert_eq!(
            PostalCode::normalize(" 07400-000 ").unwrap().as_str(),
            "07400000"
        );
        assert!(PostalCode::normalize("0740000").is_none());
        assert!(PostalCode::normalize("074000000").is_none());
        assert!(PostalCode::normalize("").is_none());
    }

    #[test]
    fn test_postal_code_hyphenated() {
        let cep = PostalCode::new("01001000").unwrap();
        assert_eq!(cep.hyphenated(), "01001-000");
    }
}
