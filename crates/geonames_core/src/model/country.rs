//! Country record.
//!
//! Countries live in the same identifier space as other Geonames and are
//! additionally keyed by their unique ISO 3166 alpha-2 code.

use super::geoname::GeonameId;
use super::{require_id, require_text, EntityValidationError};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub geoname_id: GeonameId,
    pub iso_alpha2: String,
    pub iso_alpha3: Option<String>,
    pub country_name: String,
    pub capital: Option<String>,
    pub population: Option<i64>,
    /// Two-letter continent code (`EU`, `AS`, ...).
    pub continent: Option<String>,
    pub currency_code: Option<String>,
    pub postal_code_format: Option<String>,
    pub postal_code_regex: Option<String>,
}

impl Country {
    pub fn new(
        geoname_id: GeonameId,
        iso_alpha2: impl Into<String>,
        country_name: impl Into<String>,
    ) -> Self {
        Self {
            geoname_id,
            iso_alpha2: iso_alpha2.into(),
            iso_alpha3: None,
            country_name: country_name.into(),
            capital: None,
            population: None,
            continent: None,
            currency_code: None,
            postal_code_format: None,
            postal_code_regex: None,
        }
    }

    pub fn validate(&self) -> Result<(), EntityValidationError> {
        require_id("country", self.geoname_id)?;
        require_text("country", "country_name", &self.country_name)?;

        let iso = self.iso_alpha2.as_bytes();
        if iso.len() != 2 || !iso.iter().all(u8::is_ascii_uppercase) {
            return Err(EntityValidationError::InvalidIsoAlpha2(
                self.iso_alpha2.clone(),
            ));
        }

        if let Some(pattern) = self.postal_code_regex.as_deref() {
            Regex::new(pattern).map_err(|err| EntityValidationError::InvalidPostalCodeRegex {
                pattern: pattern.to_string(),
                message: err.to_string(),
            })?;
        }

        Ok(())
    }

    /// Tests a postal code against this country's pattern.
    ///
    /// Returns `None` when the country publishes no pattern or the stored
    /// pattern does not compile.
    pub fn matches_postal_code(&self, postal_code: &str) -> Option<bool> {
        let pattern = self.postal_code_regex.as_deref()?;
        let regex = Regex::new(pattern).ok()?;
        Some(regex.is_match(postal_code))
    }
}
