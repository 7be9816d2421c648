//! Localized alternate name attached to a Geoname.

use super::geoname::GeonameId;
use super::{require_id, require_text, EntityValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateName {
    pub alternate_name_id: i64,
    pub geoname_id: GeonameId,
    /// ISO 639 language tag; GeoNames also uses pseudo tags such as `post`
    /// or `link`.
    pub iso_language: Option<String>,
    pub alternate_name: String,
    pub is_preferred: bool,
    pub is_short: bool,
    pub is_colloquial: bool,
    pub is_historic: bool,
}

impl AlternateName {
    pub fn new(
        alternate_name_id: i64,
        geoname_id: GeonameId,
        iso_language: Option<&str>,
        alternate_name: impl Into<String>,
    ) -> Self {
        Self {
            alternate_name_id,
            geoname_id,
            iso_language: iso_language.map(str::to_string),
            alternate_name: alternate_name.into(),
            is_preferred: false,
            is_short: false,
            is_colloquial: false,
            is_historic: false,
        }
    }

    pub fn validate(&self) -> Result<(), EntityValidationError> {
        require_id("alternate_name", self.alternate_name_id)?;
        require_id("alternate_name.geoname", self.geoname_id)?;
        require_text("alternate_name", "alternate_name", &self.alternate_name)
    }
}
