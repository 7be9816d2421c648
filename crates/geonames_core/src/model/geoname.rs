//! Geoname base record shared by admin divisions and cities.
//!
//! # Invariants
//! - `admin1_code` is only interpretable together with `country_code`, and
//!   each deeper admin code only together with the levels above it.
//! - An admin-division row whose `feature_code` is `ADMn` is the canonical
//!   record for administrative level `n`.

use super::{require_id, require_text, EntityValidationError};
use serde::{Deserialize, Serialize};

/// Identifier shared by every Geoname-family entity.
pub type GeonameId = i64;

/// Administrative depth encoded by the `ADM1`..`ADM4` feature codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdminLevel {
    Adm1,
    Adm2,
    Adm3,
    Adm4,
}

impl AdminLevel {
    pub const ALL: [AdminLevel; 4] = [Self::Adm1, Self::Adm2, Self::Adm3, Self::Adm4];

    pub fn feature_code(self) -> &'static str {
        match self {
            Self::Adm1 => "ADM1",
            Self::Adm2 => "ADM2",
            Self::Adm3 => "ADM3",
            Self::Adm4 => "ADM4",
        }
    }

    pub fn from_feature_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.feature_code().eq_ignore_ascii_case(code))
    }
}

/// Base Geoname record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geoname {
    pub geoname_id: GeonameId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Single-letter GeoNames class (`A` admin, `P` populated place, ...).
    pub feature_class: Option<String>,
    pub feature_code: Option<String>,
    pub country_code: Option<String>,
    pub admin1_code: Option<String>,
    pub admin2_code: Option<String>,
    pub admin3_code: Option<String>,
    pub admin4_code: Option<String>,
    pub population: i64,
    /// IANA timezone identifier.
    pub timezone: Option<String>,
}

impl Geoname {
    /// Creates a record with only identity, name and position set.
    pub fn new(geoname_id: GeonameId, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            geoname_id,
            name: name.into(),
            latitude,
            longitude,
            feature_class: None,
            feature_code: None,
            country_code: None,
            admin1_code: None,
            admin2_code: None,
            admin3_code: None,
            admin4_code: None,
            population: 0,
            timezone: None,
        }
    }

    /// Checks identity, name and coordinate bounds.
    pub fn validate(&self) -> Result<(), EntityValidationError> {
        require_id("geoname", self.geoname_id)?;
        require_text("geoname", "name", &self.name)?;
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(EntityValidationError::CoordinateOutOfRange {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        Ok(())
    }
}
