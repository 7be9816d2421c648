//! Read model returned by filtered Geoname queries.

use super::geoname::Geoname;
use serde::{Deserialize, Serialize};

/// A Geoname row plus the nullable fields contributed by expansion joins.
///
/// Expansion fields stay `None` both when the expansion was not requested
/// and when the joined row does not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedGeoname {
    #[serde(flatten)]
    pub geoname: Geoname,
    pub admin1_name: Option<String>,
    pub country_name: Option<String>,
    pub postal_code_regex: Option<String>,
}

impl EnrichedGeoname {
    pub fn plain(geoname: Geoname) -> Self {
        Self {
            geoname,
            admin1_name: None,
            country_name: None,
            postal_code_regex: None,
        }
    }
}

impl From<EnrichedGeoname> for Geoname {
    fn from(value: EnrichedGeoname) -> Self {
        value.geoname
    }
}
