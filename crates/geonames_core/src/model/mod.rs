//! Domain model for the geographic reference dataset.
//!
//! # Responsibility
//! - Define the Geoname-family records (countries, admin divisions, cities)
//!   and the localized alternate names attached to them.
//! - Own write-time validation shared by every repository.
//!
//! # Invariants
//! - Geoname identifiers are positive and unique within their identifier space.
//! - Entities are replaced wholesale during import and never soft-deleted.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod alternate_name;
pub mod country;
pub mod enriched;
pub mod geoname;

/// Reason an entity was refused before reaching storage.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityValidationError {
    /// Required identifier is zero or negative.
    MissingIdentifier { entity: &'static str, value: i64 },
    /// A required text field is blank.
    BlankField {
        entity: &'static str,
        field: &'static str,
    },
    InvalidIsoAlpha2(String),
    InvalidPostalCodeRegex { pattern: String, message: String },
    CoordinateOutOfRange { latitude: f64, longitude: f64 },
}

impl Display for EntityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentifier { entity, value } => {
                write!(f, "{entity} requires a positive identifier, got {value}")
            }
            Self::BlankField { entity, field } => write!(f, "{entity}.{field} cannot be blank"),
            Self::InvalidIsoAlpha2(value) => {
                write!(f, "iso_alpha2 must be two uppercase ASCII letters, got `{value}`")
            }
            Self::InvalidPostalCodeRegex { pattern, message } => {
                write!(f, "postal_code_regex `{pattern}` does not compile: {message}")
            }
            Self::CoordinateOutOfRange {
                latitude,
                longitude,
            } => write!(f, "coordinate ({latitude}, {longitude}) is out of range"),
        }
    }
}

impl Error for EntityValidationError {}

pub(crate) fn require_id(entity: &'static str, value: i64) -> Result<(), EntityValidationError> {
    if value <= 0 {
        return Err(EntityValidationError::MissingIdentifier { entity, value });
    }
    Ok(())
}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), EntityValidationError> {
    if value.trim().is_empty() {
        return Err(EntityValidationError::BlankField { entity, field });
    }
    Ok(())
}
