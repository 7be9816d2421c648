//! Entity-family descriptors for Geoname-family tables.
//!
//! One generic repository and one composer serve every family; what differs
//! between admin divisions and cities is captured here as data.

use crate::query::expansion::JoinKind;

/// Columns shared by every Geoname-family table, in select order.
pub const GEONAME_COLUMNS: &[&str] = &[
    "geoname_id",
    "name",
    "latitude",
    "longitude",
    "feature_class",
    "feature_code",
    "country_code",
    "admin1_code",
    "admin2_code",
    "admin3_code",
    "admin4_code",
    "population",
    "timezone",
];

/// Static description of one Geoname-family table.
#[derive(Debug, PartialEq, Eq)]
pub struct EntityFamily {
    /// Name used in log lines and errors.
    pub name: &'static str,
    pub table: &'static str,
    /// Expansion joins that are meaningful for this family.
    pub joins: &'static [JoinKind],
}

impl EntityFamily {
    pub fn supports(&self, join: JoinKind) -> bool {
        self.joins.contains(&join)
    }
}

/// Administrative divisions (`ADM1`..`ADM4`). Never joins `ADM1` onto itself.
pub static ADMIN_DIVISIONS: EntityFamily = EntityFamily {
    name: "admin_division",
    table: "admin_divisions",
    joins: &[JoinKind::Country],
};

/// Populated places.
pub static CITIES: EntityFamily = EntityFamily {
    name: "city",
    table: "cities",
    joins: &[
        JoinKind::Country,
        JoinKind::Admin1,
        JoinKind::Admin1AlternateName,
    ],
};
