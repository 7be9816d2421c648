//! Row → read-model assembly for composed Geoname queries.

use super::expansion::ExtraField;
use crate::model::enriched::EnrichedGeoname;
use crate::model::geoname::Geoname;
use rusqlite::Row;

/// Reads the base Geoname columns by name.
pub fn geoname_from_row(row: &Row<'_>) -> rusqlite::Result<Geoname> {
    Ok(Geoname {
        geoname_id: row.get("geoname_id")?,
        name: row.get("name")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        feature_class: row.get("feature_class")?,
        feature_code: row.get("feature_code")?,
        country_code: row.get("country_code")?,
        admin1_code: row.get("admin1_code")?,
        admin2_code: row.get("admin2_code")?,
        admin3_code: row.get("admin3_code")?,
        admin4_code: row.get("admin4_code")?,
        population: row.get("population")?,
        timezone: row.get("timezone")?,
    })
}

/// Merges the base columns and whichever expansion columns the plan selected.
///
/// A NULL from a left-outer join stays `None`; fields that were not selected
/// are left `None` as well.
pub fn assemble_row(row: &Row<'_>, extra_columns: &[ExtraField]) -> rusqlite::Result<EnrichedGeoname> {
    let mut enriched = EnrichedGeoname::plain(geoname_from_row(row)?);
    for field in extra_columns {
        let value: Option<String> = row.get(field.column())?;
        match field {
            ExtraField::CountryName => enriched.country_name = value,
            ExtraField::PostalCodeRegex => enriched.postal_code_regex = value,
            ExtraField::Admin1Name => enriched.admin1_name = value,
        }
    }
    Ok(enriched)
}
