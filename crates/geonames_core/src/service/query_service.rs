//! Read-side use cases over the reference store.
//!
//! # Responsibility
//! - Validate and normalize caller input before it reaches a filter.
//! - Apply pagination defaults and bounds.
//! - Delegate retrieval to repository implementations.
//!
//! # Invariants
//! - Country codes are two ASCII letters and are stored uppercase.
//! - `limit` is within `1..=MAX_LIMIT`; an absent limit means `DEFAULT_LIMIT`.

use super::{ServiceError, ServiceResult};
use crate::model::country::Country;
use crate::model::enriched::EnrichedGeoname;
use crate::query::expansion::parse_expansions;
use crate::query::filter::{GeonameFilter, DEFAULT_ISO_LANGUAGE};
use crate::repo::country_repo::{CountryFilter, CountryRepository, SqliteCountryRepository};
use crate::repo::geoname_repo::{GeonameRepository, SqliteGeonameRepository};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

static COUNTRY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2}$").expect("valid country code regex"));
static CURRENCY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{3}$").expect("valid currency code regex"));
static ADMIN_FEATURE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)ADM[1-4]$").expect("valid feature code regex"));
static LANGUAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)[a-z]{2}(-[a-z]{2})?$").expect("valid language regex"));

/// Country listing input. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryListRequest {
    pub iso_alpha2: Option<String>,
    pub continent: Option<String>,
    pub currency_code: Option<String>,
    pub min_population: Option<i64>,
    pub max_population: Option<i64>,
}

/// Admin-division listing input for one country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminDivisionListRequest {
    pub country_code: String,
    /// `ADM1`..`ADM4`, any case.
    pub feature_code: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Raw expansion tokens.
    pub expand: Vec<String>,
}

/// City listing input for one country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityListRequest {
    pub country_code: String,
    pub admin1_code: Option<String>,
    pub admin2_code: Option<String>,
    pub min_population: Option<i64>,
    /// Language tag for localized admin1 names, e.g. `de` or `pt-br`.
    pub language: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub expand: Vec<String>,
}

/// Query facade over the country, admin-division and city repositories.
pub struct GeonameQueryService<C, G>
where
    C: CountryRepository,
    G: GeonameRepository,
{
    countries: C,
    admin_divisions: G,
    cities: G,
}

impl<'conn> GeonameQueryService<SqliteCountryRepository<'conn>, SqliteGeonameRepository<'conn>> {
    /// Builds the service over SQLite repositories sharing one connection.
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteCountryRepository::new(conn),
            SqliteGeonameRepository::admin_divisions(conn),
            SqliteGeonameRepository::cities(conn),
        )
    }
}

impl<C, G> GeonameQueryService<C, G>
where
    C: CountryRepository,
    G: GeonameRepository,
{
    pub fn new(countries: C, admin_divisions: G, cities: G) -> Self {
        Self {
            countries,
            admin_divisions,
            cities,
        }
    }

    /// Lists countries ordered by ISO code.
    ///
    /// # Errors
    /// - `InvalidInput` for malformed codes or negative population bounds.
    pub fn list_countries(&self, request: &CountryListRequest) -> ServiceResult<Vec<Country>> {
        let filter = CountryFilter {
            iso_alpha2: request
                .iso_alpha2
                .as_deref()
                .map(|code| normalize_code(&COUNTRY_CODE_RE, "iso_alpha2", code))
                .transpose()?,
            continent: request
                .continent
                .as_deref()
                .map(|code| normalize_code(&COUNTRY_CODE_RE, "continent", code))
                .transpose()?,
            currency_code: request
                .currency_code
                .as_deref()
                .map(|code| normalize_code(&CURRENCY_CODE_RE, "currency_code", code))
                .transpose()?,
            min_population: non_negative("min_population", request.min_population)?,
            max_population: non_negative("max_population", request.max_population)?,
        };

        Ok(self.countries.find_all(&filter)?)
    }

    /// Lists admin divisions of one country.
    ///
    /// # Errors
    /// - `InvalidInput` for a malformed country or feature code, or an out-of-range limit.
    /// - `Query` for unknown expansion tokens.
    pub fn list_admin_divisions(
        &self,
        request: &AdminDivisionListRequest,
    ) -> ServiceResult<Vec<EnrichedGeoname>> {
        let feature_code = match request.feature_code.as_deref() {
            Some(code) if !ADMIN_FEATURE_CODE_RE.is_match(code.trim()) => {
                return Err(ServiceError::InvalidInput(format!(
                    "feature_code must be ADM1..ADM4, got `{code}`"
                )))
            }
            Some(code) => Some(code.trim().to_ascii_uppercase()),
            None => None,
        };

        let filter = GeonameFilter {
            country_code: Some(normalize_code(
                &COUNTRY_CODE_RE,
                "country_code",
                &request.country_code,
            )?),
            feature_code,
            limit: Some(checked_limit(request.limit)?),
            offset: Some(request.offset.unwrap_or(0)),
            expand: parse_expansions(&request.expand)?,
            ..GeonameFilter::default()
        };

        self.run(&self.admin_divisions, &filter)
    }

    /// Lists cities of one country.
    ///
    /// # Errors
    /// - `InvalidInput` for malformed codes, languages, bounds or limits.
    /// - `Query` for unknown expansion tokens.
    pub fn list_cities(&self, request: &CityListRequest) -> ServiceResult<Vec<EnrichedGeoname>> {
        let iso_language = match request.language.as_deref() {
            Some(language) if !LANGUAGE_RE.is_match(language.trim()) => {
                return Err(ServiceError::InvalidInput(format!(
                    "language must look like `xx` or `xx-YY`, got `{language}`"
                )))
            }
            Some(language) => language.trim().to_ascii_lowercase(),
            None => DEFAULT_ISO_LANGUAGE.to_string(),
        };

        let filter = GeonameFilter {
            country_code: Some(normalize_code(
                &COUNTRY_CODE_RE,
                "country_code",
                &request.country_code,
            )?),
            admin1_code: optional_code("admin1_code", request.admin1_code.as_deref())?,
            admin2_code: optional_code("admin2_code", request.admin2_code.as_deref())?,
            min_population: non_negative("min_population", request.min_population)?,
            limit: Some(checked_limit(request.limit)?),
            offset: Some(request.offset.unwrap_or(0)),
            expand: parse_expansions(&request.expand)?,
            iso_language,
            ..GeonameFilter::default()
        };

        self.run(&self.cities, &filter)
    }

    fn run(&self, repo: &G, filter: &GeonameFilter) -> ServiceResult<Vec<EnrichedGeoname>> {
        let rows = repo.find_all(filter)?;
        debug!(
            "event=service_query module=service status=ok rows={} expand={}",
            rows.len(),
            filter.expand.len()
        );
        Ok(rows)
    }
}

fn normalize_code(pattern: &Regex, field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if !pattern.is_match(trimmed) {
        return Err(ServiceError::InvalidInput(format!(
            "{field} has invalid format: `{value}`"
        )));
    }
    Ok(trimmed.to_ascii_uppercase())
}

fn optional_code(field: &str, value: Option<&str>) -> ServiceResult<Option<String>> {
    match value.map(str::trim) {
        None => Ok(None),
        Some(code) if code.is_empty() || code.chars().count() > 10 => Err(
            ServiceError::InvalidInput(format!("{field} must be 1 to 10 characters")),
        ),
        Some(code) => Ok(Some(code.to_string())),
    }
}

fn non_negative(field: &str, value: Option<i64>) -> ServiceResult<Option<i64>> {
    match value {
        Some(number) if number < 0 => Err(ServiceError::InvalidInput(format!(
            "{field} must be >= 0, got {number}"
        ))),
        other => Ok(other),
    }
}

fn checked_limit(limit: Option<u32>) -> ServiceResult<u32> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ServiceError::InvalidInput(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {limit}"
        )));
    }
    Ok(limit)
}
