//! Country repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `save` on an existing country only overwrites fields whose incoming
//!   value is present; `None` keeps the stored value.
//! - `iso_alpha2` is unique across rows.

use super::{count_rows, delete_all, BulkStore, RepoResult};
use crate::model::country::Country;
use crate::model::geoname::GeonameId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Statement};

const COUNTRY_SELECT_SQL: &str = "SELECT
    geoname_id,
    iso_alpha2,
    iso_alpha3,
    country_name,
    capital,
    population,
    continent,
    currency_code,
    postal_code_format,
    postal_code_regex
FROM countries";

const COUNTRY_INSERT_SQL: &str = "INSERT INTO countries (
    geoname_id,
    iso_alpha2,
    iso_alpha3,
    country_name,
    capital,
    population,
    continent,
    currency_code,
    postal_code_format,
    postal_code_regex
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

/// Non-null-wins field update for existing countries.
const COUNTRY_UPSERT_SQL: &str = "ON CONFLICT(geoname_id) DO UPDATE SET
    iso_alpha2 = excluded.iso_alpha2,
    iso_alpha3 = COALESCE(excluded.iso_alpha3, countries.iso_alpha3),
    country_name = excluded.country_name,
    capital = COALESCE(excluded.capital, countries.capital),
    population = COALESCE(excluded.population, countries.population),
    continent = COALESCE(excluded.continent, countries.continent),
    currency_code = COALESCE(excluded.currency_code, countries.currency_code),
    postal_code_format = COALESCE(excluded.postal_code_format, countries.postal_code_format),
    postal_code_regex = COALESCE(excluded.postal_code_regex, countries.postal_code_regex);";

/// Filter options for country listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryFilter {
    pub iso_alpha2: Option<String>,
    pub continent: Option<String>,
    pub currency_code: Option<String>,
    /// Inclusive lower bound.
    pub min_population: Option<i64>,
    /// Inclusive upper bound.
    pub max_population: Option<i64>,
}

/// Repository interface for countries.
pub trait CountryRepository: BulkStore<Country> {
    fn find_by_id(&self, id: GeonameId) -> RepoResult<Option<Country>>;
    fn find_by_iso_alpha2(&self, iso_alpha2: &str) -> RepoResult<Option<Country>>;
    fn find_all(&self, filter: &CountryFilter) -> RepoResult<Vec<Country>>;
    /// Inserts, or merges non-null incoming fields into the stored row.
    fn save(&self, country: &Country) -> RepoResult<()>;
}

/// SQLite-backed country repository.
pub struct SqliteCountryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCountryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn find_one(&self, column: &str, value: Value) -> RepoResult<Option<Country>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COUNTRY_SELECT_SQL} WHERE {column} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_country_row(row)?));
        }
        Ok(None)
    }
}

impl BulkStore<Country> for SqliteCountryRepository<'_> {
    fn count_all(&self) -> RepoResult<u64> {
        count_rows(self.conn, "countries")
    }

    fn truncate(&self) -> RepoResult<()> {
        delete_all(self.conn, "countries")
    }

    fn bulk_insert(&self, entities: &[Country]) -> RepoResult<usize> {
        for country in entities {
            country.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(COUNTRY_INSERT_SQL)?;
            for country in entities {
                execute_country(&mut stmt, country)?;
            }
        }
        tx.commit()?;

        Ok(entities.len())
    }
}

impl CountryRepository for SqliteCountryRepository<'_> {
    fn find_by_id(&self, id: GeonameId) -> RepoResult<Option<Country>> {
        self.find_one("geoname_id", Value::Integer(id))
    }

    fn find_by_iso_alpha2(&self, iso_alpha2: &str) -> RepoResult<Option<Country>> {
        self.find_one("iso_alpha2", Value::Text(iso_alpha2.to_ascii_uppercase()))
    }

    fn find_all(&self, filter: &CountryFilter) -> RepoResult<Vec<Country>> {
        let mut sql = format!("{COUNTRY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(iso) = filter.iso_alpha2.as_ref() {
            sql.push_str(" AND iso_alpha2 = ?");
            bind_values.push(Value::Text(iso.clone()));
        }
        if let Some(continent) = filter.continent.as_ref() {
            sql.push_str(" AND continent = ?");
            bind_values.push(Value::Text(continent.clone()));
        }
        if let Some(currency) = filter.currency_code.as_ref() {
            sql.push_str(" AND currency_code = ?");
            bind_values.push(Value::Text(currency.clone()));
        }
        if let Some(min) = filter.min_population {
            sql.push_str(" AND population >= ?");
            bind_values.push(Value::Integer(min));
        }
        if let Some(max) = filter.max_population {
            sql.push_str(" AND population <= ?");
            bind_values.push(Value::Integer(max));
        }

        sql.push_str(" ORDER BY iso_alpha2 ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut countries = Vec::new();
        while let Some(row) = rows.next()? {
            countries.push(parse_country_row(row)?);
        }

        Ok(countries)
    }

    fn save(&self, country: &Country) -> RepoResult<()> {
        country.validate()?;

        let mut stmt = self
            .conn
            .prepare(&format!("{COUNTRY_INSERT_SQL} {COUNTRY_UPSERT_SQL}"))?;
        execute_country(&mut stmt, country)?;
        Ok(())
    }
}

fn execute_country(stmt: &mut Statement<'_>, country: &Country) -> RepoResult<()> {
    stmt.execute(params![
        country.geoname_id,
        country.iso_alpha2.as_str(),
        country.iso_alpha3.as_deref(),
        country.country_name.as_str(),
        country.capital.as_deref(),
        country.population,
        country.continent.as_deref(),
        country.currency_code.as_deref(),
        country.postal_code_format.as_deref(),
        country.postal_code_regex.as_deref(),
    ])?;
    Ok(())
}

fn parse_country_row(row: &Row<'_>) -> RepoResult<Country> {
    Ok(Country {
        geoname_id: row.get("geoname_id")?,
        iso_alpha2: row.get("iso_alpha2")?,
        iso_alpha3: row.get("iso_alpha3")?,
        country_name: row.get("country_name")?,
        capital: row.get("capital")?,
        population: row.get("population")?,
        continent: row.get("continent")?,
        currency_code: row.get("currency_code")?,
        postal_code_format: row.get("postal_code_format")?,
        postal_code_regex: row.get("postal_code_regex")?,
    })
}
