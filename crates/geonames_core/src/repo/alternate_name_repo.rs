//! Alternate-name repository.
//!
//! `save` merges by `alternate_name_id`: the incoming row replaces the stored
//! one wholesale.

use super::{bool_to_int, count_rows, delete_all, BulkStore, RepoError, RepoResult};
use crate::model::alternate_name::AlternateName;
use crate::model::geoname::GeonameId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Statement};

const ALTERNATE_NAME_SELECT_SQL: &str = "SELECT
    alternate_name_id,
    geoname_id,
    iso_language,
    alternate_name,
    is_preferred_name,
    is_short_name,
    is_colloquial,
    is_historic
FROM alternate_names";

const ALTERNATE_NAME_COLUMNS_SQL: &str = "(
    alternate_name_id,
    geoname_id,
    iso_language,
    alternate_name,
    is_preferred_name,
    is_short_name,
    is_colloquial,
    is_historic
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);";

pub trait AlternateNameRepository: BulkStore<AlternateName> {
    fn find_by_id(&self, id: i64) -> RepoResult<Option<AlternateName>>;
    /// Names of one geoname, optionally restricted to a language tag.
    fn find_by_geoname_id(
        &self,
        geoname_id: GeonameId,
        iso_language: Option<&str>,
    ) -> RepoResult<Vec<AlternateName>>;
    fn save(&self, name: &AlternateName) -> RepoResult<()>;
}

pub struct SqliteAlternateNameRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAlternateNameRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BulkStore<AlternateName> for SqliteAlternateNameRepository<'_> {
    fn count_all(&self) -> RepoResult<u64> {
        count_rows(self.conn, "alternate_names")
    }

    fn truncate(&self) -> RepoResult<()> {
        delete_all(self.conn, "alternate_names")
    }

    fn bulk_insert(&self, entities: &[AlternateName]) -> RepoResult<usize> {
        for name in entities {
            name.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO alternate_names {ALTERNATE_NAME_COLUMNS_SQL}"
            ))?;
            for name in entities {
                execute_alternate_name(&mut stmt, name)?;
            }
        }
        tx.commit()?;

        Ok(entities.len())
    }
}

impl AlternateNameRepository for SqliteAlternateNameRepository<'_> {
    fn find_by_id(&self, id: i64) -> RepoResult<Option<AlternateName>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ALTERNATE_NAME_SELECT_SQL} WHERE alternate_name_id = ?1;"
        ))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_alternate_name_row(row)?));
        }
        Ok(None)
    }

    fn find_by_geoname_id(
        &self,
        geoname_id: GeonameId,
        iso_language: Option<&str>,
    ) -> RepoResult<Vec<AlternateName>> {
        let mut sql = format!("{ALTERNATE_NAME_SELECT_SQL} WHERE geoname_id = ?");
        let mut bind_values = vec![Value::Integer(geoname_id)];
        if let Some(language) = iso_language {
            sql.push_str(" AND iso_language = ?");
            bind_values.push(Value::Text(language.to_string()));
        }
        sql.push_str(" ORDER BY alternate_name_id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(parse_alternate_name_row(row)?);
        }
        Ok(names)
    }

    fn save(&self, name: &AlternateName) -> RepoResult<()> {
        name.validate()?;

        let mut stmt = self.conn.prepare(&format!(
            "INSERT OR REPLACE INTO alternate_names {ALTERNATE_NAME_COLUMNS_SQL}"
        ))?;
        execute_alternate_name(&mut stmt, name)?;
        Ok(())
    }
}

fn execute_alternate_name(stmt: &mut Statement<'_>, name: &AlternateName) -> RepoResult<()> {
    stmt.execute(params![
        name.alternate_name_id,
        name.geoname_id,
        name.iso_language.as_deref(),
        name.alternate_name.as_str(),
        bool_to_int(name.is_preferred),
        bool_to_int(name.is_short),
        bool_to_int(name.is_colloquial),
        bool_to_int(name.is_historic),
    ])?;
    Ok(())
}

fn parse_alternate_name_row(row: &Row<'_>) -> RepoResult<AlternateName> {
    Ok(AlternateName {
        alternate_name_id: row.get("alternate_name_id")?,
        geoname_id: row.get("geoname_id")?,
        iso_language: row.get("iso_language")?,
        alternate_name: row.get("alternate_name")?,
        is_preferred: parse_flag(row, "is_preferred_name")?,
        is_short: parse_flag(row, "is_short_name")?,
        is_colloquial: parse_flag(row, "is_colloquial")?,
        is_historic: parse_flag(row, "is_historic")?,
    })
}

fn parse_flag(row: &Row<'_>, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in alternate_names.{column}"
        ))),
    }
}
