//! Generic Geoname-family repository.
//!
//! # Responsibility
//! - Serve admin divisions and cities through one implementation driven by
//!   an [`EntityFamily`] descriptor.
//! - Execute composed query plans and assemble enriched rows.
//!
//! # Invariants
//! - `save` overwrites every mapped column of an existing row.
//! - Filtered reads never drop a base row because an expansion join misses.

use super::family::{EntityFamily, ADMIN_DIVISIONS, CITIES, GEONAME_COLUMNS};
use super::{count_rows, delete_all, BulkStore, RepoResult};
use crate::model::enriched::EnrichedGeoname;
use crate::model::geoname::{Geoname, GeonameId};
use crate::query::assemble::{assemble_row, geoname_from_row};
use crate::query::filter::GeonameFilter;
use crate::query::plan::compose;
use log::debug;
use rusqlite::{params, params_from_iter, Connection, Statement};

/// Repository interface for one Geoname-family table.
pub trait GeonameRepository: BulkStore<Geoname> {
    fn find_by_id(&self, id: GeonameId) -> RepoResult<Option<Geoname>>;
    /// Filtered, paginated and optionally enriched listing.
    fn find_all(&self, filter: &GeonameFilter) -> RepoResult<Vec<EnrichedGeoname>>;
    /// Inserts, or replaces every mapped field of the row with the same id.
    fn save(&self, geoname: &Geoname) -> RepoResult<()>;
}

/// SQLite-backed Geoname-family repository.
pub struct SqliteGeonameRepository<'conn> {
    conn: &'conn Connection,
    family: &'static EntityFamily,
}

impl<'conn> SqliteGeonameRepository<'conn> {
    pub fn new(conn: &'conn Connection, family: &'static EntityFamily) -> Self {
        Self { conn, family }
    }

    pub fn admin_divisions(conn: &'conn Connection) -> Self {
        Self::new(conn, &ADMIN_DIVISIONS)
    }

    pub fn cities(conn: &'conn Connection) -> Self {
        Self::new(conn, &CITIES)
    }

    fn insert_sql(&self) -> String {
        let placeholders: Vec<String> = (1..=GEONAME_COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.family.table,
            GEONAME_COLUMNS.join(", "),
            placeholders.join(", ")
        )
    }

    /// Upsert that overwrites every non-key column from the incoming row.
    fn upsert_sql(&self) -> String {
        let assignments: Vec<String> = GEONAME_COLUMNS
            .iter()
            .filter(|column| **column != "geoname_id")
            .map(|column| format!("{column} = excluded.{column}"))
            .collect();
        format!(
            "{} ON CONFLICT(geoname_id) DO UPDATE SET {};",
            self.insert_sql(),
            assignments.join(", ")
        )
    }
}

impl BulkStore<Geoname> for SqliteGeonameRepository<'_> {
    fn count_all(&self) -> RepoResult<u64> {
        count_rows(self.conn, self.family.table)
    }

    fn truncate(&self) -> RepoResult<()> {
        delete_all(self.conn, self.family.table)
    }

    fn bulk_insert(&self, entities: &[Geoname]) -> RepoResult<usize> {
        for geoname in entities {
            geoname.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&self.insert_sql())?;
            for geoname in entities {
                execute_geoname(&mut stmt, geoname)?;
            }
        }
        tx.commit()?;

        Ok(entities.len())
    }
}

impl GeonameRepository for SqliteGeonameRepository<'_> {
    fn find_by_id(&self, id: GeonameId) -> RepoResult<Option<Geoname>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} WHERE geoname_id = ?1;",
            GEONAME_COLUMNS.join(", "),
            self.family.table
        ))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(geoname_from_row(row)?));
        }

        Ok(None)
    }

    fn find_all(&self, filter: &GeonameFilter) -> RepoResult<Vec<EnrichedGeoname>> {
        let plan = compose(self.family, filter);
        debug!(
            "event=query_compose module=repo family={} params={} extra_columns={}",
            self.family.name,
            plan.params.len(),
            plan.extra_columns.len()
        );

        let mut stmt = self.conn.prepare(&plan.sql)?;
        let mut rows = stmt.query(params_from_iter(plan.params.iter()))?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(assemble_row(row, &plan.extra_columns)?);
        }

        Ok(results)
    }

    fn save(&self, geoname: &Geoname) -> RepoResult<()> {
        geoname.validate()?;

        let mut stmt = self.conn.prepare(&self.upsert_sql())?;
        execute_geoname(&mut stmt, geoname)?;
        Ok(())
    }
}

/// Binds a Geoname in `GEONAME_COLUMNS` order.
fn execute_geoname(stmt: &mut Statement<'_>, geoname: &Geoname) -> RepoResult<()> {
    stmt.execute(params![
        geoname.geoname_id,
        geoname.name.as_str(),
        geoname.latitude,
        geoname.longitude,
        geoname.feature_class.as_deref(),
        geoname.feature_code.as_deref(),
        geoname.country_code.as_deref(),
        geoname.admin1_code.as_deref(),
        geoname.admin2_code.as_deref(),
        geoname.admin3_code.as_deref(),
        geoname.admin4_code.as_deref(),
        geoname.population,
        geoname.timezone.as_deref(),
    ])?;
    Ok(())
}
