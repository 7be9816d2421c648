//! Repository contracts and SQLite implementations, one per entity family.
//!
//! # Responsibility
//! - Provide lookup, upsert, bulk insert, truncate and count per family.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every write validates entities before any SQL mutation.
//! - `bulk_insert` commits a whole batch in one transaction or nothing.
//! - Deletion is table-level truncate only.

use crate::db::DbError;
use crate::model::EntityValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod alternate_name_repo;
pub mod country_repo;
pub mod family;
pub mod geoname_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error shared by all repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Entity was refused before touching storage.
    MalformedEntity(EntityValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedEntity(err) => write!(f, "malformed entity: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedEntity(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<EntityValidationError> for RepoError {
    fn from(value: EntityValidationError) -> Self {
        Self::MalformedEntity(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Write-path contract the import pipeline needs from a store.
pub trait BulkStore<E> {
    /// Number of rows currently stored.
    fn count_all(&self) -> RepoResult<u64>;
    /// Removes every row.
    fn truncate(&self) -> RepoResult<()>;
    /// Inserts `entities` in a single transaction and returns how many were written.
    fn bulk_insert(&self, entities: &[E]) -> RepoResult<usize>;
}

pub(crate) fn count_rows(conn: &Connection, table: &str) -> RepoResult<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative row count in {table}")))
}

pub(crate) fn delete_all(conn: &Connection, table: &str) -> RepoResult<()> {
    conn.execute(&format!("DELETE FROM {table};"), [])?;
    Ok(())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
