//! SQLite storage bootstrap, storage-target resolution and schema migrations.
//!
//! # Responsibility
//! - Resolve a connection string into a concrete storage target.
//! - Open and configure SQLite connections for the geonames store.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Repositories must not read/write rows before migrations succeed.
//! - An unresolvable storage target is fatal at startup and never retried.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod target;

pub use open::{open_db, open_db_in_memory, open_target, CASE_FOLD_FN};
pub use target::DatabaseTarget;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection string does not name a storage backend this crate can open.
    UnsupportedConfiguration(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::UnsupportedConfiguration(message) => {
                write!(f, "unsupported storage configuration: {message}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::UnsupportedConfiguration(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
