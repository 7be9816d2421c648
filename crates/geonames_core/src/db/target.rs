//! Connection-string resolution.
//!
//! Accepted forms:
//! - `sqlite::memory:` for a private in-memory database.
//! - `sqlite://<path>` (`sqlite:///abs/path.db` for absolute paths).
//! - A bare filesystem path without a URL scheme.
//!
//! Anything else (`postgresql://`, `mysql://`, ...) is rejected with
//! [`DbError::UnsupportedConfiguration`].

use super::{DbError, DbResult};
use std::path::PathBuf;

const SQLITE_SCHEME: &str = "sqlite://";
const SQLITE_MEMORY: &str = "sqlite::memory:";

/// Resolved storage target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

impl DatabaseTarget {
    /// Parses a connection string into a storage target.
    ///
    /// # Errors
    /// - `UnsupportedConfiguration` for blank input, a foreign URL scheme,
    ///   or a `sqlite://` URL without a path.
    pub fn parse(url: &str) -> DbResult<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(DbError::UnsupportedConfiguration(
                "database url cannot be empty".to_string(),
            ));
        }

        if trimmed.eq_ignore_ascii_case(SQLITE_MEMORY) || trimmed == ":memory:" {
            return Ok(Self::Memory);
        }

        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with(SQLITE_SCHEME) {
            let path = &trimmed[SQLITE_SCHEME.len()..];
            if path.is_empty() {
                return Err(DbError::UnsupportedConfiguration(format!(
                    "sqlite url `{trimmed}` has no database path"
                )));
            }
            return Ok(Self::File(PathBuf::from(path)));
        }

        if let Some((scheme, _)) = trimmed.split_once("://") {
            return Err(DbError::UnsupportedConfiguration(format!(
                "unsupported database scheme `{scheme}` in `{trimmed}`"
            )));
        }

        Ok(Self::File(PathBuf::from(trimmed)))
    }

    /// Short label used in log lines.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DatabaseTarget;
    use crate::db::DbError;
    use std::path::PathBuf;

    #[test]
    fn parses_memory_target() {
        assert_eq!(
            DatabaseTarget::parse("sqlite::memory:").unwrap(),
            DatabaseTarget::Memory
        );
        assert_eq!(
            DatabaseTarget::parse(" :memory: ").unwrap(),
            DatabaseTarget::Memory
        );
    }

    #[test]
    fn parses_sqlite_url_and_bare_path() {
        assert_eq!(
            DatabaseTarget::parse("sqlite:///var/lib/geonames.db").unwrap(),
            DatabaseTarget::File(PathBuf::from("/var/lib/geonames.db"))
        );
        assert_eq!(
            DatabaseTarget::parse("sqlite://data/geonames.db").unwrap(),
            DatabaseTarget::File(PathBuf::from("data/geonames.db"))
        );
        assert_eq!(
            DatabaseTarget::parse("geonames.db").unwrap(),
            DatabaseTarget::File(PathBuf::from("geonames.db"))
        );
    }

    #[test]
    fn rejects_foreign_schemes_and_blank_input() {
        for url in ["postgresql://localhost/geo", "mysql://root@db/geo", "  ", "sqlite://"] {
            let err = DatabaseTarget::parse(url).expect_err("url should be rejected");
            assert!(
                matches!(err, DbError::UnsupportedConfiguration(_)),
                "unexpected error for `{url}`: {err}"
            );
        }
    }
}
