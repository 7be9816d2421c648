//! Core domain logic for the GeoNames reference store.
//! Bulk import, repositories and query composition live here; callers only
//! wire connections and present results.

pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, open_target, DatabaseTarget, DbError, DbResult};
pub use import::{
    ImportBatches, ImportError, ImportOrchestrator, ImportResult, ImportRun, SourceError,
    SourceReader, TsvSource,
};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::alternate_name::AlternateName;
pub use model::country::Country;
pub use model::enriched::EnrichedGeoname;
pub use model::geoname::{AdminLevel, Geoname, GeonameId};
pub use model::EntityValidationError;
pub use query::expansion::{resolve, Expansion, ExpansionPlan};
pub use query::filter::GeonameFilter;
pub use query::{QueryError, QueryResult};
pub use repo::alternate_name_repo::{AlternateNameRepository, SqliteAlternateNameRepository};
pub use repo::country_repo::{CountryFilter, CountryRepository, SqliteCountryRepository};
pub use repo::geoname_repo::{GeonameRepository, SqliteGeonameRepository};
pub use repo::{BulkStore, RepoError, RepoResult};
pub use service::query_service::{
    AdminDivisionListRequest, CityListRequest, CountryListRequest, GeonameQueryService,
};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
