use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the geonames store
#[derive(Debug, Parser)]
#[command(
    name = "geonames",
    version,
    about = "Import GeoNames dumps into SQLite and query countries, admin divisions and cities"
)]
pub struct CliArgs {
    /// Storage target: `sqlite://<path>`, `sqlite::memory:` or a bare file path
    #[arg(
        long = "database-url",
        env = "GEONAMES_DATABASE_URL",
        default_value = "sqlite://geonames.db",
        global = true
    )]
    pub database_url: String,

    /// Log level (trace|debug|info|warn|error); defaults by build mode
    #[arg(long = "log-level", env = "GEONAMES_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files; logs go to stderr when unset
    #[arg(long = "log-dir", env = "GEONAMES_LOG_DIR", global = true)]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load a local GeoNames dump file into the store
    Import(ImportArgs),

    /// List countries as JSON
    Countries(CountryArgs),

    /// List admin divisions of a country as JSON
    AdminDivisions(AdminDivisionArgs),

    /// List cities of a country as JSON
    Cities(CityArgs),
}

/// Dataset family an import file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportFamily {
    /// countryInfo.txt
    Countries,
    /// Geoname dump rows with feature class A and ADM1..ADM4
    AdminDivisions,
    /// Geoname dump rows with feature class P
    Cities,
    /// alternateNamesV2.txt
    AlternateNames,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[arg(value_enum)]
    pub family: ImportFamily,

    /// Tab-separated dump file
    pub file: PathBuf,

    /// Entities per insert transaction
    #[arg(long = "batch-size", default_value_t = geonames_core::import::DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Delete the dump file once the import finishes
    #[arg(long = "remove-after")]
    pub remove_after: bool,
}

#[derive(Debug, Args)]
pub struct CountryArgs {
    #[arg(long = "iso-alpha2")]
    pub iso_alpha2: Option<String>,

    #[arg(long)]
    pub continent: Option<String>,

    #[arg(long = "currency-code")]
    pub currency_code: Option<String>,

    #[arg(long = "min-population")]
    pub min_population: Option<i64>,

    #[arg(long = "max-population")]
    pub max_population: Option<i64>,
}

#[derive(Debug, Args)]
pub struct AdminDivisionArgs {
    /// ISO 3166-1 alpha-2 code (e.g. DE)
    pub country_code: String,

    /// ADM1..ADM4
    #[arg(long = "feature-code")]
    pub feature_code: Option<String>,

    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long)]
    pub offset: Option<u32>,

    /// Comma-separated expansions (e.g. country)
    #[arg(long, value_delimiter = ',')]
    pub expand: Vec<String>,
}

#[derive(Debug, Args)]
pub struct CityArgs {
    /// ISO 3166-1 alpha-2 code (e.g. DE)
    pub country_code: String,

    #[arg(long = "admin1-code")]
    pub admin1_code: Option<String>,

    #[arg(long = "admin2-code")]
    pub admin2_code: Option<String>,

    #[arg(long = "min-population")]
    pub min_population: Option<i64>,

    /// Language for localized admin1 names (e.g. de, pt-BR)
    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long)]
    pub offset: Option<u32>,

    /// Comma-separated expansions (country, admin1, admin1_localized)
    #[arg(long, value_delimiter = ',')]
    pub expand: Vec<String>,
}
