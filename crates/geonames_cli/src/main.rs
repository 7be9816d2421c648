//! geonames: command-line front end for `geonames_core`.
//!
//! Usage examples
//! --------------
//!
//! - Import dumps (order matters only for enriched reads)
//!   $ geonames import countries countryInfo.txt
//!   $ geonames import admin-divisions allCountries.txt
//!   $ geonames import cities allCountries.txt
//!   $ geonames import alternate-names alternateNamesV2.txt
//!
//! - Query
//!   $ geonames countries --continent EU
//!   $ geonames admin-divisions de --feature-code ADM1 --expand country
//!   $ geonames cities DE --min-population 100000 --expand admin1_localized --language de
//!
//! The store is chosen with `--database-url` or `GEONAMES_DATABASE_URL`.
mod args;

use crate::args::{CliArgs, Commands, ImportArgs, ImportFamily};
use anyhow::{anyhow, Context};
use clap::Parser;
use geonames_core::{
    default_log_level, init_logging, open_target, AdminDivisionListRequest, BulkStore,
    CityListRequest, CountryListRequest, DatabaseTarget, GeonameQueryService, ImportOrchestrator,
    SourceReader, SqliteAlternateNameRepository, SqliteCountryRepository,
    SqliteGeonameRepository, TsvSource,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rusqlite::Connection;
use serde::Serialize;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, args.log_dir.as_deref()).map_err(|err| anyhow!(err))?;

    let target = DatabaseTarget::parse(&args.database_url)
        .with_context(|| format!("resolving database url `{}`", args.database_url))?;
    let conn = open_target(&target).context("opening geonames store")?;

    match args.command {
        Commands::Import(import) => run_import_command(&conn, import),
        Commands::Countries(query) => {
            let service = GeonameQueryService::sqlite(&conn);
            print_json(&service.list_countries(&CountryListRequest {
                iso_alpha2: query.iso_alpha2,
                continent: query.continent,
                currency_code: query.currency_code,
                min_population: query.min_population,
                max_population: query.max_population,
            })?)
        }
        Commands::AdminDivisions(query) => {
            let service = GeonameQueryService::sqlite(&conn);
            print_json(&service.list_admin_divisions(&AdminDivisionListRequest {
                country_code: query.country_code,
                feature_code: query.feature_code,
                limit: query.limit,
                offset: query.offset,
                expand: query.expand,
            })?)
        }
        Commands::Cities(query) => {
            let service = GeonameQueryService::sqlite(&conn);
            print_json(&service.list_cities(&CityListRequest {
                country_code: query.country_code,
                admin1_code: query.admin1_code,
                admin2_code: query.admin2_code,
                min_population: query.min_population,
                language: query.language,
                limit: query.limit,
                offset: query.offset,
                expand: query.expand,
            })?)
        }
    }
}

fn run_import_command(conn: &Connection, args: ImportArgs) -> anyhow::Result<()> {
    let inserted = match args.family {
        ImportFamily::Countries => {
            let repo = SqliteCountryRepository::new(conn);
            let mut source = TsvSource::countries(&args.file).remove_on_cleanup(args.remove_after);
            import_with_progress(&repo, &mut source, "countries", args.batch_size)?
        }
        ImportFamily::AdminDivisions => {
            let repo = SqliteGeonameRepository::admin_divisions(conn);
            let mut source =
                TsvSource::admin_divisions(&args.file).remove_on_cleanup(args.remove_after);
            import_with_progress(&repo, &mut source, "admin_divisions", args.batch_size)?
        }
        ImportFamily::Cities => {
            let repo = SqliteGeonameRepository::cities(conn);
            let mut source = TsvSource::cities(&args.file).remove_on_cleanup(args.remove_after);
            import_with_progress(&repo, &mut source, "cities", args.batch_size)?
        }
        ImportFamily::AlternateNames => {
            let repo = SqliteAlternateNameRepository::new(conn);
            let mut source =
                TsvSource::alternate_names(&args.file).remove_on_cleanup(args.remove_after);
            import_with_progress(&repo, &mut source, "alternate_names", args.batch_size)?
        }
    };

    println!("imported {inserted} records from {}", args.file.display());
    Ok(())
}

fn import_with_progress<E>(
    repo: &dyn BulkStore<E>,
    source: &mut dyn SourceReader<E>,
    label: &'static str,
    batch_size: usize,
) -> anyhow::Result<u64> {
    let run = ImportOrchestrator::new(repo, source)
        .with_batch_size(batch_size)?
        .with_label(label)
        .execute()
        .with_context(|| format!("preparing {label} import"))?;

    if run.total_records == 0 {
        info!("event=cli_import module=cli status=skipped label={label}");
        return Ok(0);
    }

    let pb = ProgressBar::new(run.total_records);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let mut batches = run.batches;
    for batch in batches.by_ref() {
        match batch {
            Ok(count) => pb.inc(count as u64),
            Err(err) => {
                pb.abandon();
                return Err(err).with_context(|| format!("importing {label}"));
            }
        }
    }
    pb.finish();

    Ok(batches.inserted())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
