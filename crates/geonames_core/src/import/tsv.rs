//! File-backed reader for the tab-separated GeoNames dump formats.
//!
//! Supported layouts:
//! - `countryInfo.txt` (comment lines start with `#`).
//! - Geoname dumps such as `allCountries.txt` or `DE.txt` (19 columns),
//!   split into admin divisions (`A` / `ADM1`..`ADM4`) and cities (`P`).
//! - `alternateNamesV2.txt` (flags are `1` or empty).
//!
//! Rows are read with a `csv` reader configured for tab-delimited, unquoted
//! data with `#` comment lines and a varying column count. Counting and
//! loading apply the same record filter, so `count_total_records` always
//! matches what `load_entities` yields.

use super::source::{EntityStream, SourceError, SourceReader, SourceResult};
use crate::model::alternate_name::AlternateName;
use crate::model::country::Country;
use crate::model::geoname::{AdminLevel, Geoname};
use csv::{Reader, ReaderBuilder, StringRecord};
use log::debug;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Column layout and row mapping for one dump format.
pub struct TsvFormat<E> {
    pub name: &'static str,
    pub min_columns: usize,
    /// Decides whether a row belongs to this entity family.
    pub accept: fn(&StringRecord) -> bool,
    pub parse: fn(&StringRecord) -> Result<E, String>,
}

impl<E> Clone for TsvFormat<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for TsvFormat<E> {}

impl<E> TsvFormat<E> {
    /// True for non-blank records that belong to this format's family.
    fn selects(&self, record: &StringRecord) -> bool {
        !is_blank(record) && (self.accept)(record)
    }

    fn read(&self, record: &StringRecord) -> SourceResult<E> {
        let line = line_of(record);
        if record.len() < self.min_columns {
            return Err(SourceError::Parse {
                line,
                message: format!(
                    "{} row has {} columns, expected at least {}",
                    self.name,
                    record.len(),
                    self.min_columns
                ),
            });
        }
        (self.parse)(record).map_err(|message| SourceError::Parse { line, message })
    }
}

pub const COUNTRY_INFO: TsvFormat<Country> = TsvFormat {
    name: "country_info",
    min_columns: 17,
    accept: accept_all,
    parse: parse_country,
};

pub const ADMIN_DIVISIONS: TsvFormat<Geoname> = TsvFormat {
    name: "admin_divisions",
    min_columns: 19,
    accept: accept_admin_division,
    parse: parse_geoname,
};

pub const CITIES: TsvFormat<Geoname> = TsvFormat {
    name: "cities",
    min_columns: 19,
    accept: accept_city,
    parse: parse_geoname,
};

pub const ALTERNATE_NAMES: TsvFormat<AlternateName> = TsvFormat {
    name: "alternate_names",
    min_columns: 4,
    accept: accept_all,
    parse: parse_alternate_name,
};

/// Source reader over one local dump file.
pub struct TsvSource<E> {
    path: PathBuf,
    format: TsvFormat<E>,
    remove_on_cleanup: bool,
}

impl<E: 'static> TsvSource<E> {
    pub fn new(path: impl AsRef<Path>, format: TsvFormat<E>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
            remove_on_cleanup: false,
        }
    }

    /// Deletes the file during cleanup, for dumps extracted to a scratch location.
    pub fn remove_on_cleanup(mut self, remove: bool) -> Self {
        self.remove_on_cleanup = remove;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> SourceResult<Reader<File>> {
        reader_builder()
            .from_path(&self.path)
            .map_err(|err| SourceError::Unavailable {
                path: self.path.clone(),
                message: err.to_string(),
            })
    }
}

impl TsvSource<Country> {
    pub fn countries(path: impl AsRef<Path>) -> Self {
        Self::new(path, COUNTRY_INFO)
    }
}

impl TsvSource<Geoname> {
    pub fn admin_divisions(path: impl AsRef<Path>) -> Self {
        Self::new(path, ADMIN_DIVISIONS)
    }

    pub fn cities(path: impl AsRef<Path>) -> Self {
        Self::new(path, CITIES)
    }
}

impl TsvSource<AlternateName> {
    pub fn alternate_names(path: impl AsRef<Path>) -> Self {
        Self::new(path, ALTERNATE_NAMES)
    }
}

impl<E: 'static> SourceReader<E> for TsvSource<E> {
    fn ensure_data_is_available(&mut self) -> SourceResult<()> {
        let metadata = std::fs::metadata(&self.path).map_err(|err| SourceError::Unavailable {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        if !metadata.is_file() {
            return Err(SourceError::Unavailable {
                path: self.path.clone(),
                message: "not a regular file".to_string(),
            });
        }
        Ok(())
    }

    fn count_total_records(&mut self) -> SourceResult<u64> {
        let mut reader = self.open()?;
        let mut count = 0u64;
        for result in reader.records() {
            let record = result?;
            if self.format.selects(&record) {
                count += 1;
            }
        }
        debug!(
            "event=source_count module=import format={} records={count}",
            self.format.name
        );
        Ok(count)
    }

    fn load_entities(&mut self) -> SourceResult<EntityStream<E>> {
        let format = self.format;
        let stream = self
            .open()?
            .into_records()
            .filter_map(move |result| match result {
                Ok(record) if format.selects(&record) => Some(format.read(&record)),
                Ok(_) => None,
                Err(err) => Some(Err(err.into())),
            });
        Ok(Box::new(stream))
    }

    fn cleanup(&mut self) -> SourceResult<()> {
        if !self.remove_on_cleanup {
            return Ok(());
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Tab-delimited, no header row, no quoting, `#` comments, ragged rows.
fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .comment(Some(b'#'));
    builder
}

/// 1-based line where the record starts.
fn line_of(record: &StringRecord) -> usize {
    record
        .position()
        .map(|pos| pos.line() as usize)
        .unwrap_or(0)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn accept_all(_record: &StringRecord) -> bool {
    true
}

fn accept_admin_division(record: &StringRecord) -> bool {
    record.get(6) == Some("A")
        && record
            .get(7)
            .and_then(AdminLevel::from_feature_code)
            .is_some()
}

fn accept_city(record: &StringRecord) -> bool {
    record.get(6) == Some("P")
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn required<T: std::str::FromStr>(
    record: &StringRecord,
    index: usize,
    column: &str,
) -> Result<T, String> {
    let raw = record[index].trim();
    raw.parse::<T>()
        .map_err(|_| format!("invalid {column} `{raw}` in column {}", index + 1))
}

fn optional_number(
    record: &StringRecord,
    index: usize,
    column: &str,
) -> Result<Option<i64>, String> {
    if record[index].trim().is_empty() {
        return Ok(None);
    }
    required(record, index, column).map(Some)
}

fn flag(record: &StringRecord, index: usize) -> bool {
    record.get(index).map(|value| value.trim() == "1").unwrap_or(false)
}

fn parse_geoname(record: &StringRecord) -> Result<Geoname, String> {
    Ok(Geoname {
        geoname_id: required(record, 0, "geonameid")?,
        name: record[1].trim().to_string(),
        latitude: required(record, 4, "latitude")?,
        longitude: required(record, 5, "longitude")?,
        feature_class: optional(&record[6]),
        feature_code: optional(&record[7]),
        country_code: optional(&record[8]),
        admin1_code: optional(&record[10]),
        admin2_code: optional(&record[11]),
        admin3_code: optional(&record[12]),
        admin4_code: optional(&record[13]),
        population: optional_number(record, 14, "population")?.unwrap_or(0),
        timezone: optional(&record[17]),
    })
}

fn parse_country(record: &StringRecord) -> Result<Country, String> {
    Ok(Country {
        geoname_id: required(record, 16, "geonameid")?,
        iso_alpha2: record[0].trim().to_ascii_uppercase(),
        iso_alpha3: optional(&record[1]),
        country_name: record[4].trim().to_string(),
        capital: optional(&record[5]),
        population: optional_number(record, 7, "population")?,
        continent: optional(&record[8]),
        currency_code: optional(&record[10]),
        postal_code_format: optional(&record[13]),
        postal_code_regex: optional(&record[14]),
    })
}

fn parse_alternate_name(record: &StringRecord) -> Result<AlternateName, String> {
    Ok(AlternateName {
        alternate_name_id: required(record, 0, "alternateNameId")?,
        geoname_id: required(record, 1, "geonameid")?,
        iso_language: optional(&record[2]),
        alternate_name: record[3].trim().to_string(),
        is_preferred: flag(record, 4),
        is_short: flag(record, 5),
        is_colloquial: flag(record, 6),
        is_historic: flag(record, 7),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        parse_alternate_name, parse_country, parse_geoname, reader_builder, TsvFormat, TsvSource,
        ADMIN_DIVISIONS, CITIES,
    };
    use crate::import::source::{SourceError, SourceReader};
    use csv::StringRecord;
    use std::io::Write;

    const BERLIN: &str = "2950159\tBerlin\tBerlin\tBerlino\t52.52437\t13.41053\tP\tPPLC\tDE\t\t16\t00\t11000\t11000000\t3426354\t\t74\tEurope/Berlin\t2022-03-09";
    const BAVARIA: &str = "2951839\tBavaria\tBavaria\t\t49.0\t11.5\tA\tADM1\tDE\t\t02\t\t\t\t12520000\t\t500\tEurope/Berlin\t2021-01-01";

    fn records(data: &str) -> Vec<StringRecord> {
        reader_builder()
            .from_reader(data.as_bytes())
            .records()
            .map(Result::unwrap)
            .collect()
    }

    fn selected<E>(format: &TsvFormat<E>, data: &str) -> usize {
        records(data)
            .iter()
            .filter(|record| format.selects(record))
            .count()
    }

    #[test]
    fn parses_geoname_row() {
        let city = parse_geoname(&records(BERLIN)[0]).unwrap();

        assert_eq!(city.geoname_id, 2950159);
        assert_eq!(city.name, "Berlin");
        assert_eq!(city.feature_code.as_deref(), Some("PPLC"));
        assert_eq!(city.admin1_code.as_deref(), Some("16"));
        assert_eq!(city.admin4_code.as_deref(), Some("11000000"));
        assert_eq!(city.population, 3426354);
        assert_eq!(city.timezone.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn parses_country_and_alternate_name_rows() {
        let country_line = "DE\tDEU\t276\tGM\tGermany\tBerlin\t357021\t82927922\tEU\t.de\tEUR\tEuro\t49\t#####\t^(\\d{5})$\tde\t2921044\tCH,PL\t";
        let country = parse_country(&records(country_line)[0]).unwrap();
        assert_eq!(country.iso_alpha2, "DE");
        assert_eq!(country.geoname_id, 2921044);
        assert_eq!(country.population, Some(82927922));
        assert_eq!(country.postal_code_format.as_deref(), Some("#####"));
        assert_eq!(country.postal_code_regex.as_deref(), Some("^(\\d{5})$"));

        let alt_line = "1\t2951839\tde\tBayern\t\t1\t\t\t\t";
        let alt = parse_alternate_name(&records(alt_line)[0]).unwrap();
        assert_eq!(alt.geoname_id, 2951839);
        assert_eq!(alt.iso_language.as_deref(), Some("de"));
        assert!(alt.is_short);
        assert!(!alt.is_preferred);
    }

    #[test]
    fn double_quotes_are_kept_as_literal_text() {
        let alt_line = "7\t5128581\ten\t\"Big Apple\" NYC\t\t\t1\t\t\t";
        let rows = records(alt_line);
        assert_eq!(rows[0].len(), 10);

        let alt = parse_alternate_name(&rows[0]).unwrap();
        assert_eq!(alt.alternate_name, "\"Big Apple\" NYC");
        assert!(alt.is_colloquial);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let data = format!("# ISO\tISO3\n\n   \n{BERLIN}\n{BAVARIA}\n");
        assert_eq!(selected(&CITIES, &data), 1);
        assert_eq!(selected(&ADMIN_DIVISIONS, &data), 1);
    }

    #[test]
    fn count_matches_loaded_rows_per_family() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{BERLIN}").unwrap();
        writeln!(file, "{BAVARIA}").unwrap();
        writeln!(file).unwrap();

        let mut cities = TsvSource::cities(file.path());
        cities.ensure_data_is_available().unwrap();
        assert_eq!(cities.count_total_records().unwrap(), 1);
        let loaded: Vec<_> = cities.load_entities().unwrap().collect();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].as_ref().unwrap().name, "Berlin");

        let mut admins = TsvSource::admin_divisions(file.path());
        assert_eq!(admins.count_total_records().unwrap(), 1);
        let loaded: Vec<_> = admins.load_entities().unwrap().collect();
        assert_eq!(loaded[0].as_ref().unwrap().name, "Bavaria");
    }

    #[test]
    fn malformed_rows_surface_parse_errors_with_line_numbers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{BERLIN}").unwrap();
        writeln!(file, "oops\tBroken\t\t\tnot-a-lat\t0\tP").unwrap();
        writeln!(file, "{BERLIN}").unwrap();

        let mut cities = TsvSource::cities(file.path());
        let results: Vec<_> = cities.load_entities().unwrap().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(SourceError::Parse { line: 2, .. })));
        assert!(results[2].is_ok());
    }

    #[test]
    fn invalid_utf8_is_reported_as_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{BERLIN}").unwrap();
        file.write_all(b"1\t\xff\xfe\t\t\t1.0\t1.0\tP\n").unwrap();

        let mut cities = TsvSource::cities(file.path());
        assert!(matches!(
            cities.count_total_records(),
            Err(SourceError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_unavailable_and_cleanup_can_remove_file() {
        let mut missing = TsvSource::cities("/definitely/not/here.txt");
        assert!(matches!(
            missing.ensure_data_is_available(),
            Err(SourceError::Unavailable { .. })
        ));
        assert!(matches!(
            missing.load_entities(),
            Err(SourceError::Unavailable { .. })
        ));

        let file = tempfile::NamedTempFile::new().unwrap();
        let (_, path) = file.keep().unwrap();
        let mut source = TsvSource::cities(&path).remove_on_cleanup(true);
        source.cleanup().unwrap();
        assert!(!path.exists());
        source.cleanup().unwrap();
    }
}
