use geonames_core::import::{ImportError, ImportOrchestrator, SourceError};
use geonames_core::{
    open_db_in_memory, AlternateNameRepository, BulkStore, CountryRepository, GeonameFilter,
    GeonameRepository, SqliteAlternateNameRepository, SqliteCountryRepository,
    SqliteGeonameRepository, TsvSource,
};
use std::io::Write;
use std::path::Path;

const COUNTRY_INFO: &str = "\
# ISO\tISO3\tISO-Numeric\tfips\tCountry\tCapital\tArea(in sq km)\tPopulation\tContinent\ttld\tCurrencyCode\tCurrencyName\tPhone\tPostal Code Format\tPostal Code Regex\tLanguages\tgeonameid\tneighbours\tEquivalentFipsCode
DE\tDEU\t276\tGM\tGermany\tBerlin\t357021\t82927922\tEU\t.de\tEUR\tEuro\t49\t#####\t^(\\d{5})$\tde\t2921044\tCH,PL,NL,DK,BE,CZ,LU,FR,AT\t
AT\tAUT\t040\tAU\tAustria\tVienna\t83858\t8847037\tEU\t.at\tEUR\tEuro\t43\t####\t^(\\d{4})$\tde-AT,hr,hu,sl\t2782113\tCH,DE,HU,SK,CZ,IT,SI,LI\t
";

const GEONAMES_DUMP: &str = "\
2951839\tBavaria\tBavaria\tBayern\t49.0\t11.5\tA\tADM1\tDE\t\t02\t\t\t\t12520000\t\t500\tEurope/Berlin\t2021-01-01
2861322\tUpper Franconia\tUpper Franconia\t\t50.0\t11.5\tA\tADM2\tDE\t\t02\t094\t\t\t1067000\t\t400\tEurope/Berlin\t2021-01-01
2867714\tMunich\tMunich\tMuenchen\t48.13743\t11.57549\tP\tPPLA\tDE\t\t02\t091\t09162\t09162000\t1260391\t\t524\tEurope/Berlin\t2023-10-12
2950159\tBerlin\tBerlin\t\t52.52437\t13.41053\tP\tPPLC\tDE\t\t16\t00\t11000\t11000000\t3426354\t\t74\tEurope/Berlin\t2022-03-09
2867993\tMuehlbach\tMuehlbach\t\t47.7\t12.1\tH\tSTM\tDE\t\t02\t\t\t\t0\t\t480\tEurope/Berlin\t2015-01-01
";

const ALTERNATE_NAMES: &str = "\
10\t2951839\tde\tBayern\t\t1\t\t\t\t
11\t2951839\ten\tBavaria\t1\t\t\t\t\t
12\t2867714\tde\tMünchen\t1\t\t\t\t\t
";

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn dump_files_import_into_every_family_and_support_enriched_reads() {
    let dir = tempfile::tempdir().unwrap();
    let country_path = write_file(dir.path(), "countryInfo.txt", COUNTRY_INFO);
    let dump_path = write_file(dir.path(), "DE.txt", GEONAMES_DUMP);
    let alt_path = write_file(dir.path(), "alternateNamesV2.txt", ALTERNATE_NAMES);
    let conn = open_db_in_memory().unwrap();

    let countries = SqliteCountryRepository::new(&conn);
    let mut source = TsvSource::countries(&country_path);
    let run = ImportOrchestrator::new(&countries, &mut source).execute().unwrap();
    assert_eq!(run.total_records, 2);
    assert_eq!(run.batches.map(Result::unwrap).sum::<usize>(), 2);

    let admin_divisions = SqliteGeonameRepository::admin_divisions(&conn);
    let mut source = TsvSource::admin_divisions(&dump_path);
    let run = ImportOrchestrator::new(&admin_divisions, &mut source)
        .execute()
        .unwrap();
    assert_eq!(run.batches.map(Result::unwrap).sum::<usize>(), 2);

    let cities = SqliteGeonameRepository::cities(&conn);
    let mut source = TsvSource::cities(&dump_path);
    let run = ImportOrchestrator::new(&cities, &mut source).execute().unwrap();
    assert_eq!(run.batches.map(Result::unwrap).sum::<usize>(), 2);

    let alternate_names = SqliteAlternateNameRepository::new(&conn);
    let mut source = TsvSource::alternate_names(&alt_path);
    let run = ImportOrchestrator::new(&alternate_names, &mut source)
        .execute()
        .unwrap();
    assert_eq!(run.batches.map(Result::unwrap).sum::<usize>(), 3);

    let austria = countries.find_by_iso_alpha2("at").unwrap().unwrap();
    assert_eq!(austria.geoname_id, 2782113);
    assert_eq!(austria.matches_postal_code("1010"), Some(true));
    assert_eq!(
        alternate_names.find_by_geoname_id(2867714, Some("de")).unwrap()[0].alternate_name,
        "München"
    );

    let filter = GeonameFilter {
        iso_language: "de".to_string(),
        ..GeonameFilter::default()
    }
    .with_expand_tokens(["country", "admin1_localized"])
    .unwrap();
    let rows = cities.find_all(&filter).unwrap();
    let munich = rows
        .iter()
        .find(|row| row.geoname.geoname_id == 2867714)
        .unwrap();
    assert_eq!(munich.admin1_name.as_deref(), Some("Bayern"));
    assert_eq!(munich.country_name.as_deref(), Some("Germany"));
    let berlin = rows
        .iter()
        .find(|row| row.geoname.geoname_id == 2950159)
        .unwrap();
    assert_eq!(berlin.admin1_name, None);
}

#[test]
fn reimporting_the_same_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let dump_path = write_file(dir.path(), "DE.txt", GEONAMES_DUMP);
    let conn = open_db_in_memory().unwrap();
    let cities = SqliteGeonameRepository::cities(&conn);

    let mut first = TsvSource::cities(&dump_path);
    let run = ImportOrchestrator::new(&cities, &mut first).execute().unwrap();
    assert_eq!(run.batches.count(), 1);

    let mut second = TsvSource::cities(&dump_path);
    let run = ImportOrchestrator::new(&cities, &mut second).execute().unwrap();
    assert_eq!(run.total_records, 0);
    assert_eq!(run.batches.count(), 0);
    assert_eq!(cities.count_all().unwrap(), 2);
}

#[test]
fn cleanup_removes_the_dump_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let dump_path = write_file(dir.path(), "DE.txt", GEONAMES_DUMP);
    let conn = open_db_in_memory().unwrap();
    let cities = SqliteGeonameRepository::cities(&conn);

    let mut source = TsvSource::cities(&dump_path).remove_on_cleanup(true);
    let run = ImportOrchestrator::new(&cities, &mut source).execute().unwrap();
    assert!(dump_path.exists());
    assert_eq!(run.batches.map(Result::unwrap).sum::<usize>(), 2);
    assert!(!dump_path.exists());
}

#[test]
fn missing_and_empty_files_fail_before_any_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let cities = SqliteGeonameRepository::cities(&conn);

    let mut missing = TsvSource::cities(dir.path().join("absent.txt"));
    let result = ImportOrchestrator::new(&cities, &mut missing).execute();
    assert!(matches!(
        result,
        Err(ImportError::Source(SourceError::Unavailable { .. }))
    ));

    let comments_only = write_file(dir.path(), "empty.txt", "# nothing here\n\n");
    let mut empty = TsvSource::cities(&comments_only);
    let result = ImportOrchestrator::new(&cities, &mut empty).execute();
    assert!(matches!(result, Err(ImportError::EmptyDataset)));
    assert_eq!(cities.count_all().unwrap(), 0);
}
