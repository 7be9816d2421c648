use geonames_core::query::expansion::Expansion;
use geonames_core::{
    open_db_in_memory, AlternateName, BulkStore, Country, CountryRepository, Geoname,
    GeonameFilter, GeonameRepository, SqliteAlternateNameRepository, SqliteCountryRepository,
    SqliteGeonameRepository,
};
use rusqlite::Connection;

const BAVARIA_ID: i64 = 2951839;

fn city(id: i64, name: &str, country: &str, admin1: &str, population: i64) -> Geoname {
    let mut city = Geoname::new(id, name, 49.0, 11.0);
    city.feature_class = Some("P".to_string());
    city.feature_code = Some("PPL".to_string());
    city.country_code = Some(country.to_string());
    city.admin1_code = Some(admin1.to_string());
    city.population = population;
    city
}

fn admin_division(id: i64, name: &str, feature_code: &str, admin1: &str) -> Geoname {
    let mut division = Geoname::new(id, name, 49.0, 11.5);
    division.feature_class = Some("A".to_string());
    division.feature_code = Some(feature_code.to_string());
    division.country_code = Some("DE".to_string());
    division.admin1_code = Some(admin1.to_string());
    division
}

fn seeded_store() -> Connection {
    let conn = open_db_in_memory().unwrap();

    let mut germany = Country::new(2921044, "DE", "Germany");
    germany.postal_code_regex = Some(r"^(\d{5})$".to_string());
    SqliteCountryRepository::new(&conn).save(&germany).unwrap();

    SqliteGeonameRepository::admin_divisions(&conn)
        .bulk_insert(&[
            admin_division(BAVARIA_ID, "Bavaria", "ADM1", "02"),
            admin_division(2861322, "Upper Franconia", "ADM2", "02"),
        ])
        .unwrap();

    let mut bayern = AlternateName::new(1, BAVARIA_ID, Some("de"), "Bayern");
    bayern.is_short = true;
    let mut official = AlternateName::new(2, BAVARIA_ID, Some("de"), "Freistaat Bayern");
    official.is_preferred = true;
    SqliteAlternateNameRepository::new(&conn)
        .bulk_insert(&[bayern, official])
        .unwrap();

    SqliteGeonameRepository::cities(&conn)
        .bulk_insert(&[
            city(1, "Bamberg", "DE", "02", 500),
            city(2, "Nuremberg", "DE", "02", 2000),
            city(3, "Fuerth", "DE", "02", 4000),
            city(4, "Munich", "DE", "02", 9000),
            city(5, "Atlantis", "XX", "01", 3000),
            city(6, "a_b", "XX", "01", 10),
            city(7, "axb", "XX", "01", 10),
        ])
        .unwrap();

    conn
}

fn ids(rows: &[geonames_core::EnrichedGeoname]) -> Vec<i64> {
    rows.iter().map(|row| row.geoname.geoname_id).collect()
}

#[test]
fn population_range_is_inclusive_and_combined_with_country() {
    let conn = seeded_store();
    let repo = SqliteGeonameRepository::cities(&conn);

    let filter = GeonameFilter {
        country_code: Some("DE".to_string()),
        min_population: Some(1000),
        max_population: Some(5000),
        ..GeonameFilter::default()
    };
    let rows = repo.find_all(&filter).unwrap();
    assert_eq!(ids(&rows), vec![2, 3]);

    let exact = GeonameFilter {
        min_population: Some(2000),
        max_population: Some(4000),
        ..GeonameFilter::default()
    };
    assert_eq!(ids(&repo.find_all(&exact).unwrap()), vec![2, 3, 5]);
}

#[test]
fn country_expansion_keeps_rows_without_a_matching_country() {
    let conn = seeded_store();
    let repo = SqliteGeonameRepository::cities(&conn);

    let filter = GeonameFilter::default()
        .with_expand_tokens(["country"])
        .unwrap();
    let rows = repo.find_all(&filter).unwrap();
    assert_eq!(rows.len(), 7);

    let munich = rows.iter().find(|row| row.geoname.geoname_id == 4).unwrap();
    assert_eq!(munich.country_name.as_deref(), Some("Germany"));
    assert_eq!(munich.postal_code_regex.as_deref(), Some(r"^(\d{5})$"));
    assert_eq!(munich.admin1_name, None);

    let atlantis = rows.iter().find(|row| row.geoname.geoname_id == 5).unwrap();
    assert_eq!(atlantis.country_name, None);
    assert_eq!(atlantis.postal_code_regex, None);
}

#[test]
fn unexpanded_queries_leave_enrichment_fields_empty() {
    let conn = seeded_store();
    let repo = SqliteGeonameRepository::cities(&conn);

    let rows = repo.find_all(&GeonameFilter::default()).unwrap();
    assert!(rows.iter().all(|row| row.country_name.is_none()
        && row.admin1_name.is_none()
        && row.postal_code_regex.is_none()));
}

#[test]
fn admin1_expansion_resolves_parent_division_name() {
    let conn = seeded_store();
    let repo = SqliteGeonameRepository::cities(&conn);

    let filter = GeonameFilter::default()
        .with_expand_tokens(["admin1", "country"])
        .unwrap();
    let rows = repo.find_all(&filter).unwrap();
    assert_eq!(rows.len(), 7);

    let munich = rows.iter().find(|row| row.geoname.geoname_id == 4).unwrap();
    assert_eq!(munich.admin1_name.as_deref(), Some("Bavaria"));
    assert_eq!(munich.country_name.as_deref(), Some("Germany"));

    let atlantis = rows.iter().find(|row| row.geoname.geoname_id == 5).unwrap();
    assert_eq!(atlantis.admin1_name, None);
}

#[test]
fn localized_admin1_uses_short_non_preferred_name_for_language() {
    let conn = seeded_store();
    let repo = SqliteGeonameRepository::cities(&conn);

    let german = GeonameFilter {
        country_code: Some("DE".to_string()),
        iso_language: "de".to_string(),
        ..GeonameFilter::default()
    }
    .with_expand_tokens(["admin1_localized"])
    .unwrap();
    let rows = repo.find_all(&german).unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows
        .iter()
        .all(|row| row.admin1_name.as_deref() == Some("Bayern")));

    let french = GeonameFilter {
        iso_language: "fr".to_string(),
        ..german.clone()
    };
    let rows = repo.find_all(&french).unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row.admin1_name.is_none()));
}

#[test]
fn pagination_is_stable_by_identifier() {
    let conn = seeded_store();
    let repo = SqliteGeonameRepository::cities(&conn);

    let page = GeonameFilter {
        limit: Some(2),
        offset: Some(1),
        ..GeonameFilter::default()
    };
    assert_eq!(ids(&repo.find_all(&page).unwrap()), vec![2, 3]);

    let tail = GeonameFilter {
        offset: Some(5),
        ..GeonameFilter::default()
    };
    assert_eq!(ids(&repo.find_all(&tail).unwrap()), vec![6, 7]);
}

#[test]
fn name_like_is_case_insensitive_and_treats_wildcards_literally() {
    let conn = seeded_store();
    let repo = SqliteGeonameRepository::cities(&conn);

    let berg = GeonameFilter {
        name_like: Some("BERG".to_string()),
        ..GeonameFilter::default()
    };
    assert_eq!(ids(&repo.find_all(&berg).unwrap()), vec![1, 2]);

    let underscore = GeonameFilter {
        name_like: Some("a_b".to_string()),
        ..GeonameFilter::default()
    };
    assert_eq!(ids(&repo.find_all(&underscore).unwrap()), vec![6]);
}

#[test]
fn admin_divisions_filter_by_level_and_ignore_self_referencing_expansions() {
    let conn = seeded_store();
    let repo = SqliteGeonameRepository::admin_divisions(&conn);

    let filter = GeonameFilter {
        country_code: Some("DE".to_string()),
        feature_code: Some("ADM1".to_string()),
        ..GeonameFilter::default()
    }
    .with_expand_tokens(["country", "admin1"])
    .unwrap();
    assert!(filter.expand.contains(&Expansion::Admin1));

    let rows = repo.find_all(&filter).unwrap();
    assert_eq!(ids(&rows), vec![BAVARIA_ID]);
    assert_eq!(rows[0].country_name.as_deref(), Some("Germany"));
    assert_eq!(rows[0].admin1_name, None);
}

#[test]
fn identical_filters_return_identical_results() {
    let conn = seeded_store();
    let repo = SqliteGeonameRepository::cities(&conn);
    let filter = GeonameFilter::from_pairs([
        ("country_code", "DE"),
        ("expand", "country,admin1"),
        ("limit", "3"),
    ])
    .unwrap();

    let first = repo.find_all(&filter).unwrap();
    let second = repo.find_all(&filter).unwrap();
    assert_eq!(first, second);
    assert_eq!(ids(&first), vec![1, 2, 3]);
}

#[test]
fn name_like_folds_case_beyond_ascii() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGeonameRepository::cities(&conn);
    repo.bulk_insert(&[
        city(101, "München", "DE", "02", 1_500_000),
        city(102, "Île-Rousse", "FR", "94", 3000),
        city(103, "Munich", "DE", "02", 10),
    ])
    .unwrap();

    let upper = GeonameFilter {
        name_like: Some("MÜNCHEN".to_string()),
        ..GeonameFilter::default()
    };
    assert_eq!(ids(&repo.find_all(&upper).unwrap()), vec![101]);

    let lower = GeonameFilter {
        name_like: Some("île".to_string()),
        ..GeonameFilter::default()
    };
    assert_eq!(ids(&repo.find_all(&lower).unwrap()), vec![102]);

    let ascii = GeonameFilter {
        name_like: Some("MUNICH".to_string()),
        ..GeonameFilter::default()
    };
    assert_eq!(ids(&repo.find_all(&ascii).unwrap()), vec![103]);
}
