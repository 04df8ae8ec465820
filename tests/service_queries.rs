//! Integration tests for the store queries and the loader round-trip.
//!
//! These exercise the real SQL against a live PostgreSQL instance and are
//! ignored by default; run them with a configured database:
//!
//!   cargo test --test service_queries -- --ignored --test-threads=1
//!
//! Prerequisites:
//! - PostgreSQL running with the target database created
//! - DATABASE_URL set in .env
//!
//! All fixture rows use the "TEST" name/zip prefix and are removed between
//! tests.

use postgres::{Client, NoTls};
use std::env;
use zipwater_service::db;
use zipwater_service::ingest::{measurements, zipmap};
use zipwater_service::ranker;
use zipwater_service::resolver;
use zipwater_service::store;
use zipwater_service::model::ServiceError;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn setup_test_db() -> Client {
    dotenv::dotenv().ok();
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let mut client =
        Client::connect(&database_url, NoTls).expect("Failed to connect to test database");
    db::ensure_schema(&mut client).expect("Schema bootstrap failed");
    cleanup_test_data(&mut client);
    client
}

fn cleanup_test_data(client: &mut Client) {
    let _ = client.execute(
        "DELETE FROM measurement WHERE pws_id IN (SELECT id FROM pws WHERE name LIKE 'TEST%')",
        &[],
    );
    let _ = client.execute("DELETE FROM contaminant WHERE name LIKE 'TEST%'", &[]);
    let _ = client.execute("DELETE FROM pws WHERE name LIKE 'TEST%'", &[]);
    let _ = client.execute("DELETE FROM zip_pws WHERE pws_name LIKE 'TEST%'", &[]);
}

fn load_measurement_fixture(client: &mut Client, csv: &str) -> usize {
    let records = measurements::read_measurement_csv(csv.as_bytes()).expect("fixture should parse");
    measurements::load_measurements(client, &records).expect("fixture should load")
}

// ---------------------------------------------------------------------------
// Loader round-trip
// ---------------------------------------------------------------------------

#[test]
#[ignore] // Only run when database is available
fn test_loaded_measurement_row_comes_back_identical() {
    let mut client = setup_test_db();

    let csv = "pws,contaminant,value_ppb,basis,year,source_url\n\
               TEST Water Co,TEST Chromium,3.5,b,2020,u\n";
    assert_eq!(load_measurement_fixture(&mut client, csv), 1);

    let rows = store::contaminants_for_pws(&mut client, "TEST Water Co", Some(2020), 10)
        .expect("query should succeed");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].contaminant, "TEST Chromium");
    assert_eq!(rows[0].value_ppb, Some(3.5));
    assert_eq!(rows[0].year, Some(2020));
    assert_eq!(rows[0].basis, Some("b".to_string()));
    assert_eq!(rows[0].source_url, Some("u".to_string()));

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // Only run when database is available
fn test_reloading_names_does_not_duplicate_them() {
    let mut client = setup_test_db();

    let csv = "pws,contaminant,value_ppb,basis,year,source_url\n\
               TEST Water Co,TEST Lead,1.0,,2021,\n";
    load_measurement_fixture(&mut client, csv);
    load_measurement_fixture(&mut client, csv);

    let pws_count: i64 = client
        .query_one("SELECT COUNT(*) FROM pws WHERE name = 'TEST Water Co'", &[])
        .unwrap()
        .get(0);
    assert_eq!(pws_count, 1, "pws names upsert, never duplicate");

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // Only run when database is available
fn test_zip_map_insert_ignores_conflicts() {
    let mut client = setup_test_db();

    let csv = "zip,pws\n00901,TEST Water Co\n";
    let records = zipmap::read_zipmap_csv(csv.as_bytes()).unwrap();

    assert_eq!(zipmap::load_zip_map(&mut client, &records).unwrap(), 1);
    assert_eq!(zipmap::load_zip_map(&mut client, &records).unwrap(), 0);

    cleanup_test_data(&mut client);
}

// ---------------------------------------------------------------------------
// Store queries
// ---------------------------------------------------------------------------

#[test]
#[ignore] // Only run when database is available
fn test_latest_year_is_max_over_measurements() {
    let mut client = setup_test_db();

    let csv = "pws,contaminant,value_ppb,basis,year,source_url\n\
               TEST Water Co,TEST Lead,4.0,,2019,\n\
               TEST Water Co,TEST Lead,4.1,,2021,\n\
               TEST Water Co,TEST Arsenic,1.0,,2021,\n";
    load_measurement_fixture(&mut client, csv);

    let latest = store::latest_year_for_pws(&mut client, "TEST Water Co").unwrap();
    assert_eq!(latest, Some(2021));

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // Only run when database is available
fn test_latest_year_absent_without_measurements() {
    let mut client = setup_test_db();

    let latest = store::latest_year_for_pws(&mut client, "TEST Nobody").unwrap();
    assert_eq!(latest, None);

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // Only run when database is available
fn test_candidates_ordered_by_coverage_then_name() {
    let mut client = setup_test_db();

    let csv = "zip,pws,pwsid,coverage_fraction\n\
               00902,TEST B Water,,0.4\n\
               00902,TEST A Water,,0.9\n\
               00902,TEST C Water,,\n";
    let records = zipmap::read_zipmap_csv(csv.as_bytes()).unwrap();
    zipmap::load_zip_map(&mut client, &records).unwrap();

    let candidates = store::candidates_for_zip(&mut client, "00902", 5).unwrap();
    let names: Vec<&str> = candidates.iter().map(|c| c.pws_name.as_str()).collect();
    assert_eq!(names, vec!["TEST A Water", "TEST B Water", "TEST C Water"]);

    cleanup_test_data(&mut client);
}

// ---------------------------------------------------------------------------
// Resolution and ranking against the store
// ---------------------------------------------------------------------------

#[test]
#[ignore] // Only run when database is available
fn test_resolution_rejects_malformed_zip() {
    let mut client = setup_test_db();

    for bad_zip in ["9021a", "9021", "902101", "90210 ", ""] {
        let result = resolver::resolve_pws(&mut client, bad_zip, None);
        assert!(
            matches!(result, Err(ServiceError::InvalidInput(_))),
            "ZIP {:?} should be rejected as invalid input, got {:?}",
            bad_zip,
            result
        );
    }

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // Only run when database is available
fn test_resolution_not_found_for_unmapped_zip() {
    let mut client = setup_test_db();

    let result = resolver::resolve_pws(&mut client, "00903", None);
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // Only run when database is available
fn test_explicit_year_without_data_is_not_found() {
    let mut client = setup_test_db();

    let csv = "pws,contaminant,value_ppb,basis,year,source_url\n\
               TEST Water Co,TEST Lead,4.0,,2021,\n";
    load_measurement_fixture(&mut client, csv);

    let result = ranker::top_contaminants(&mut client, "TEST Water Co", 10, Some(1999));
    match result {
        Err(ServiceError::NotFound(msg)) => assert!(msg.contains("1999")),
        other => panic!("Expected NotFound for empty year, got {:?}", other),
    }

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // Only run when database is available
fn test_year_fallback_uses_latest_and_reports_it() {
    let mut client = setup_test_db();

    let csv = "pws,contaminant,value_ppb,basis,year,source_url\n\
               TEST Water Co,TEST Lead,4.2,,2022,\n\
               TEST Water Co,TEST Arsenic,1.1,,2022,\n\
               TEST Water Co,TEST Lead,9.9,,2019,\n";
    load_measurement_fixture(&mut client, csv);

    let (rows, year_used) =
        ranker::top_contaminants(&mut client, "TEST Water Co", 1, None).unwrap();

    assert_eq!(year_used, Some(2022));
    assert_eq!(rows.len(), 1);
    // 2019's higher value is out of scope once the latest year is chosen.
    assert_eq!(rows[0].contaminant, "TEST Lead");
    assert_eq!(rows[0].value_ppb, Some(4.2));

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // Only run when database is available
fn test_all_time_mode_with_no_measurements_is_not_found() {
    let mut client = setup_test_db();

    client
        .execute("INSERT INTO pws(name) VALUES ('TEST Dry Well Co') ON CONFLICT (name) DO NOTHING", &[])
        .unwrap();

    let result = ranker::top_contaminants(&mut client, "TEST Dry Well Co", 10, None);
    match result {
        Err(ServiceError::NotFound(msg)) => {
            // No year qualifier: the caller never asked for one.
            assert!(!msg.contains("in year"), "unexpected qualifier in: {}", msg);
        }
        other => panic!("Expected NotFound in all-time mode, got {:?}", other),
    }

    cleanup_test_data(&mut client);
}

#[test]
#[ignore] // Only run when database is available
fn test_readiness_counts_reflect_loaded_tables() {
    let mut client = setup_test_db();

    let (pws_rows, zip_rows) = db::readiness_counts(&mut client).unwrap();
    assert!(pws_rows >= 0);
    assert!(zip_rows >= 0);
}
