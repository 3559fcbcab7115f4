// distress-triage - tests/e2e_pipeline.rs
//
// End-to-end tests for the import, scoring, query and export pipeline.
//
// These run against real fixture files on disk and real temporary files:
// header auto-mapping, price parsing, scoring, filtering and a CSV export
// that is read back in through the same import path.

use distress_triage::app::import::{import_file, ImportOptions};
use distress_triage::app::state::TriageState;
use distress_triage::core::export::{self, EXPORT_HEADERS};
use distress_triage::core::model::{Field, Priority, ScoredProperty};
use distress_triage::core::query::{FilterState, SortDirection, SortKey};
use distress_triage::util::error::{IngestError, MappingError, TriageError};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn import_listings() -> Vec<ScoredProperty> {
    import_file(&fixture("commercial_listings.csv"), &ImportOptions::default())
        .expect("fixture should import")
        .properties
}

fn by_address<'a>(props: &'a [ScoredProperty], address: &str) -> &'a ScoredProperty {
    props
        .iter()
        .find(|p| p.address == address)
        .unwrap_or_else(|| panic!("no listing at {address}"))
}

// =============================================================================
// Import
// =============================================================================

#[test]
fn test_e2e_every_field_auto_maps_from_messy_headers() {
    let outcome = import_file(&fixture("commercial_listings.csv"), &ImportOptions::default())
        .expect("fixture should import");

    assert_eq!(outcome.auto_mapped, Field::all().len());
    assert!(outcome.columns.unmapped().is_empty());
    assert_eq!(outcome.columns.get(Field::Postcode), Some("Post_Code"));
    assert_eq!(outcome.columns.get(Field::DaysOnMarket), Some("Days-On-Market"));
    assert_eq!(outcome.columns.get(Field::Council), Some("LGA"));
    assert_eq!(outcome.columns.get(Field::ListingType), Some("Sale Method"));
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.properties.len(), 6);
}

#[test]
fn test_e2e_scores_and_priorities() {
    let props = import_listings();

    let church = by_address(&props, "12 Church St");
    assert_eq!(church.state, "NSW", "blank state falls back to the default");
    assert_eq!(church.asking_price, Some(1_200_000));
    assert_eq!(church.days_on_market, Some(200));
    assert_eq!(
        church.matched_keywords,
        vec!["mortgagee", "must sell", "vacant possession"]
    );
    assert_eq!(
        (church.distress_score, church.dom_score, church.vacancy_score),
        (40, 30, 20)
    );
    assert_eq!(church.score, 90);
    assert_eq!(church.priority, Priority::High);

    let mill = by_address(&props, "8 Mill Rd");
    assert_eq!(mill.asking_price, Some(900_000));
    assert_eq!(mill.score, 0);
    assert_eq!(mill.priority, Priority::Low);

    let factory = by_address(&props, "3/44 Factory Ln");
    assert_eq!(factory.asking_price, Some(875_000));
    assert_eq!(factory.score, 60);
    assert_eq!(factory.priority, Priority::High);

    let king = by_address(&props, "77 King St");
    assert_eq!(king.asking_price, None);
    assert_eq!(king.price_text, "Contact Agent");
    assert_eq!(king.days_on_market, None);
    assert_eq!(king.score, 5);

    let harbour = by_address(&props, "1 Harbour Pde");
    assert_eq!(harbour.asking_price, Some(1_250_000));
    assert_eq!(harbour.distress_score, 50);
    assert_eq!(harbour.score, 75);

    let station = by_address(&props, "19 Station Ave");
    assert_eq!(station.asking_price, None);
    assert_eq!(station.score, 35);
    assert_eq!(station.priority, Priority::Monitor);
}

#[test]
fn test_e2e_tsv_import() {
    let outcome = import_file(&fixture("listings.tsv"), &ImportOptions::default())
        .expect("tsv fixture should import");
    let props = outcome.properties;
    assert_eq!(props.len(), 2);

    let dock = by_address(&props, "5 Dock Rd");
    assert_eq!(dock.suburb, "Port Kembla");
    assert_eq!(dock.asking_price, Some(2_500_000));
    assert_eq!(dock.score, 60);
    assert_eq!(dock.priority, Priority::High);

    let quay = by_address(&props, "9 Quay St");
    assert_eq!(quay.asking_price, None);
    assert_eq!(quay.days_on_market, Some(45));
    assert_eq!(quay.score, 0);
}

#[test]
fn test_e2e_unsupported_file_type_rejected() {
    let err = import_file(&fixture("brochure.pdf"), &ImportOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        TriageError::Ingest(IngestError::UnsupportedFileType { .. })
    ));
}

#[test]
fn test_e2e_unrecognised_headers_hit_the_gate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mystery.csv");
    fs::write(&path, "Col A,Col B,Col C\n1,2,3\n").unwrap();

    let err = import_file(&path, &ImportOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        TriageError::Mapping(MappingError::TooFewMappedFields { mapped: 0, .. })
    ));

    let options = ImportOptions {
        overrides: vec![
            "address=Col A".to_string(),
            "description=col_b".to_string(),
            "daysOnMarket=Col C".to_string(),
        ],
        ..Default::default()
    };
    let outcome = import_file(&path, &options).unwrap();
    assert_eq!(outcome.columns.get(Field::Description), Some("Col B"));
    assert_eq!(outcome.properties[0].days_on_market, Some(3));
}

// =============================================================================
// Query
// =============================================================================

#[test]
fn test_e2e_default_view_is_score_descending() {
    let state = TriageState::new(import_listings());
    let scores: Vec<u32> = state.visible().map(|p| p.score).collect();
    assert_eq!(scores, vec![90, 75, 60, 35, 5, 0]);

    let summary = state.summary();
    assert_eq!(summary.high_priority, 3);
    assert_eq!(summary.monitor, 1);
    assert_eq!(summary.low, 2);
    assert_eq!(summary.priced, 4);
}

#[test]
fn test_e2e_price_sort_puts_unpriced_last() {
    let mut state = TriageState::new(import_listings());
    for dir in [SortDirection::Ascending, SortDirection::Descending] {
        state.sort_key = SortKey::AskingPrice;
        state.sort_direction = dir;
        state.apply_query();
        let prices: Vec<Option<i64>> = state.visible().map(|p| p.asking_price).collect();
        assert_eq!(prices[4..], [None::<i64>, None], "direction {dir:?}");
    }

    state.sort_direction = SortDirection::Ascending;
    state.apply_query();
    let first: Vec<&str> = state.visible().take(2).map(|p| p.address.as_str()).collect();
    assert_eq!(first, vec!["3/44 Factory Ln", "8 Mill Rd"]);
}

#[test]
fn test_e2e_price_range_keeps_unpriced_listings() {
    let mut state = TriageState::new(import_listings());
    state
        .filter
        .set_price_range(Some(880_000), Some(1_200_000))
        .unwrap();
    state.apply_query();

    let mut addresses: Vec<&str> = state.visible().map(|p| p.address.as_str()).collect();
    addresses.sort_unstable();
    assert_eq!(
        addresses,
        vec!["12 Church St", "19 Station Ave", "77 King St", "8 Mill Rd"]
    );
}

#[test]
fn test_e2e_combined_filters() {
    let mut state = TriageState::new(import_listings());
    let facets = state.facets();
    assert_eq!(facets.suburbs.len(), 5);
    assert!(facets.property_types.contains(&"Development Site".to_string()));

    state.filter.suburbs.insert("Penrith".to_string());
    state.apply_query();
    assert_eq!(state.visible_count(), 2);

    state.filter.search = "ESTATE".to_string();
    state.apply_query();
    let hits: Vec<&str> = state.visible().map(|p| p.address.as_str()).collect();
    assert_eq!(hits, vec!["19 Station Ave"]);

    state.filter = FilterState::high_priority_only();
    state.filter.min_dom = Some(100);
    state.apply_query();
    let hits: Vec<&str> = state.visible().map(|p| p.address.as_str()).collect();
    assert_eq!(hits, vec!["12 Church St", "3/44 Factory Ln"]);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_e2e_export_then_reimport_preserves_scores() {
    let original = import_listings();

    let dir = tempfile::tempdir().unwrap();
    let date = chrono::NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    let path = dir.path().join(export::default_file_name(date, "csv"));
    assert!(path.ends_with("distressed_properties_2024-07-01.csv"));

    let file = File::create(&path).unwrap();
    let written = export::export_csv(&original, BufWriter::new(file), &path).unwrap();
    assert_eq!(written, original.len());

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().next().unwrap(), EXPORT_HEADERS.join(","));
    assert!(content.contains("mortgagee; must sell; vacant possession"));

    let reimported = import_file(&path, &ImportOptions::default())
        .expect("export should import")
        .properties;
    assert_eq!(reimported.len(), original.len());
    for (before, after) in original.iter().zip(&reimported) {
        assert_eq!(after.address, before.address);
        assert_eq!(after.asking_price, before.asking_price);
        assert_eq!(after.days_on_market, before.days_on_market);
        assert_eq!(after.score, before.score);
        assert_eq!(after.priority, before.priority);
    }
}

#[test]
fn test_e2e_json_export() {
    let props = import_listings();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");

    let file = File::create(&path).unwrap();
    export::export_json(&props, BufWriter::new(file), &path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["address"], "12 Church St");
    assert_eq!(rows[0]["priority"], "High Priority");
    assert_eq!(rows[0]["askingPrice"], 1_200_000);
    assert!(rows[3]["askingPrice"].is_null());
}
