//! End-to-end tests for the station time-series pipeline

use chrono::NaiveDate;
use geo_types::{Geometry, Point};
use std::collections::HashSet;
use terraseries_core::prelude::*;
use terraseries_pipeline::{extract_time_series, ExtractionConfig, Weighting};

fn date(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

/// 2x2 NDVI grid covering (0,0)..(2,2), one unit per pixel, raw encoding.
fn monthly_image(y: i32, m: u32, raw: &[f64]) -> Image {
    let mut raster = Raster::from_vec(raw.to_vec(), 2, 2).unwrap();
    raster.set_transform(GeoTransform::new(0.0, 2.0, 1.0, -1.0));
    raster.set_crs(Some(CRS::wgs84()));
    Image::single_band(date(y, m), "NDVI", raster)
}

fn station(name: &str, x: f64, y: f64) -> Feature {
    let mut f = Feature::new(Geometry::Point(Point::new(x, y)));
    f.set_property("station", AttributeValue::String(name.to_string()));
    f
}

fn catalog_with(stations: Vec<Feature>) -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog.insert_image_collection(
        "MODIS/061/MYD13A3",
        ImageCollection::new(vec![
            monthly_image(2000, 1, &[1000.0, 2000.0, 3000.0, 4000.0]),
            monthly_image(2000, 2, &[5000.0, 6000.0, 7000.0, 8000.0]),
            monthly_image(2000, 3, &[9000.0, 9000.0, 9000.0, 9000.0]),
        ]),
    );
    catalog.insert_feature_collection(
        "stations",
        FeatureCollection::from_features(stations),
    );
    catalog
}

fn config(start: NaiveDate, end: NaiveDate) -> ExtractionConfig {
    ExtractionConfig {
        dataset_id: "MODIS/061/MYD13A3".to_string(),
        stations_id: "stations".to_string(),
        start_date: start,
        end_date: end,
        band: "NDVI".to_string(),
        scale: 0.0001,
        offset: 0.0,
        fill_value: -999.0,
        ground_sample_distance: 1.0,
        weighting: Weighting::None,
        description: Some("test_export".to_string()),
    }
}

fn data_rows(path: &std::path::Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

fn header(path: &std::path::Path) -> Vec<String> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn scenario_three_stations_two_months() {
    let catalog = catalog_with(vec![
        station("A", 0.5, 1.5),
        station("B", 1.5, 1.5),
        station("C", 1.5, 0.5),
    ]);
    let sink = tempfile::tempdir().unwrap();

    let path =
        extract_time_series(&catalog, &config(date(2000, 1), date(2000, 3)), sink.path())
            .unwrap();

    let rows = data_rows(&path);
    assert_eq!(rows.len(), 6, "3 stations x 2 months");

    // Columns are the sorted attribute-key union
    assert_eq!(header(&path), vec!["date", "mean", "station"]);

    let dates: HashSet<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(dates, HashSet::from(["2000-01", "2000-02"]));
}

#[test]
fn distinct_dates_match_filtered_count() {
    let catalog = catalog_with(vec![station("A", 0.5, 1.5)]);
    let sink = tempfile::tempdir().unwrap();

    let path =
        extract_time_series(&catalog, &config(date(2000, 1), date(2000, 4)), sink.path())
            .unwrap();

    let rows = data_rows(&path);
    let dates: HashSet<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(dates.len(), 3, "all three source months in range");
}

#[test]
fn station_date_pairs_are_unique() {
    let catalog = catalog_with(vec![
        station("A", 0.5, 1.5),
        station("B", 1.5, 1.5),
    ]);
    let sink = tempfile::tempdir().unwrap();

    let path =
        extract_time_series(&catalog, &config(date(2000, 1), date(2000, 4)), sink.path())
            .unwrap();

    let rows = data_rows(&path);
    let pairs: HashSet<(String, String)> = rows
        .iter()
        .map(|r| (r[2].clone(), r[0].clone()))
        .collect();
    assert_eq!(pairs.len(), rows.len(), "reducer ran once per image per station");
}

#[test]
fn rows_are_station_major_and_chronological() {
    let catalog = catalog_with(vec![
        station("A", 0.5, 1.5),
        station("B", 1.5, 1.5),
    ]);
    let sink = tempfile::tempdir().unwrap();

    let path =
        extract_time_series(&catalog, &config(date(2000, 1), date(2000, 3)), sink.path())
            .unwrap();

    let rows = data_rows(&path);
    let order: Vec<(String, String)> = rows
        .iter()
        .map(|r| (r[2].clone(), r[0].clone()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("A".to_string(), "2000-01".to_string()),
            ("A".to_string(), "2000-02".to_string()),
            ("B".to_string(), "2000-01".to_string()),
            ("B".to_string(), "2000-02".to_string()),
        ]
    );
}

#[test]
fn rescale_is_applied_to_means() {
    let catalog = catalog_with(vec![station("A", 0.5, 1.5)]);
    let sink = tempfile::tempdir().unwrap();

    let path =
        extract_time_series(&catalog, &config(date(2000, 1), date(2000, 2)), sink.path())
            .unwrap();

    let rows = data_rows(&path);
    let mean: f64 = rows[0][1].parse().unwrap();
    assert!((mean - 0.1).abs() < 1e-9, "raw 1000 at scale 0.0001");
}

#[test]
fn empty_range_yields_table_with_no_rows() {
    let catalog = catalog_with(vec![station("A", 0.5, 1.5)]);
    let sink = tempfile::tempdir().unwrap();

    let path =
        extract_time_series(&catalog, &config(date(2030, 1), date(2031, 1)), sink.path())
            .unwrap();

    assert!(path.exists());
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.is_empty(), "no (station, month) pairs in range");
}

#[test]
fn dry_station_still_gets_one_row_per_month() {
    let catalog = catalog_with(vec![
        station("A", 0.5, 1.5),
        station("FAR", 500.0, 500.0),
    ]);
    let sink = tempfile::tempdir().unwrap();

    let path =
        extract_time_series(&catalog, &config(date(2000, 1), date(2000, 3)), sink.path())
            .unwrap();

    let rows = data_rows(&path);
    assert_eq!(rows.len(), 4);

    let far_rows: Vec<_> = rows.iter().filter(|r| r[2] == "FAR").collect();
    assert_eq!(far_rows.len(), 2, "dry footprint surfaces every month");
    for row in far_rows {
        assert_eq!(row[1], "-999");
    }
}

#[test]
fn reruns_are_byte_identical() {
    let catalog = catalog_with(vec![
        station("A", 0.5, 1.5),
        station("B", 1.5, 0.5),
    ]);
    let sink_a = tempfile::tempdir().unwrap();
    let sink_b = tempfile::tempdir().unwrap();
    let cfg = config(date(2000, 1), date(2000, 4));

    let first = extract_time_series(&catalog, &cfg, sink_a.path()).unwrap();
    let second = extract_time_series(&catalog, &cfg, sink_b.path()).unwrap();

    assert_eq!(
        std::fs::read(first).unwrap(),
        std::fs::read(second).unwrap()
    );
}

#[test]
fn hours_in_month_weighting_is_opt_in() {
    let catalog = catalog_with(vec![station("A", 0.5, 1.5)]);
    let sink = tempfile::tempdir().unwrap();

    let mut cfg = config(date(2000, 1), date(2000, 2));
    cfg.weighting = Weighting::HoursInMonth;

    let path = extract_time_series(&catalog, &cfg, sink.path()).unwrap();
    let rows = data_rows(&path);
    let mean: f64 = rows[0][1].parse().unwrap();
    // January 2000: 31 days * 24 hours, applied to the raw value
    assert!((mean - 1000.0 * 744.0).abs() < 1e-6);
}

#[test]
fn unknown_dataset_aborts_the_run() {
    let catalog = MemoryCatalog::new();
    let sink = tempfile::tempdir().unwrap();

    let err = extract_time_series(&catalog, &config(date(2000, 1), date(2000, 2)), sink.path())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn restricted_dataset_aborts_with_access_error() {
    let mut catalog = catalog_with(vec![station("A", 0.5, 1.5)]);
    catalog.restrict("MODIS/061/MYD13A3");
    let sink = tempfile::tempdir().unwrap();

    let err = extract_time_series(&catalog, &config(date(2000, 1), date(2000, 2)), sink.path())
        .unwrap_err();
    assert!(matches!(err, Error::AccessDenied { .. }));
}
