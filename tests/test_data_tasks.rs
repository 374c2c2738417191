//! Integration tests for data generation, loading, and the shared tasks

use polars::prelude::*;
use tabflow::data::loader::{DataLoader, DataSaver};
use tabflow::data::synthetic::{HouseGenerator, HOUSE_COLUMNS, MAX_YEAR};
use tabflow::tasks::{three_way_split, Cleaner, SPLIT_RATIOS};

#[test]
fn test_generated_houses_have_declared_columns() {
    let df = HouseGenerator::new(7).generate(250).unwrap();

    assert_eq!(df.height(), 250);
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names, HOUSE_COLUMNS);
}

#[test]
fn test_generated_houses_are_plausible() {
    let df = HouseGenerator::new(11).generate(500).unwrap();

    let years = df.column("YEAR_BUILT").unwrap().i64().unwrap();
    assert!(years.into_no_null_iter().all(|y| y <= MAX_YEAR));

    let bedrooms = df.column("NUM_BEDROOMS").unwrap().i64().unwrap();
    assert!(bedrooms.into_no_null_iter().all(|b| (2..7).contains(&b)));

    let garages = df.column("GARAGE_SPACES").unwrap().i64().unwrap();
    assert!(garages.into_no_null_iter().all(|g| (0..4).contains(&g)));
}

#[test]
fn test_csv_round_trip_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("houses.csv");

    let mut df = HouseGenerator::new(3).generate(50).unwrap();
    DataSaver::save_csv(&mut df, &path).unwrap();

    let loaded = DataLoader::load_csv(&path).unwrap();
    assert_eq!(loaded.height(), 50);
    assert_eq!(loaded.width(), HOUSE_COLUMNS.len());
}

#[test]
fn test_three_way_split_on_generated_houses() {
    let df = HouseGenerator::new(7).generate(1000).unwrap();
    let (train, val, test) = three_way_split(&df, 7, SPLIT_RATIOS).unwrap();

    assert_eq!(train.height(), 600);
    assert_eq!(val.height(), 300);
    assert_eq!(test.height(), 100);
}

#[test]
fn test_cleaning_generated_houses_is_lossless() {
    // Generated frames have no nulls and effectively no duplicate rows
    let df = HouseGenerator::new(5).generate(200).unwrap();
    let cleaned = Cleaner::new().fit_transform(&df).unwrap();

    assert_eq!(cleaned.height(), df.height());
    assert_eq!(cleaned.width(), df.width());
}
