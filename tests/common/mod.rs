//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// The four-row scenario: three closed deals and one pending deal
pub fn create_scenario_dataframe() -> DataFrame {
    df! {
        "outcome" => ["Won", "lost", "WON", "Pending"],
        "deal_amount" => [100.0f64, 200.0, 150.0, 999.0],
        "industry" => ["Tech", "Tech", "Finance", "X"],
        "region" => ["US", "EU", "US", "X"],
        "product_type" => ["A", "B", "A", "X"],
        "lead_source" => ["Web", "Referral", "Web", "X"],
        "sales_cycle_days" => [10.0f64, 30.0, 15.0, 1.0],
    }
    .unwrap()
}

/// A realistic deal export with mixed outcome spellings and missing values
///
/// This DataFrame includes:
/// - `deal_id`, `rep_id`: identifiers that must not become features
/// - `outcome`: won/lost in various casings plus open/pending/null rows
/// - `deal_amount`: two nulls among closed deals
/// - `sales_cycle_days`: one null among closed deals
/// - categorical columns with nulls
pub fn create_deals_dataframe() -> DataFrame {
    df! {
        "deal_id" => [1i32, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
        "rep_id" => ["r1", "r2", "r1", "r3", "r2", "r1", "r3", "r2", "r1", "r3", "r2", "r1"],
        "outcome" => [
            Some("Won"), Some("Lost"), Some(" won "), Some("LOST"), Some("Open"), Some("won"),
            Some("lost"), None, Some("Won"), Some("Lost "), Some("Pending"), Some("WON"),
        ],
        "deal_amount" => [
            Some(12_000.0f64), Some(55_000.0), None, Some(60_000.0), Some(1.0), Some(9_000.0),
            Some(48_000.0), Some(2.0), Some(15_000.0), None, Some(3.0), Some(11_000.0),
        ],
        "industry" => [
            Some("Tech"), Some("Finance"), Some("Tech"), None, Some("Tech"), Some("Retail"),
            Some("Finance"), Some("Tech"), Some("Tech"), Some("Finance"), Some("Tech"), None,
        ],
        "region" => [
            Some("US"), Some("EU"), Some("US"), Some("EU"), Some("US"), Some("US"),
            Some("EU"), Some("US"), None, Some("EU"), Some("US"), Some("US"),
        ],
        "product_type" => [
            Some("Core"), Some("Enterprise"), Some("Core"), Some("Enterprise"), Some("Core"), Some("Core"),
            Some("Enterprise"), Some("Core"), Some("Core"), Some("Enterprise"), Some("Core"), Some("Core"),
        ],
        "lead_source" => [
            Some("Inbound"), Some("Outbound"), Some("Inbound"), Some("Outbound"), None, Some("Partner"),
            Some("Outbound"), Some("Inbound"), Some("Inbound"), None, Some("Inbound"), Some("Partner"),
        ],
        "sales_cycle_days" => [
            Some(20.0f64), Some(90.0), Some(25.0), Some(120.0), Some(5.0), Some(18.0),
            None, Some(7.0), Some(30.0), Some(100.0), Some(9.0), Some(22.0),
        ],
    }
    .unwrap()
}

/// A deal export without `sales_cycle_days`, carrying the dates instead
pub fn create_dated_deals_dataframe() -> DataFrame {
    df! {
        "outcome" => ["won", "lost", "won", "lost", "open"],
        "deal_amount" => [10.0f64, 80.0, 12.0, 70.0, 5.0],
        "industry" => ["Tech", "Finance", "Tech", "Finance", "Tech"],
        "region" => ["US", "EU", "US", "EU", "US"],
        "product_type" => ["A", "B", "A", "B", "A"],
        "lead_source" => ["Web", "Event", "Web", "Event", "Web"],
        "created_date" => [Some("2024-01-01"), Some("2024-01-01"), Some("2024-02-01"), None, Some("2024-03-01")],
        "closed_date" => [Some("2024-01-11"), Some("2024-03-01"), Some("2024-02-15"), Some("2024-05-01"), None],
    }
    .unwrap()
}

/// Create a larger synthetic deal table where deal size drives the outcome
pub fn create_large_deals_dataframe(rows: usize) -> DataFrame {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(7);
    let industries = ["Tech", "Finance", "Retail", "Health"];
    let regions = ["US", "EU", "APAC"];
    let products = ["Core", "Enterprise"];
    let sources = ["Inbound", "Outbound", "Partner"];

    let mut outcome = Vec::with_capacity(rows);
    let mut amount = Vec::with_capacity(rows);
    let mut industry = Vec::with_capacity(rows);
    let mut region = Vec::with_capacity(rows);
    let mut product = Vec::with_capacity(rows);
    let mut source = Vec::with_capacity(rows);
    let mut cycle = Vec::with_capacity(rows);

    for _ in 0..rows {
        let deal_amount: f64 = rng.gen_range(1_000.0..100_000.0);
        let won = deal_amount < 40_000.0 || rng.gen_bool(0.1);
        outcome.push(if won { "Won" } else { "Lost" });
        amount.push(deal_amount);
        industry.push(industries[rng.gen_range(0..industries.len())]);
        region.push(regions[rng.gen_range(0..regions.len())]);
        product.push(products[rng.gen_range(0..products.len())]);
        source.push(sources[rng.gen_range(0..sources.len())]);
        cycle.push(rng.gen_range(1.0..180.0f64).round());
    }

    df! {
        "outcome" => outcome,
        "deal_amount" => amount,
        "industry" => industry,
        "region" => region,
        "product_type" => product,
        "lead_source" => source,
        "sales_cycle_days" => cycle,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("deals.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("deals.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Write raw CSV lines into a temporary file
pub fn create_temp_csv_from_lines(lines: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("deals.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }

    (temp_dir, csv_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Read a float column into a plain vector
pub fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

/// Read a string column into a plain vector
pub fn str_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect()
}
