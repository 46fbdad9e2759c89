//! Command-line argument definitions using clap

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::pipeline::{
    TrainerConfig, DEFAULT_MAX_DEPTH, DEFAULT_RANDOM_STATE, DEFAULT_TOP_DRIVERS,
};

/// Deal Drivers - Rank the deal attributes that drive win rate
#[derive(Parser, Debug)]
#[command(name = "dealdrivers")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet) with one row per deal
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output JSON path for the driver analysis.
    /// Defaults to input directory with '_drivers.json' suffix (e.g., deals.csv → deals_drivers.json).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of key drivers to report
    #[arg(long, default_value_t = DEFAULT_TOP_DRIVERS, value_parser = validate_top)]
    pub top: usize,

    /// Maximum depth of the decision tree
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, value_parser = validate_max_depth)]
    pub max_depth: usize,

    /// Minimum deals on each side of a split
    #[arg(long, default_value = "1", value_parser = validate_min_samples_leaf)]
    pub min_samples_leaf: usize,

    /// Seed for deterministic tie-breaking between equally good splits
    #[arg(long, default_value_t = DEFAULT_RANDOM_STATE)]
    pub random_state: u64,

    /// Print the fitted tree's decision rules
    #[arg(long, default_value = "false")]
    pub show_tree: bool,

    /// Skip writing the JSON export
    #[arg(long, default_value = "false")]
    pub no_export: bool,

    /// Skip interactive confirmation prompts (overwrite existing exports)
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// Get the export path, deriving from input if not explicitly provided.
    /// Returns None when exporting is disabled.
    pub fn output_path(&self) -> Option<PathBuf> {
        if self.no_export {
            return None;
        }
        Some(
            self.output
                .clone()
                .unwrap_or_else(|| derive_output_path(&self.input)),
        )
    }

    /// Tree parameters assembled from the flags
    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            random_state: self.random_state,
            ..Default::default()
        }
    }
}

fn derive_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("deals");
    parent.join(format!("{}_drivers.json", stem))
}

fn parse_positive(s: &str, name: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid non-negative integer", s))?;
    if value == 0 {
        Err(format!("{} must be at least 1, got 0", name))
    } else {
        Ok(value)
    }
}

/// Validator for top parameter
fn validate_top(s: &str) -> Result<usize, String> {
    parse_positive(s, "top")
}

/// Validator for max_depth parameter
fn validate_max_depth(s: &str) -> Result<usize, String> {
    let value = parse_positive(s, "max_depth")?;
    if value > 32 {
        Err(format!("max_depth must be at most 32, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for min_samples_leaf parameter
fn validate_min_samples_leaf(s: &str) -> Result<usize, String> {
    parse_positive(s, "min_samples_leaf")
}
