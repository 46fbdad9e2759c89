//! Deal Drivers CLI
//!
//! Loads a deal export, keeps won/lost deals, fits a shallow decision tree
//! and prints the attributes that drive win rate.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use dealdrivers::cli::{confirm_overwrite, Cli};
use dealdrivers::pipeline::{column_names, load_dataset, prepare, AnalysisSession};
use dealdrivers::report::{
    display_tree_rules, export_drivers, DriverAnalysisExport, DriverTable, PreparationSummary,
};
use dealdrivers::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.trainer_config();
    let output_path = cli.output_path();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&cli.input, output_path.as_deref(), &config, cli.top);

    // Step 1: Load dataset
    print_step_header(1, "Load Deals");

    let step_start = Instant::now();
    let spinner = create_spinner("Reading dataset...");
    let raw = load_dataset(&cli.input, cli.infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", raw.height());
    println!("      Columns: {}", raw.width());
    print_step_time(step_start.elapsed());

    // Step 2: Prepare won/lost deals
    print_step_header(2, "Prepare Deals");

    let step_start = Instant::now();
    let prepared = prepare(&raw).with_context(|| {
        format!(
            "Failed to prepare deals. Available columns: {:?}",
            column_names(&raw)
        )
    })?;

    if prepared.stats.rows_dropped == 0 {
        print_info("All deals are closed as won or lost");
    } else {
        print_count(
            "deal(s) without a won/lost outcome",
            prepared.stats.rows_dropped,
            Some("(excluded)"),
        );
    }
    print_success(&format!("Prepared {} closed deals", prepared.len()));
    PreparationSummary::new(&prepared.stats).display();
    print_step_time(step_start.elapsed());

    // Step 3: Train decision tree
    print_step_header(3, "Train Decision Tree");

    let step_start = Instant::now();
    let mut session = AnalysisSession::new(config);
    session
        .train(&prepared.features, &prepared.target)
        .context("Failed to train decision tree")?;
    print_step_time(step_start.elapsed());

    // Step 4: Rank drivers
    print_step_header(4, "Rank Key Drivers");

    let step_start = Instant::now();
    let pipeline = session.pipeline()?;
    let drivers = session.key_drivers(cli.top)?;
    DriverTable::new(&drivers).display();

    if cli.show_tree {
        display_tree_rules(&pipeline.describe_tree());
    }
    print_step_time(step_start.elapsed());

    // Step 5: Export
    if let Some(path) = output_path {
        print_step_header(5, "Save Results");

        let proceed = cli.no_confirm || !path.exists() || confirm_overwrite(&path)?;
        if proceed {
            let export = DriverAnalysisExport::new(
                &cli.input.display().to_string(),
                &prepared.stats,
                pipeline,
                &drivers,
            );
            export_drivers(&export, &path)?;
            print_success(&format!("Saved to {}", path.display()));
        } else {
            print_info("Export skipped");
        }
    }

    print_completion();

    Ok(())
}
