//! Terminal styling utilities for console output

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

use crate::pipeline::TrainerConfig;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TREE: Emoji<'_, '_> = Emoji("🌳 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static SEED: Emoji<'_, '_> = Emoji("🎲 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
     ____             _   ____       _
    |  _ \  ___  __ _| | |  _ \ _ __(_)_   _____ _ __ ___
    | | | |/ _ \/ _` | | | | | | '__| \ \ / / _ \ '__/ __|
    | |_| |  __/ (_| | | | |_| | |  | |\ V /  __/ |  \__ \
    |____/ \___|\__,_|_| |____/|_|  |_| \_/ \___|_|  |___/
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("What wins deals, ranked by a shallow decision tree").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(input: &Path, output: Option<&Path>, config: &TrainerConfig, top_n: usize) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);
    let output_display = output
        .map(|p| truncate_path(p, 38))
        .unwrap_or_else(|| "(export disabled)".to_string());

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!("    │  {} Input:  {:<39}│", FOLDER, truncate_path(input, 38));
    println!("    │  {} Output: {:<39}│", SAVE, output_display);
    println!("    ├{}┤", line);
    println!(
        "    │  {} Max depth:    {:<33}│",
        TREE,
        style(config.max_depth).yellow()
    );
    println!(
        "    │  {} Random state: {:<33}│",
        SEED,
        style(config.random_state).yellow()
    );
    println!(
        "    │  {} Top drivers:  {:<33}│",
        CHART,
        style(top_n).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print the elapsed time of a step
pub fn print_step_time(elapsed: Duration) {
    println!(
        "    {}",
        style(format!("⏱  {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Driver analysis complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!(
            "      Found {} {}",
            style(count).yellow().bold(),
            description
        );
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
