//! Console tables for preparation results and ranked drivers

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{DriverRecord, PreparationStats};

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn format_median(median: Option<f64>) -> String {
    median
        .map(|m| format!("{:.2}", m))
        .unwrap_or_else(|| "-".to_string())
}

/// Summary of the preparation step
#[derive(Debug)]
pub struct PreparationSummary<'a> {
    stats: &'a PreparationStats,
}

impl<'a> PreparationSummary<'a> {
    pub fn new(stats: &'a PreparationStats) -> Self {
        Self { stats }
    }

    /// Win rate among retained deals, as a percentage
    pub fn win_rate_pct(&self) -> f64 {
        self.stats.win_rate() * 100.0
    }

    pub fn table(&self) -> Table {
        let stats = self.stats;
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Rows Read"), Cell::new(stats.rows_read)]);
        table.add_row(vec![
            Cell::new("🗑️  Dropped (not won/lost)"),
            Cell::new(stats.rows_dropped).fg(if stats.rows_dropped == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        table.add_row(vec![
            Cell::new("✅ Won"),
            Cell::new(stats.won).fg(Color::Green),
        ]);
        table.add_row(vec![Cell::new("❌ Lost"), Cell::new(stats.lost).fg(Color::Red)]);
        table.add_row(vec![
            Cell::new("📈 Win Rate"),
            Cell::new(format!("{:.1}%", self.win_rate_pct())).add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("💰 deal_amount filled"),
            Cell::new(format!(
                "{} (median {})",
                stats.deal_amount_filled,
                format_median(stats.deal_amount_median)
            )),
        ]);

        let cycle_label = if stats.cycle_days_derived {
            "⏱️  sales_cycle_days filled (derived)"
        } else {
            "⏱️  sales_cycle_days filled"
        };
        table.add_row(vec![
            Cell::new(cycle_label),
            Cell::new(format!(
                "{} (median {})",
                stats.sales_cycle_days_filled,
                format_median(stats.sales_cycle_days_median)
            )),
        ]);

        for (column, filled) in &stats.unknown_filled {
            table.add_row(vec![
                Cell::new(format!("🏷️  {} → Unknown", column)),
                Cell::new(filled),
            ]);
        }

        table
    }

    pub fn display(&self) {
        print_section("📋", "PREPARATION SUMMARY");
        print_indented(&self.table());
    }
}

/// Ranked driver table
#[derive(Debug)]
pub struct DriverTable<'a> {
    drivers: &'a [DriverRecord],
}

impl<'a> DriverTable<'a> {
    pub fn new(drivers: &'a [DriverRecord]) -> Self {
        Self { drivers }
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Driver").add_attribute(Attribute::Bold),
            Cell::new("Impact").add_attribute(Attribute::Bold),
        ]);

        for (rank, driver) in self.drivers.iter().enumerate() {
            let color = if driver.impact >= 0.3 {
                Color::Green
            } else if driver.impact >= 0.1 {
                Color::Yellow
            } else {
                Color::Cyan
            };
            table.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(&driver.name),
                Cell::new(format!("{:.4}", driver.impact))
                    .fg(color)
                    .set_alignment(CellAlignment::Right),
            ]);
        }

        table
    }

    pub fn display(&self) {
        print_section("🏆", "KEY DRIVERS OF WIN RATE");
        if self.drivers.is_empty() {
            println!("    {}", style("No drivers to report").dim());
            return;
        }
        print_indented(&self.table());
    }
}

/// Print the fitted tree's rules
pub fn display_tree_rules(rules: &str) {
    print_section("🌳", "DECISION RULES");
    for line in rules.lines() {
        println!("      {}", line);
    }
}
