//! Driver analysis export to JSON

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{DriverRecord, FittedPipeline, PreparationStats, TrainerConfig};

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct AnalysisMetadata {
    /// Timestamp of the analysis (RFC 3339)
    pub timestamp: String,
    /// Tool version
    pub version: String,
    /// Input file path
    pub input_file: String,
    /// Tree parameters used for training
    pub config: TrainerConfig,
}

/// Shape of the fitted tree
#[derive(Serialize)]
pub struct ModelSummary {
    pub training_records: usize,
    pub encoded_features: usize,
    pub tree_depth: usize,
    pub tree_leaves: usize,
}

/// Complete driver analysis export
#[derive(Serialize)]
pub struct DriverAnalysisExport {
    pub metadata: AnalysisMetadata,
    pub preparation: PreparationStats,
    /// Win rate among retained deals (0..1)
    pub win_rate: f64,
    pub model: ModelSummary,
    /// Ranked key drivers
    pub drivers: Vec<DriverRecord>,
}

impl DriverAnalysisExport {
    pub fn new(
        input_file: &str,
        stats: &PreparationStats,
        pipeline: &FittedPipeline,
        drivers: &[DriverRecord],
    ) -> Self {
        Self {
            metadata: AnalysisMetadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: input_file.to_string(),
                config: pipeline.config().clone(),
            },
            preparation: stats.clone(),
            win_rate: stats.win_rate(),
            model: ModelSummary {
                training_records: pipeline.n_training_records(),
                encoded_features: pipeline.encoder().n_features_out(),
                tree_depth: pipeline.tree().depth(),
                tree_leaves: pipeline.tree().n_leaves(),
            },
            drivers: drivers.to_vec(),
        }
    }
}

/// Write the driver analysis as pretty-printed JSON
pub fn export_drivers(export: &DriverAnalysisExport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)
        .context("Failed to serialize driver analysis to JSON")?;

    std::fs::write(output_path, json).with_context(|| {
        format!(
            "Failed to write driver analysis to: {}",
            output_path.display()
        )
    })?;

    Ok(())
}
