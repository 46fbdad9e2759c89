//! Key driver extraction from a fitted pipeline

use serde::Serialize;

use super::error::DriverError;
use super::trainer::FittedPipeline;

/// Number of drivers reported by default
pub const DEFAULT_TOP_DRIVERS: usize = 5;

/// One ranked driver of win rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverRecord {
    /// Numeric feature name or `<column>_<category>` indicator name
    pub name: String,
    /// Normalized importance in [0, 1]
    pub impact: f64,
}

/// Every encoded feature paired with its importance, in vector order
pub fn feature_impacts(pipeline: &FittedPipeline) -> Result<Vec<DriverRecord>, DriverError> {
    let names = pipeline.feature_names();
    let importances = pipeline.feature_importances();

    if names.len() != importances.len() {
        return Err(DriverError::FeatureMismatch {
            names: names.len(),
            importances: importances.len(),
        });
    }

    Ok(names
        .into_iter()
        .zip(importances)
        .map(|(name, impact)| DriverRecord { name, impact })
        .collect())
}

/// Rank features by importance and keep the strongest `top_n`.
///
/// Ties keep encoder order (numeric features first).
pub fn get_key_drivers(
    pipeline: &FittedPipeline,
    top_n: usize,
) -> Result<Vec<DriverRecord>, DriverError> {
    let mut drivers = feature_impacts(pipeline)?;
    drivers.sort_by(|a, b| b.impact.total_cmp(&a.impact));
    drivers.truncate(top_n);
    Ok(drivers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::trainer::{train, TrainerConfig};
    use polars::prelude::*;

    fn fitted() -> FittedPipeline {
        let df = df! {
            "deal_amount" => [100.0f64, 200.0, 150.0, 220.0, 90.0, 250.0, 130.0, 210.0],
            "industry" => ["Tech", "Tech", "Finance", "Retail", "Finance", "Retail", "Tech", "Finance"],
            "region" => ["US", "EU", "US", "EU", "EU", "US", "US", "EU"],
            "product_type" => ["A", "B", "A", "B", "A", "B", "B", "A"],
            "lead_source" => ["Web", "Referral", "Web", "Event", "Web", "Event", "Referral", "Web"],
            "sales_cycle_days" => [10.0f64, 30.0, 15.0, 45.0, 12.0, 40.0, 20.0, 35.0],
        }
        .unwrap();
        let target = vec![1, 0, 1, 0, 1, 0, 1, 0];
        train(&df, &target, &TrainerConfig::default()).unwrap()
    }

    #[test]
    fn test_key_drivers_sorted_and_bounded() {
        let drivers = get_key_drivers(&fitted(), DEFAULT_TOP_DRIVERS).unwrap();

        assert!(!drivers.is_empty());
        assert!(drivers.len() <= 5);
        for pair in drivers.windows(2) {
            assert!(pair[0].impact >= pair[1].impact);
        }
        assert!(drivers.iter().all(|d| (0.0..=1.0).contains(&d.impact)));
    }

    #[test]
    fn test_feature_impacts_cover_all_features() {
        let pipeline = fitted();
        let impacts = feature_impacts(&pipeline).unwrap();

        assert_eq!(impacts.len(), pipeline.encoder().n_features_out());
        assert_eq!(impacts[0].name, "deal_amount");
        assert_eq!(impacts[1].name, "sales_cycle_days");
        let total: f64 = impacts.iter().map(|d| d.impact).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_n_larger_than_feature_count() {
        let pipeline = fitted();
        let drivers = get_key_drivers(&pipeline, 100).unwrap();
        assert_eq!(drivers.len(), pipeline.encoder().n_features_out());
    }
}
