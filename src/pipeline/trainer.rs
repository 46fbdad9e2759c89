//! Model training: encoder fit followed by a shallow decision tree
//!
//! `train` is a pure function. The returned [`FittedPipeline`] is immutable
//! and owns everything needed for prediction and driver extraction.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::encoder::FeatureEncoder;
use super::error::DriverError;
use super::prepare::FEATURE_COLUMNS;
use super::tree::DecisionTree;
use crate::utils::print_success;

/// Default tree depth; keeps the tree readable by a human
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Default seed for split tie-breaking
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Tree growth parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Maximum depth of the tree (root is depth 0)
    pub max_depth: usize,
    /// Minimum samples a node needs before it may be split
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,
    /// Seed for the feature visit order during split search
    pub random_state: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_split: 2,
            min_samples_leaf: 1,
            random_state: DEFAULT_RANDOM_STATE,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.max_depth == 0 {
            return Err(DriverError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(DriverError::InvalidConfig(format!(
                "min_samples_split must be at least 2, got {}",
                self.min_samples_split
            )));
        }
        if self.min_samples_leaf == 0 {
            return Err(DriverError::InvalidConfig(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Encoder and tree fitted together on the same training frame
#[derive(Debug, Clone)]
pub struct FittedPipeline {
    encoder: FeatureEncoder,
    tree: DecisionTree,
    config: TrainerConfig,
    n_training_records: usize,
}

impl FittedPipeline {
    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn n_training_records(&self) -> usize {
        self.n_training_records
    }

    /// Names of the encoded features, in vector order
    pub fn feature_names(&self) -> Vec<String> {
        self.encoder.feature_names()
    }

    /// Importance per encoded feature, in vector order
    pub fn feature_importances(&self) -> Vec<f64> {
        self.tree.feature_importances()
    }

    /// Predicted class (1 = won, 0 = lost) for every row of a feature frame
    pub fn predict(&self, features: &DataFrame) -> Result<Vec<u8>, DriverError> {
        let rows = self.encoder.transform(features)?;
        Ok(rows.iter().map(|row| self.tree.predict_row(row)).collect())
    }

    /// Probability of won for every row of a feature frame
    pub fn predict_proba(&self, features: &DataFrame) -> Result<Vec<f64>, DriverError> {
        let rows = self.encoder.transform(features)?;
        Ok(rows.iter().map(|row| self.tree.predict_proba_row(row)).collect())
    }

    /// Tree rules as indented text with human-readable feature names
    pub fn describe_tree(&self) -> String {
        self.tree.render(&self.encoder.feature_names())
    }
}

/// Fit the encoder and decision tree on prepared deals.
///
/// # Arguments
/// * `features` - Prepared feature frame containing every column in [`FEATURE_COLUMNS`]
/// * `target` - 1 for won, 0 for lost; one entry per feature row
/// * `config` - Tree growth parameters
pub fn train(
    features: &DataFrame,
    target: &[u8],
    config: &TrainerConfig,
) -> Result<FittedPipeline, DriverError> {
    config.validate()?;

    let column_names = features.get_column_names();
    if let Some(missing) = FEATURE_COLUMNS
        .iter()
        .find(|col| !column_names.iter().any(|c| c.as_str() == **col))
    {
        return Err(DriverError::missing_column(missing));
    }

    if features.height() != target.len() {
        return Err(DriverError::LengthMismatch {
            rows: features.height(),
            targets: target.len(),
        });
    }

    if target.is_empty() {
        return Err(DriverError::EmptyTrainingSet);
    }

    let first = target[0];
    if target.iter().all(|&t| t == first) {
        return Err(DriverError::SingleClass { class: first });
    }

    let encoder = FeatureEncoder::fit(features)?;
    let rows = encoder.transform(features)?;
    let tree = DecisionTree::fit(&rows, target, config);

    print_success(&format!("Model trained on {} deals", target.len()));

    Ok(FittedPipeline {
        encoder,
        tree,
        config: config.clone(),
        n_training_records: target.len(),
    })
}
