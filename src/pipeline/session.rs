//! Analysis session holding the most recently fitted pipeline

use polars::prelude::*;

use super::drivers::{get_key_drivers, DriverRecord};
use super::error::DriverError;
use super::trainer::{train, FittedPipeline, TrainerConfig};

/// Carries one fitted pipeline between `train` and `key_drivers`.
///
/// Re-training replaces the held pipeline.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    config: TrainerConfig,
    pipeline: Option<FittedPipeline>,
}

impl AnalysisSession {
    pub fn new(config: TrainerConfig) -> Self {
        Self {
            config,
            pipeline: None,
        }
    }

    pub fn train(&mut self, features: &DataFrame, target: &[u8]) -> Result<&FittedPipeline, DriverError> {
        let fitted = train(features, target, &self.config)?;
        Ok(self.pipeline.insert(fitted))
    }

    pub fn pipeline(&self) -> Result<&FittedPipeline, DriverError> {
        self.pipeline.as_ref().ok_or(DriverError::NotTrained)
    }

    /// Top drivers of the held pipeline; fails before the first `train`
    pub fn key_drivers(&self, top_n: usize) -> Result<Vec<DriverRecord>, DriverError> {
        get_key_drivers(self.pipeline()?, top_n)
    }
}
