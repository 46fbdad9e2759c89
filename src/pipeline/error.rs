//! Error types for deal preparation, training and driver extraction.
//!
//! Each variant maps to one failure mode of the pipeline. Nothing here is
//! retried: every stage either fully succeeds or surfaces one of these.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while turning raw deals into ranked drivers.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A column the pipeline depends on is absent from the input schema.
    #[error("Required column '{column}' not found in dataset")]
    MissingColumn {
        /// Name of the absent column
        column: String,
    },

    /// A date value could not be parsed while deriving `sales_cycle_days`.
    #[error("Failed to parse date '{value}' in column '{column}'")]
    DateParse {
        /// Column holding the malformed value
        column: String,
        /// The raw value as read
        value: String,
    },

    /// A numeric column needs a median fill but has no observed values.
    #[error("Column '{column}' has no non-null values among won/lost deals")]
    NoObservedValues {
        /// Column that could not be filled
        column: String,
    },

    /// A numeric column holds a value that is neither null nor a number.
    #[error("Value '{value}' in column '{column}' is not numeric")]
    InvalidNumeric {
        /// Column holding the malformed value
        column: String,
        /// The raw value as read
        value: String,
    },

    /// No records were available to train on.
    #[error("Cannot train on an empty set of deals")]
    EmptyTrainingSet,

    /// Every training record carries the same outcome.
    #[error("Training target contains a single class ({class}); need both won and lost deals")]
    SingleClass {
        /// The only class observed (0 = lost, 1 = won)
        class: u8,
    },

    /// Feature rows and target values disagree in length.
    #[error("Feature table has {rows} rows but target has {targets} values")]
    LengthMismatch {
        /// Rows in the feature table
        rows: usize,
        /// Length of the target sequence
        targets: usize,
    },

    /// A trainer parameter is out of range.
    #[error("Invalid trainer configuration: {0}")]
    InvalidConfig(String),

    /// Drivers were requested before any model was trained.
    #[error("No model has been trained yet; call train before requesting key drivers")]
    NotTrained,

    /// Feature names and importances do not line up.
    #[error("Feature name count ({names}) does not match importance count ({importances})")]
    FeatureMismatch {
        /// Number of feature names produced by the encoder
        names: usize,
        /// Number of importances produced by the tree
        importances: usize,
    },

    /// Failure inside polars while reading or building a frame.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl DriverError {
    pub(crate) fn missing_column(column: &str) -> Self {
        DriverError::MissingColumn {
            column: column.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message() {
        let err = DriverError::missing_column("deal_amount");
        assert_eq!(
            err.to_string(),
            "Required column 'deal_amount' not found in dataset"
        );
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = DriverError::LengthMismatch { rows: 3, targets: 2 };
        assert!(err.to_string().contains("3 rows"));
        assert!(err.to_string().contains("2 values"));
    }
}
