//! Feature encoding: numeric passthrough plus one-hot categorical indicators
//!
//! The encoder produces both the feature vector layout and the feature names
//! from the same column walk, so importances always attribute to the right
//! name.

use std::collections::BTreeSet;

use polars::prelude::*;
use serde::Serialize;

use super::error::DriverError;
use super::prepare::{column_as_f64, column_as_strings, CATEGORICAL_FEATURES, NUMERIC_FEATURES};

/// Learned categories for one categorical column
#[derive(Debug, Clone, Serialize)]
pub struct CategoryVocabulary {
    /// Source column name
    pub column: String,
    /// Categories observed at fit time, sorted
    pub categories: Vec<String>,
}

impl CategoryVocabulary {
    /// Indicator names in output order, formatted `<column>_<category>`
    pub fn indicator_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|cat| format!("{}_{}", self.column, cat))
            .collect()
    }
}

/// Indicator vector for one value against a vocabulary.
///
/// Unseen values yield an all-zero vector.
pub fn encode(value: &str, vocabulary: &[String]) -> Vec<f64> {
    vocabulary
        .iter()
        .map(|cat| if cat == value { 1.0 } else { 0.0 })
        .collect()
}

/// Fitted preprocessing stage
#[derive(Debug, Clone, Serialize)]
pub struct FeatureEncoder {
    numeric: Vec<String>,
    vocabularies: Vec<CategoryVocabulary>,
}

impl FeatureEncoder {
    /// Learn the per-column vocabularies from a prepared feature frame
    pub fn fit(features: &DataFrame) -> Result<Self, DriverError> {
        let mut vocabularies = Vec::with_capacity(CATEGORICAL_FEATURES.len());

        for col in CATEGORICAL_FEATURES {
            let categories: BTreeSet<String> = column_as_strings(features, col)?
                .into_iter()
                .flatten()
                .collect();
            vocabularies.push(CategoryVocabulary {
                column: col.to_string(),
                categories: categories.into_iter().collect(),
            });
        }

        // Surface a missing numeric column here rather than at transform time
        for col in NUMERIC_FEATURES {
            column_as_f64(features, col)?;
        }

        Ok(Self {
            numeric: NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect(),
            vocabularies,
        })
    }

    /// Width of the encoded vector
    pub fn n_features_out(&self) -> usize {
        self.numeric.len()
            + self
                .vocabularies
                .iter()
                .map(|v| v.categories.len())
                .sum::<usize>()
    }

    /// Output feature names: numeric columns first, then every indicator
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric.clone();
        for vocab in &self.vocabularies {
            names.extend(vocab.indicator_names());
        }
        names
    }

    /// Encode a single row given its numeric and categorical values
    pub fn encode_row(&self, numeric: &[f64], categorical: &[&str]) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.n_features_out());
        row.extend_from_slice(numeric);
        for (vocab, value) in self.vocabularies.iter().zip(categorical.iter()) {
            row.extend(encode(value, &vocab.categories));
        }
        row
    }

    /// Encode every row of a feature frame.
    ///
    /// Numeric nulls are encoded as NaN, which never satisfies a split
    /// condition and therefore always follows the right branch.
    pub fn transform(&self, features: &DataFrame) -> Result<Vec<Vec<f64>>, DriverError> {
        let numeric: Vec<Vec<f64>> = self
            .numeric
            .iter()
            .map(|col| {
                column_as_f64(features, col)
                    .map(|values| values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            })
            .collect::<Result<_, _>>()?;

        let categorical: Vec<Vec<Option<String>>> = self
            .vocabularies
            .iter()
            .map(|vocab| column_as_strings(features, &vocab.column))
            .collect::<Result<_, _>>()?;

        let rows = (0..features.height())
            .map(|idx| {
                let nums: Vec<f64> = numeric.iter().map(|col| col[idx]).collect();
                let cats: Vec<&str> = categorical
                    .iter()
                    .map(|col| col[idx].as_deref().unwrap_or(""))
                    .collect();
                self.encode_row(&nums, &cats)
            })
            .collect();

        Ok(rows)
    }
}
