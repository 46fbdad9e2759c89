//! Deal Drivers: Win-Rate Driver Analysis Library
//!
//! Prepares won/lost deal tables, fits a shallow decision tree over
//! numeric and one-hot encoded categorical attributes, and ranks the
//! attributes that drive the outcome.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
