//! Pipeline module - preparation, training and driver extraction

pub mod drivers;
pub mod encoder;
pub mod error;
pub mod loader;
pub mod prepare;
pub mod session;
pub mod trainer;
pub mod tree;

pub use drivers::*;
pub use encoder::{encode, CategoryVocabulary, FeatureEncoder};
pub use error::DriverError;
pub use loader::*;
pub use prepare::*;
pub use session::AnalysisSession;
pub use trainer::*;
pub use tree::{gini_impurity, DecisionTree, TreeNode};
