//! FILENAME: core/collector-engine/src/error.rs

use product_tree::ModelError;
use thiserror::Error;

/// Configuration errors. All of them are raised while the filter chain or the
/// row template is being set up; data problems never surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectorError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("CategoryFilter should contain at least one level. Use the builder's add_level method to add a level.")]
    EmptyHierarchy,

    #[error("No level to configure: call add_level before {0}.")]
    NoLevel(&'static str),

    #[error("Level {field_name} must allow at least one recursion level.")]
    InvalidRecursionLevels { field_name: String },

    #[error("Row template {template} declares field {field} more than once.")]
    DuplicateField { template: String, field: String },

    #[error("Row template {template}: collect_parent_values must follow a field declaration.")]
    NoFieldToConfigure { template: String },

    #[error("State dependent fields of row template {template} must share one value type, found {found}.")]
    MixedStateDependentTypes { template: String, found: String },

    #[error("Invalid hierarchy definition: {0}")]
    InvalidDefinition(String),
}
