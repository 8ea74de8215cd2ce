//! FILENAME: core/product-tree/src/error.rs

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Category {0} not found.")]
    CategoryNotFound(String),

    #[error("Category {short_name} is ambiguous: {count} categories share this short name.")]
    AmbiguousCategory { short_name: String, count: usize },

    #[error("Element definition {0} not found.")]
    DefinitionNotFound(Uuid),

    #[error("Parameter of type {parameter_type} not found on element definition {definition}.")]
    ParameterNotFound { definition: String, parameter_type: String },

    #[error("No top element set on the product model.")]
    NoTopElement,
}
