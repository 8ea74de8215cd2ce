//! FILENAME: core/product-tree/src/lib.rs
//! PURPOSE: Product composition model shared by the data collection engine.
//! CONTEXT: Categories, element definitions/usages, parameters with their
//! value sets, and the flattened nested element tree the engine walks.

pub mod category;
pub mod element;
pub mod error;
pub mod nested;
pub mod parameter;

pub use category::{Category, CategoryRegistry};
pub use element::{ElementDefinition, ElementUsage, ProductModel};
pub use error::ModelError;
pub use nested::{NestedElement, NestedElementTreeGenerator, NestedParameter};
pub use parameter::{
    value_array, ActualState, Parameter, ParameterOverride, ParameterType, ParameterTypeComponent,
    ParameterTypeKind, ValueArray, ValueSet, ValueSwitch,
};
