//! FILENAME: core/collector-engine/src/lib.rs
//! Category-driven data collection over a product tree.
//!
//! Given the flattened product tree of a model, a category hierarchy and a
//! row template, the collector produces one table row per element found at
//! the last level of the hierarchy, with the names of its matched ancestors
//! as level columns and the template's fields as value columns.
//!
//! Layers:
//! - `definition`: Category hierarchy and options (what to collect)
//! - `template`: Row fields and their registration (what a row holds)
//! - `columns`: Per-element field resolution
//! - `node` / `engine`: Tree walk and row construction (HOW we collect)
//! - `table`: The tabular result (WHAT a renderer gets)

pub mod columns;
pub mod definition;
pub mod engine;
pub mod error;
pub mod node;
pub mod table;
pub mod template;

pub use columns::{
    BoundColumn, BoundKind, CategoryColumn, ColumnDeclaration, ColumnDescriptor, ColumnKind, CompoundParameterColumn,
    ParameterColumn, StateDependentParameterColumn, ValueParser,
};
pub use definition::{CategoryFilter, CategoryFilterBuilder, CollectorOptions, HierarchyDefinition, LevelDefinition};
pub use engine::{collect_table, TreeWalker};
pub use error::CollectorError;
pub use node::{NodeId, TreeNode, TreeNodeForest};
pub use table::{CellValue, ColumnType, DataColumn, DataRow, DataTable};
pub use template::{BoundTemplate, RowContext, RowInstance, RowTemplate, RowTemplateBuilder, ValueDeclaration};
