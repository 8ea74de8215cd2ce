//! FILENAME: core/collector-engine/src/columns/category.rs

use product_tree::{Category, NestedElement};

use crate::table::{CellValue, ColumnType, DataRow, DataTable};

/// Boolean column: is the element a member of the bound category (directly
/// or through one of its sub-categories)?
#[derive(Debug, Clone)]
pub struct CategoryColumn<'a> {
    field: &'a str,
    main_category: &'a Category,
    actual_category: Option<&'a Category>,
    value: bool,
}

impl<'a> CategoryColumn<'a> {
    pub fn new(field: &'a str, category: &'a Category, element: &'a NestedElement<'a>) -> Self {
        CategoryColumn {
            field,
            main_category: category,
            actual_category: element.actual_category(category),
            value: element.is_member_of_category(category),
        }
    }

    pub fn field_name(&self) -> &'a str {
        self.field
    }

    pub fn short_name(&self) -> &'a str {
        &self.main_category.short_name
    }

    /// The category the field was declared with.
    pub fn main_category(&self) -> &'a Category {
        self.main_category
    }

    /// The element's own category through which it belongs to the main
    /// category; equal to it unless membership comes from a sub-category.
    pub fn actual_category(&self) -> Option<&'a Category> {
        self.actual_category
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn populate(&self, table: &mut DataTable, row: &mut DataRow) {
        table.add_column(self.field, ColumnType::Boolean);
        row.set(self.field, CellValue::Boolean(self.value));
    }
}
