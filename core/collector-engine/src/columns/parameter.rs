//! FILENAME: core/collector-engine/src/columns/parameter.rs
//! Parameter columns.
//!
//! A parameter field is looked up by parameter type short name, first among
//! the element's nested parameters, then as an override on the element's
//! usage, then on the element definition. The first value of the first value
//! set is the field value; without value sets the parser's default is used.

use product_tree::{NestedElement, ParameterType, ValueSet};

use super::ValueParser;
use crate::table::{CellValue, ColumnType, DataRow, DataTable};

// ============================================================================
// SINGLE VALUE
// ============================================================================

#[derive(Debug, Clone)]
pub struct ParameterColumn<'a> {
    field: &'a str,
    short_name: Option<&'a str>,
    parser: ValueParser,
    parameter_type: Option<&'a ParameterType>,
    owner: Option<&'a str>,
    value_sets: Vec<&'a ValueSet>,
}

impl<'a> ParameterColumn<'a> {
    /// A field with no parameter behind it.
    pub fn unbound(field: &'a str, parser: ValueParser) -> Self {
        ParameterColumn {
            field,
            short_name: None,
            parser,
            parameter_type: None,
            owner: None,
            value_sets: Vec::new(),
        }
    }

    pub fn resolve(
        field: &'a str,
        short_name: Option<&'a str>,
        parser: ValueParser,
        element: &'a NestedElement<'a>,
    ) -> Self {
        let mut column = Self::unbound(field, parser);
        column.short_name = short_name;

        let Some(short_name) = short_name else {
            return column;
        };

        if let Some(nested) = element.nested_parameter_by_type(short_name) {
            column.bind(nested.parameter_type(), nested.owner(), nested.value_sets());
            return column;
        }

        if let Some(parameter) = element.element_definition().parameter_by_type(short_name) {
            let parameter_override = element
                .element_usage()
                .and_then(|usage| usage.override_for(parameter.iid));

            match parameter_override {
                Some(o) => column.bind(&parameter.parameter_type, &o.owner, &o.value_sets),
                None => column.bind(&parameter.parameter_type, &parameter.owner, &parameter.value_sets),
            }
            return column;
        }

        log::trace!("no parameter {} on {}", short_name, element.short_name());
        column
    }

    fn bind(&mut self, parameter_type: &'a ParameterType, owner: &'a str, value_sets: &'a [ValueSet]) {
        self.parameter_type = Some(parameter_type);
        self.owner = Some(owner);
        self.value_sets = value_sets.iter().collect();
    }

    pub fn field_name(&self) -> &'a str {
        self.field
    }

    /// Parameter type short name the field was declared with.
    pub fn short_name(&self) -> Option<&'a str> {
        self.short_name
    }

    pub fn parser(&self) -> ValueParser {
        self.parser
    }

    pub fn parameter_type(&self) -> Option<&'a ParameterType> {
        self.parameter_type
    }

    /// Owning domain of the resolved parameter or override.
    pub fn owner(&self) -> Option<&'a str> {
        self.owner
    }

    pub fn value_sets(&self) -> &[&'a ValueSet] {
        &self.value_sets
    }

    pub fn set_value_sets(&mut self, value_sets: Vec<&'a ValueSet>) {
        self.value_sets = value_sets;
    }

    pub fn has_value_sets(&self) -> bool {
        !self.value_sets.is_empty()
    }

    /// Distinct state short names of the value sets, in first-seen order.
    /// `None` stands for a state independent value set.
    pub fn states(&self) -> Vec<Option<&'a str>> {
        let mut states: Vec<Option<&'a str>> = Vec::new();
        for &value_set in &self.value_sets {
            let state = value_set.state_short_name();
            if !states.contains(&state) {
                states.push(state);
            }
        }
        states
    }

    /// Keeps only the value sets of `state`.
    pub(crate) fn narrow_to_state(&mut self, state: Option<&str>) {
        self.value_sets.retain(|vs| vs.state_short_name() == state);
    }

    /// Raw string at `index` of the first value set's actual value.
    pub fn raw_value(&self, index: usize) -> Option<&'a str> {
        let value_set: &'a ValueSet = *self.value_sets.first()?;
        value_set.actual_value().get(index).map(|s| s.as_str())
    }

    pub fn value(&self) -> CellValue {
        match self.raw_value(0) {
            Some(raw) => self.parser.parse(raw),
            None => self.parser.default_value(),
        }
    }

    /// The parsed first value of every value set.
    pub fn values(&self) -> Vec<CellValue> {
        self.value_sets
            .iter()
            .map(|vs| match vs.actual_value().first() {
                Some(raw) => self.parser.parse(raw),
                None => self.parser.default_value(),
            })
            .collect()
    }

    pub fn populate(&self, table: &mut DataTable, row: &mut DataRow) {
        table.add_column(self.field, self.parser.column_type());
        row.set(self.field, self.value());
    }
}

// ============================================================================
// COMPOUND
// ============================================================================

/// One text column per component of a compound parameter type,
/// named `{field}_{component}`.
#[derive(Debug, Clone)]
pub struct CompoundParameterColumn<'a> {
    values: ParameterColumn<'a>,
}

impl<'a> CompoundParameterColumn<'a> {
    pub fn new(values: ParameterColumn<'a>) -> Self {
        CompoundParameterColumn { values }
    }

    pub fn values(&self) -> &ParameterColumn<'a> {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut ParameterColumn<'a> {
        &mut self.values
    }

    /// Component short names paired with their raw value.
    pub fn components(&self) -> Vec<(&'a str, &'a str)> {
        let Some(parameter_type) = self.values.parameter_type() else {
            return Vec::new();
        };
        parameter_type
            .components()
            .iter()
            .enumerate()
            .map(|(i, c)| (c.short_name.as_str(), self.values.raw_value(i).unwrap_or("")))
            .collect()
    }

    pub fn populate(&self, table: &mut DataTable, row: &mut DataRow) {
        self.populate_with_suffix(table, row, None);
    }

    pub(crate) fn populate_with_suffix(&self, table: &mut DataTable, row: &mut DataRow, suffix: Option<&str>) {
        for (component, raw) in self.components() {
            let name = match suffix {
                Some(suffix) => format!("{}_{}_{}", self.values.field_name(), component, suffix),
                None => format!("{}_{}", self.values.field_name(), component),
            };
            table.add_column(&name, ColumnType::Text);
            row.set(name, CellValue::text(raw));
        }
    }
}

// ============================================================================
// STATE DEPENDENT
// ============================================================================

/// Writes `{field}` and `{field}_state`. A node whose state dependent
/// parameters carry several states yields one row per state; by the time a
/// row is written this column holds the value sets of that state only.
#[derive(Debug, Clone)]
pub struct StateDependentParameterColumn<'a> {
    values: ParameterColumn<'a>,
}

impl<'a> StateDependentParameterColumn<'a> {
    pub fn new(values: ParameterColumn<'a>) -> Self {
        StateDependentParameterColumn { values }
    }

    pub fn state_column_name(field: &str) -> String {
        format!("{}_state", field)
    }

    /// Adds the value and state columns for `field` ahead of any row.
    pub fn register_columns(table: &mut DataTable, field: &str, value_type: ColumnType) {
        table.add_column(field, value_type);
        table.add_column(&Self::state_column_name(field), ColumnType::Text);
    }

    pub fn values(&self) -> &ParameterColumn<'a> {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut ParameterColumn<'a> {
        &mut self.values
    }

    /// State of the first value set; empty for state independent ones.
    pub fn state(&self) -> &'a str {
        self.values
            .value_sets()
            .first()
            .copied()
            .and_then(|vs| vs.state_short_name())
            .unwrap_or("")
    }

    pub fn populate(&self, table: &mut DataTable, row: &mut DataRow) {
        let field = self.values.field_name();
        Self::register_columns(table, field, self.values.parser().column_type());
        row.set(field, self.values.value());
        row.set(Self::state_column_name(field), CellValue::text(self.state()));
    }
}
