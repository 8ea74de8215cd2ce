//! FILENAME: core/collector-engine/src/columns/mod.rs
//! Column descriptors: the per-node data a row template field resolves to.
//!
//! A template declares its fields once (`ColumnDeclaration`); for every tree
//! node each declaration is initialized against the node's element into a
//! `ColumnDescriptor`, which then writes its cells into the output row.

pub mod category;
pub mod parameter;

use std::fmt;

use product_tree::{Category, NestedElement};

use crate::table::{CellValue, ColumnType, DataRow, DataTable};

pub use category::CategoryColumn;
pub use parameter::{CompoundParameterColumn, ParameterColumn, StateDependentParameterColumn};

// ============================================================================
// VALUE PARSING
// ============================================================================

/// Converts the raw string of a value set into a cell.
#[derive(Clone, Copy)]
pub enum ValueParser {
    /// Invariant-culture decimal; `-`, empty and unparsable text read as 0.
    Number,
    Text,
    /// `true`/`false` in any case, `1`/`0`; anything else reads as false.
    Boolean,
    Custom {
        column_type: ColumnType,
        parse: fn(&str) -> CellValue,
    },
}

impl ValueParser {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ValueParser::Number => ColumnType::Number,
            ValueParser::Text => ColumnType::Text,
            ValueParser::Boolean => ColumnType::Boolean,
            ValueParser::Custom { column_type, .. } => *column_type,
        }
    }

    pub fn parse(&self, raw: &str) -> CellValue {
        match self {
            ValueParser::Number => parse_number(raw),
            ValueParser::Text => CellValue::text(raw),
            ValueParser::Boolean => parse_boolean(raw),
            ValueParser::Custom { parse, .. } => parse(raw),
        }
    }

    /// Cell written when a parameter has no value set at all.
    pub fn default_value(&self) -> CellValue {
        self.column_type().default_value()
    }
}

impl fmt::Debug for ValueParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueParser::Number => write!(f, "Number"),
            ValueParser::Text => write!(f, "Text"),
            ValueParser::Boolean => write!(f, "Boolean"),
            ValueParser::Custom { column_type, .. } => write!(f, "Custom({:?})", column_type),
        }
    }
}

fn parse_number(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return CellValue::Number(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(n) => CellValue::Number(n),
        Err(_) => {
            log::debug!("value {:?} is not a number, using 0", raw);
            CellValue::Number(0.0)
        }
    }
}

fn parse_boolean(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    let value = trimmed.eq_ignore_ascii_case("true") || trimmed == "1";
    if !value && !trimmed.eq_ignore_ascii_case("false") && trimmed != "0" && !trimmed.is_empty() {
        log::debug!("value {:?} is not a boolean, using false", raw);
    }
    CellValue::Boolean(value)
}

// ============================================================================
// DECLARATIONS
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum ColumnKind {
    Category,
    Parameter(ValueParser),
    CompoundParameter,
    StateDependentParameter(ValueParser),
}

impl ColumnKind {
    pub fn is_state_dependent(&self) -> bool {
        matches!(self, ColumnKind::StateDependentParameter(_))
    }

    pub fn is_parameter(&self) -> bool {
        !matches!(self, ColumnKind::Category)
    }

    /// Declared value type of the field, if it has a single one.
    pub fn value_type(&self) -> Option<ColumnType> {
        match self {
            ColumnKind::Category => Some(ColumnType::Boolean),
            ColumnKind::Parameter(parser) | ColumnKind::StateDependentParameter(parser) => {
                Some(parser.column_type())
            }
            ColumnKind::CompoundParameter => None,
        }
    }
}

/// A column field of a row template.
#[derive(Debug, Clone)]
pub struct ColumnDeclaration {
    pub field: String,
    /// Category or parameter type short name; `None` for unbound parameters.
    pub short_name: Option<String>,
    pub kind: ColumnKind,
    pub collect_parent_values: bool,
}

impl ColumnDeclaration {
    pub fn new(field: impl Into<String>, short_name: Option<String>, kind: ColumnKind) -> Self {
        ColumnDeclaration {
            field: field.into(),
            short_name,
            kind,
            collect_parent_values: false,
        }
    }
}

/// `ColumnKind` with the category of a category field resolved.
#[derive(Debug, Clone, Copy)]
pub enum BoundKind<'a> {
    Category(&'a Category),
    Parameter(ValueParser),
    CompoundParameter,
    StateDependentParameter(ValueParser),
}

/// A declaration bound to the categories in scope.
#[derive(Debug, Clone, Copy)]
pub struct BoundColumn<'a> {
    pub declaration: &'a ColumnDeclaration,
    pub kind: BoundKind<'a>,
}

impl<'a> BoundColumn<'a> {
    pub fn category(&self) -> Option<&'a Category> {
        match self.kind {
            BoundKind::Category(category) => Some(category),
            _ => None,
        }
    }
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

#[derive(Debug, Clone)]
pub enum ColumnDescriptor<'a> {
    Category(CategoryColumn<'a>),
    Parameter(ParameterColumn<'a>),
    CompoundParameter(CompoundParameterColumn<'a>),
    StateDependentParameter(StateDependentParameterColumn<'a>),
}

impl<'a> ColumnDescriptor<'a> {
    /// Resolves a bound declaration against one element.
    pub fn initialize(column: &BoundColumn<'a>, element: &'a NestedElement<'a>) -> Self {
        let declaration = column.declaration;
        let short_name = declaration.short_name.as_deref();

        match column.kind {
            BoundKind::Category(category) => {
                ColumnDescriptor::Category(CategoryColumn::new(&declaration.field, category, element))
            }
            BoundKind::Parameter(parser) => ColumnDescriptor::Parameter(ParameterColumn::resolve(
                &declaration.field,
                short_name,
                parser,
                element,
            )),
            BoundKind::CompoundParameter => ColumnDescriptor::CompoundParameter(CompoundParameterColumn::new(
                ParameterColumn::resolve(&declaration.field, short_name, ValueParser::Text, element),
            )),
            BoundKind::StateDependentParameter(parser) => ColumnDescriptor::StateDependentParameter(
                StateDependentParameterColumn::new(ParameterColumn::resolve(
                    &declaration.field,
                    short_name,
                    parser,
                    element,
                )),
            ),
        }
    }

    pub fn field_name(&self) -> &'a str {
        match self {
            ColumnDescriptor::Category(c) => c.field_name(),
            ColumnDescriptor::Parameter(p) => p.field_name(),
            ColumnDescriptor::CompoundParameter(c) => c.values().field_name(),
            ColumnDescriptor::StateDependentParameter(s) => s.values().field_name(),
        }
    }

    pub fn is_state_dependent(&self) -> bool {
        matches!(self, ColumnDescriptor::StateDependentParameter(_))
    }

    pub fn as_category(&self) -> Option<&CategoryColumn<'a>> {
        match self {
            ColumnDescriptor::Category(c) => Some(c),
            _ => None,
        }
    }

    /// The resolved parameter behind any of the parameter variants.
    pub fn as_parameter(&self) -> Option<&ParameterColumn<'a>> {
        match self {
            ColumnDescriptor::Category(_) => None,
            ColumnDescriptor::Parameter(p) => Some(p),
            ColumnDescriptor::CompoundParameter(c) => Some(c.values()),
            ColumnDescriptor::StateDependentParameter(s) => Some(s.values()),
        }
    }

    pub(crate) fn as_parameter_mut(&mut self) -> Option<&mut ParameterColumn<'a>> {
        match self {
            ColumnDescriptor::Category(_) => None,
            ColumnDescriptor::Parameter(p) => Some(p),
            ColumnDescriptor::CompoundParameter(c) => Some(c.values_mut()),
            ColumnDescriptor::StateDependentParameter(s) => Some(s.values_mut()),
        }
    }

    /// False for category columns.
    pub fn has_value_sets(&self) -> bool {
        self.as_parameter().map_or(false, |p| p.has_value_sets())
    }

    /// Writes this descriptor's cells into `row`, registering any column the
    /// table does not have yet.
    pub fn populate(&self, table: &mut DataTable, row: &mut DataRow) {
        match self {
            ColumnDescriptor::Category(c) => c.populate(table, row),
            ColumnDescriptor::Parameter(p) => p.populate(table, row),
            ColumnDescriptor::CompoundParameter(c) => c.populate(table, row),
            ColumnDescriptor::StateDependentParameter(s) => s.populate(table, row),
        }
    }

    /// Writes this descriptor's value under `{field}_{level_field}`, the
    /// column a descendant row uses for values collected from this level.
    pub fn populate_collected(&self, table: &mut DataTable, row: &mut DataRow, level_field: &str) {
        match self {
            ColumnDescriptor::Category(c) => {
                let name = format!("{}_{}", c.field_name(), level_field);
                table.add_column(&name, ColumnType::Boolean);
                row.set(name, CellValue::Boolean(c.value()));
            }
            ColumnDescriptor::Parameter(p) => {
                let name = format!("{}_{}", p.field_name(), level_field);
                table.add_column(&name, p.parser().column_type());
                row.set(name, p.value());
            }
            ColumnDescriptor::CompoundParameter(c) => c.populate_with_suffix(table, row, Some(level_field)),
            ColumnDescriptor::StateDependentParameter(s) => {
                let p = s.values();
                let name = format!("{}_{}", p.field_name(), level_field);
                table.add_column(&name, p.parser().column_type());
                row.set(name, p.value());
            }
        }
    }
}
