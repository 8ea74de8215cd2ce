//! FILENAME: core/collector-engine/src/template.rs
//! Row Template - the declared fields of a report row.
//!
//! A template is registered once (`RowTemplate::builder`) and reused for any
//! number of collections, also concurrently. It lists:
//! - column fields: category flags and parameter values resolved per element
//! - value fields: typed closures evaluated per output row
//!
//! Binding a template to a category registry resolves category short names;
//! instantiating the bound template for an element yields a `RowInstance`.

use std::fmt;
use std::sync::Arc;

use product_tree::{CategoryRegistry, NestedElement};
use rustc_hash::FxHashSet;

use crate::columns::{
    BoundColumn, BoundKind, CategoryColumn, ColumnDeclaration, ColumnDescriptor, ColumnKind, ParameterColumn,
    ValueParser,
};
use crate::error::CollectorError;
use crate::node::TreeNode;
use crate::table::{CellValue, ColumnType};

pub type ValueFn = Arc<dyn Fn(&RowContext<'_, '_>) -> CellValue + Send + Sync>;

// ============================================================================
// DECLARATIONS
// ============================================================================

/// A computed field of a row template.
#[derive(Clone)]
pub struct ValueDeclaration {
    pub field: String,
    pub column_type: ColumnType,
    pub collect_parent_values: bool,
    compute: ValueFn,
}

impl ValueDeclaration {
    pub fn evaluate(&self, context: &RowContext<'_, '_>) -> CellValue {
        (self.compute)(context)
    }
}

impl fmt::Debug for ValueDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueDeclaration")
            .field("field", &self.field)
            .field("column_type", &self.column_type)
            .field("collect_parent_values", &self.collect_parent_values)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum LastField {
    Column(usize),
    Value(usize),
}

// ============================================================================
// BUILDER
// ============================================================================

#[derive(Debug)]
pub struct RowTemplateBuilder {
    name: String,
    columns: Vec<ColumnDeclaration>,
    values: Vec<ValueDeclaration>,
    last: Option<LastField>,
    error: Option<CollectorError>,
}

impl RowTemplateBuilder {
    /// Boolean field: is the element a member of the category `short_name`?
    pub fn category(self, field: &str, short_name: &str) -> Self {
        self.column(field, Some(short_name), ColumnKind::Category)
    }

    /// Single value of the parameter of type `short_name`.
    pub fn parameter(self, field: &str, short_name: &str, parser: ValueParser) -> Self {
        self.column(field, Some(short_name), ColumnKind::Parameter(parser))
    }

    /// Parameter field without a parameter type; always reads the default.
    pub fn unbound_parameter(self, field: &str, parser: ValueParser) -> Self {
        self.column(field, None, ColumnKind::Parameter(parser))
    }

    pub fn compound_parameter(self, field: &str, short_name: &str) -> Self {
        self.column(field, Some(short_name), ColumnKind::CompoundParameter)
    }

    pub fn state_dependent_parameter(self, field: &str, short_name: &str, parser: ValueParser) -> Self {
        self.column(field, Some(short_name), ColumnKind::StateDependentParameter(parser))
    }

    pub fn value<F>(mut self, field: &str, column_type: ColumnType, compute: F) -> Self
    where
        F: Fn(&RowContext<'_, '_>) -> CellValue + Send + Sync + 'static,
    {
        self.last = Some(LastField::Value(self.values.len()));
        self.values.push(ValueDeclaration {
            field: field.to_string(),
            column_type,
            collect_parent_values: false,
            compute: Arc::new(compute),
        });
        self
    }

    /// Also write the last declared field for every ancestor level, into
    /// `{field}_{levelFieldName}`.
    pub fn collect_parent_values(mut self) -> Self {
        match self.last {
            Some(LastField::Column(i)) => self.columns[i].collect_parent_values = true,
            Some(LastField::Value(i)) => self.values[i].collect_parent_values = true,
            None => {
                if self.error.is_none() {
                    self.error = Some(CollectorError::NoFieldToConfigure {
                        template: self.name.clone(),
                    });
                }
            }
        }
        self
    }

    pub fn build(self) -> Result<RowTemplate, CollectorError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut seen = FxHashSet::default();
        let fields = self
            .columns
            .iter()
            .map(|c| c.field.as_str())
            .chain(self.values.iter().map(|v| v.field.as_str()));
        for field in fields {
            if !seen.insert(field) {
                return Err(CollectorError::DuplicateField {
                    template: self.name.clone(),
                    field: field.to_string(),
                });
            }
        }

        let state_dependent: Vec<(&str, ColumnType)> = self
            .columns
            .iter()
            .filter(|c| c.kind.is_state_dependent())
            .filter_map(|c| c.kind.value_type().map(|t| (c.field.as_str(), t)))
            .collect();
        if let Some((_, first)) = state_dependent.first() {
            if state_dependent.iter().any(|(_, t)| t != first) {
                let found = state_dependent
                    .iter()
                    .map(|(field, t)| format!("{:?} ({})", t, field))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(CollectorError::MixedStateDependentTypes {
                    template: self.name.clone(),
                    found,
                });
            }
        }

        log::debug!(
            "registered row template {} with {} column fields and {} value fields",
            self.name,
            self.columns.len(),
            self.values.len()
        );

        Ok(RowTemplate {
            name: self.name,
            columns: self.columns,
            values: self.values,
        })
    }

    fn column(mut self, field: &str, short_name: Option<&str>, kind: ColumnKind) -> Self {
        self.last = Some(LastField::Column(self.columns.len()));
        self.columns
            .push(ColumnDeclaration::new(field, short_name.map(str::to_string), kind));
        self
    }
}

// ============================================================================
// TEMPLATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct RowTemplate {
    name: String,
    columns: Vec<ColumnDeclaration>,
    values: Vec<ValueDeclaration>,
}

impl RowTemplate {
    pub fn builder(name: &str) -> RowTemplateBuilder {
        RowTemplateBuilder {
            name: name.to_string(),
            columns: Vec::new(),
            values: Vec::new(),
            last: None,
            error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category and parameter fields, in declaration order.
    pub fn column_fields(&self) -> &[ColumnDeclaration] {
        &self.columns
    }

    pub fn state_dependent_fields(&self) -> impl Iterator<Item = &ColumnDeclaration> {
        self.columns.iter().filter(|c| c.kind.is_state_dependent())
    }

    pub fn value_fields(&self) -> &[ValueDeclaration] {
        &self.values
    }

    /// The value type shared by all state dependent fields.
    pub fn state_dependent_value_type(&self) -> Option<ColumnType> {
        self.state_dependent_fields().find_map(|c| c.kind.value_type())
    }

    /// Resolves category fields against `categories`. Unknown or ambiguous
    /// category short names fail here, before any element is visited. A
    /// category field declared without a short name is looked up by its
    /// field name.
    pub fn bind<'a>(&'a self, categories: &'a CategoryRegistry) -> Result<BoundTemplate<'a>, CollectorError> {
        let columns = self
            .columns
            .iter()
            .map(|declaration| -> Result<BoundColumn<'a>, CollectorError> {
                let kind = match declaration.kind {
                    ColumnKind::Category => {
                        let short_name = declaration
                            .short_name
                            .as_deref()
                            .unwrap_or(declaration.field.as_str());
                        BoundKind::Category(categories.find_by_short_name(short_name)?)
                    }
                    ColumnKind::Parameter(parser) => BoundKind::Parameter(parser),
                    ColumnKind::CompoundParameter => BoundKind::CompoundParameter,
                    ColumnKind::StateDependentParameter(parser) => BoundKind::StateDependentParameter(parser),
                };
                Ok(BoundColumn { declaration, kind })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BoundTemplate { template: self, columns })
    }
}

#[derive(Debug, Clone)]
pub struct BoundTemplate<'a> {
    template: &'a RowTemplate,
    columns: Vec<BoundColumn<'a>>,
}

impl<'a> BoundTemplate<'a> {
    pub fn template(&self) -> &'a RowTemplate {
        self.template
    }

    pub fn columns(&self) -> &[BoundColumn<'a>] {
        &self.columns
    }

    pub fn instantiate(&self, element: &'a NestedElement<'a>, is_visible: bool) -> RowInstance<'a> {
        RowInstance {
            element,
            is_visible,
            columns: self
                .columns
                .iter()
                .map(|column| ColumnDescriptor::initialize(column, element))
                .collect(),
        }
    }
}

// ============================================================================
// ROW INSTANCE
// ============================================================================

/// The template initialized for one tree node. Descriptors are parallel to
/// `RowTemplate::column_fields`.
#[derive(Debug, Clone)]
pub struct RowInstance<'a> {
    element: &'a NestedElement<'a>,
    is_visible: bool,
    columns: Vec<ColumnDescriptor<'a>>,
}

impl<'a> RowInstance<'a> {
    pub fn element(&self) -> &'a NestedElement<'a> {
        self.element
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn columns(&self) -> &[ColumnDescriptor<'a>] {
        &self.columns
    }

    pub fn column(&self, field: &str) -> Option<&ColumnDescriptor<'a>> {
        self.columns.iter().find(|c| c.field_name() == field)
    }

    pub fn parameter(&self, field: &str) -> Option<&ParameterColumn<'a>> {
        self.column(field).and_then(|c| c.as_parameter())
    }

    pub fn category(&self, field: &str) -> Option<&CategoryColumn<'a>> {
        self.column(field).and_then(|c| c.as_category())
    }

    /// True if any parameter field resolved to at least one value set.
    pub fn has_matched_parameters(&self) -> bool {
        self.columns.iter().any(|c| c.has_value_sets())
    }

    /// Distinct states across the state dependent fields, first-seen order.
    pub fn states(&self) -> Vec<Option<&'a str>> {
        let mut states = Vec::new();
        for column in self.columns.iter().filter(|c| c.is_state_dependent()) {
            if let Some(parameter) = column.as_parameter() {
                for state in parameter.states() {
                    if !states.contains(&state) {
                        states.push(state);
                    }
                }
            }
        }
        states
    }

    /// A copy whose state dependent fields only keep the value sets of `state`.
    pub fn for_state(&self, state: Option<&str>) -> RowInstance<'a> {
        let mut instance = self.clone();
        for column in instance.columns.iter_mut().filter(|c| c.is_state_dependent()) {
            if let Some(parameter) = column.as_parameter_mut() {
                parameter.narrow_to_state(state);
            }
        }
        instance
    }
}

// ============================================================================
// ROW CONTEXT
// ============================================================================

/// What a value field sees when it is evaluated.
pub struct RowContext<'r, 'a> {
    node: TreeNode<'r, 'a>,
    row: &'r RowInstance<'a>,
}

impl<'r, 'a> RowContext<'r, 'a> {
    pub(crate) fn new(node: TreeNode<'r, 'a>, row: &'r RowInstance<'a>) -> Self {
        RowContext { node, row }
    }

    pub fn node(&self) -> TreeNode<'r, 'a> {
        self.node
    }

    pub fn element(&self) -> &'a NestedElement<'a> {
        self.row.element()
    }

    pub fn is_visible(&self) -> bool {
        self.row.is_visible()
    }

    pub fn row(&self) -> &'r RowInstance<'a> {
        self.row
    }

    pub fn column(&self, field: &str) -> Option<&'r ColumnDescriptor<'a>> {
        self.row.column(field)
    }

    pub fn parameter(&self, field: &str) -> Option<&'r ParameterColumn<'a>> {
        self.row.parameter(field)
    }

    pub fn category(&self, field: &str) -> Option<&'r CategoryColumn<'a>> {
        self.row.category(field)
    }

    /// The `field` descriptors of the node's direct children.
    pub fn child_columns(&self, field: &str) -> Vec<&'r ColumnDescriptor<'a>> {
        self.node.child_columns(field)
    }
}
