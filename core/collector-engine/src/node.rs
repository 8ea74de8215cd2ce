//! FILENAME: core/collector-engine/src/node.rs
//! Tree Nodes - the matched part of the product tree.
//!
//! The walker creates one node per element that matched a hierarchy level.
//! Nodes live in a `TreeNodeForest` arena and are addressed by index;
//! `TreeNode` is a cheap handle pairing the arena with an index. Visibility
//! and the row instance of a node are computed on first use and cached.

use std::borrow::Cow;
use std::fmt;

use once_cell::unsync::OnceCell;
use product_tree::{Category, NestedElement};
use smallvec::{smallvec, SmallVec};

use crate::columns::{ColumnDescriptor, StateDependentParameterColumn};
use crate::definition::CategoryFilter;
use crate::table::{CellValue, ColumnType, DataRow, DataTable};
use crate::template::{BoundTemplate, RowContext, RowInstance};

pub type NodeId = usize;

#[derive(Debug)]
struct NodeData<'a> {
    element: &'a NestedElement<'a>,
    level: &'a CategoryFilter<'a>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visible: OnceCell<bool>,
    subtree_visible: OnceCell<bool>,
    row: OnceCell<RowInstance<'a>>,
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug)]
pub struct TreeNodeForest<'a> {
    template: BoundTemplate<'a>,
    nodes: Vec<NodeData<'a>>,
    roots: Vec<NodeId>,
}

impl<'a> TreeNodeForest<'a> {
    pub(crate) fn new(template: BoundTemplate<'a>) -> Self {
        TreeNodeForest {
            template,
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub(crate) fn add_node(
        &mut self,
        element: &'a NestedElement<'a>,
        level: &'a CategoryFilter<'a>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            element,
            level,
            parent,
            children: Vec::new(),
            visible: OnceCell::new(),
            subtree_visible: OnceCell::new(),
            row: OnceCell::new(),
        });

        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn template(&self) -> &BoundTemplate<'a> {
        &self.template
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<TreeNode<'_, 'a>> {
        (id < self.nodes.len()).then(|| TreeNode { forest: self, id })
    }

    /// Top-level nodes, in walk order.
    pub fn roots(&self) -> impl Iterator<Item = TreeNode<'_, 'a>> + '_ {
        self.roots.iter().map(move |&id| TreeNode { forest: self, id })
    }

    /// Every node, in creation order (depth-first pre-order).
    pub fn nodes(&self) -> impl Iterator<Item = TreeNode<'_, 'a>> + '_ {
        (0..self.nodes.len()).map(move |id| TreeNode { forest: self, id })
    }

    /// One table per top-level node, merged. `None` if nothing matched.
    pub fn get_table(&self, exclude_missing_parameters: bool) -> Option<DataTable> {
        let mut roots = self.roots();
        let mut table = roots.next()?.get_table(exclude_missing_parameters);
        for root in roots {
            table.merge(root.get_table(exclude_missing_parameters));
        }
        Some(table)
    }
}

// ============================================================================
// NODE HANDLE
// ============================================================================

#[derive(Clone, Copy)]
pub struct TreeNode<'f, 'a> {
    forest: &'f TreeNodeForest<'a>,
    id: NodeId,
}

impl fmt::Debug for TreeNode<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("id", &self.id)
            .field("element", &self.element().short_name())
            .field("level", &self.filter_level().field_name())
            .finish()
    }
}

impl<'f, 'a> TreeNode<'f, 'a> {
    fn data(&self) -> &'f NodeData<'a> {
        &self.forest.nodes[self.id]
    }

    fn handle(&self, id: NodeId) -> TreeNode<'f, 'a> {
        TreeNode { forest: self.forest, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn element(&self) -> &'a NestedElement<'a> {
        self.data().element
    }

    /// The hierarchy level this node's element matched.
    pub fn filter_level(&self) -> &'a CategoryFilter<'a> {
        self.data().level
    }

    pub fn parent(&self) -> Option<TreeNode<'f, 'a>> {
        self.data().parent.map(|id| self.handle(id))
    }

    pub fn children(&self) -> impl Iterator<Item = TreeNode<'f, 'a>> + 'f {
        let forest = self.forest;
        self.data().children.iter().map(move |&id| TreeNode { forest, id })
    }

    /// This node followed by its ancestors up to the top-level node.
    pub fn ancestors(&self) -> impl Iterator<Item = TreeNode<'f, 'a>> + 'f {
        std::iter::successors(Some(*self), |node| node.parent())
    }

    pub fn is_root(&self) -> bool {
        self.data().parent.is_none()
    }

    pub fn matches_level(&self) -> bool {
        self.element().is_member_of_category(self.filter_level().category())
    }

    /// Matches its level and nothing below it is visible: rows come from the
    /// deepest matched node on each path.
    pub fn is_visible(&self) -> bool {
        *self
            .data()
            .visible
            .get_or_init(|| self.matches_level() && !self.children().any(|c| c.has_visible_subtree()))
    }

    fn has_visible_subtree(&self) -> bool {
        *self
            .data()
            .subtree_visible
            .get_or_init(|| self.is_visible() || self.children().any(|c| c.has_visible_subtree()))
    }

    /// True if this node or an ancestor carries `category`.
    pub fn has_category_up_tree(&self, category: &Category) -> bool {
        self.ancestors().any(|n| n.element().is_member_of_category(category))
    }

    /// Number of nodes from here up to the top whose element carries
    /// `category`, this node included.
    pub fn count_category_recursion_level(&self, category: &Category) -> usize {
        self.ancestors()
            .filter(|n| n.element().is_member_of_category(category))
            .count()
    }

    /// Level column this node writes its element name to.
    pub fn field_name(&self) -> String {
        let level = self.filter_level();
        if level.is_recursive() {
            level.level_column_name(self.count_category_recursion_level(level.category()))
        } else {
            level.field_name().to_string()
        }
    }

    /// The row template initialized for this node.
    pub fn row(&self) -> &'f RowInstance<'a> {
        self.data()
            .row
            .get_or_init(|| self.forest.template.instantiate(self.element(), self.is_visible()))
    }

    pub fn column(&self, field: &str) -> Option<&'f ColumnDescriptor<'a>> {
        self.row().column(field)
    }

    pub fn child_columns(&self, field: &str) -> Vec<&'f ColumnDescriptor<'a>> {
        self.children().filter_map(|child| child.column(field)).collect()
    }

    pub fn has_matched_parameters(&self) -> bool {
        self.row().has_matched_parameters()
    }

    // ========================================================================
    // TABLE
    // ========================================================================

    /// Table for the subtree below (and including) this node.
    pub fn get_table(&self, exclude_missing_parameters: bool) -> DataTable {
        let mut table = DataTable::new();
        let template = self.forest.template.template();

        for name in self.filter_level().column_names() {
            table.add_column(&name, ColumnType::Text);
        }

        for value in template.value_fields() {
            table.add_column(&value.field, value.column_type);
        }

        for field in template.state_dependent_fields() {
            if let Some(value_type) = field.kind.value_type() {
                StateDependentParameterColumn::register_columns(&mut table, &field.field, value_type);
            }
        }

        self.add_rows(&mut table, exclude_missing_parameters);
        table
    }

    fn add_rows(&self, table: &mut DataTable, exclude_missing_parameters: bool) {
        let is_last_level = self.filter_level().next().is_none();

        if self.is_visible() && is_last_level && (!exclude_missing_parameters || self.has_matched_parameters()) {
            self.add_row(table);
        }

        for child in self.children() {
            child.add_rows(table, exclude_missing_parameters);
        }
    }

    fn add_row(&self, table: &mut DataTable) {
        let template = self.forest.template.template();

        for instance in self.row_representations() {
            let mut row = table.new_row();
            self.initialize_category_columns(table, &mut row, &instance);

            let context = RowContext::new(*self, &instance);
            for value in template.value_fields() {
                row.set(value.field.as_str(), value.evaluate(&context));
            }

            let (state_dependent, ordinary): (Vec<_>, Vec<_>) =
                instance.columns().iter().partition(|c| c.is_state_dependent());
            for column in ordinary.into_iter().chain(state_dependent) {
                column.populate(table, &mut row);
            }

            table.add_row(row);
        }
    }

    /// One instance per state of the state dependent fields; just the cached
    /// instance when there is at most one state.
    fn row_representations(&self) -> SmallVec<[Cow<'f, RowInstance<'a>>; 1]> {
        let row = self.row();
        let states = row.states();
        if states.len() <= 1 {
            return smallvec![Cow::Borrowed(row)];
        }

        log::trace!("{} fans out over {} states", self.element().short_name(), states.len());
        states
            .into_iter()
            .map(|state| Cow::Owned(row.for_state(state)))
            .collect()
    }

    /// Level cells from the top down. `instance` is this node's row as
    /// written, possibly narrowed to one state; ancestors use their own rows.
    fn initialize_category_columns(&self, table: &mut DataTable, row: &mut DataRow, instance: &RowInstance<'a>) {
        if let Some(parent) = self.parent() {
            parent.initialize_category_columns(table, row, parent.row());
        }

        let level_field = self.field_name();
        table.add_column(&level_field, ColumnType::Text);
        row.set(level_field.as_str(), CellValue::text(self.element().name()));

        self.populate_collected_values(table, row, &level_field, instance);
    }

    fn populate_collected_values(
        &self,
        table: &mut DataTable,
        row: &mut DataRow,
        level_field: &str,
        instance: &RowInstance<'a>,
    ) {
        let bound = &self.forest.template;

        for (column, descriptor) in bound.columns().iter().zip(instance.columns()) {
            if column.declaration.collect_parent_values {
                descriptor.populate_collected(table, row, level_field);
            }
        }

        let mut collected = bound
            .template()
            .value_fields()
            .iter()
            .filter(|v| v.collect_parent_values)
            .peekable();
        if collected.peek().is_none() {
            return;
        }

        let context = RowContext::new(*self, instance);
        for value in collected {
            let name = format!("{}_{}", value.field, level_field);
            table.add_column(&name, value.column_type);
            row.set(name, value.evaluate(&context));
        }
    }
}
