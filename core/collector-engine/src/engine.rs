//! FILENAME: core/collector-engine/src/engine.rs
//! Collector Engine - matches the flattened product tree against a category
//! hierarchy and turns the matched nodes into a table.
//!
//! The walk is depth-first and keeps the child order of the element list.
//! At every element the current level `L` decides:
//!
//! 1. element carries `L.category`: new node at `L`, children continue at `L`
//! 2. `L` already matched above, the element carries `L.next.category`:
//!    new node at `L.next`, children continue at `L.next`
//! 3. otherwise no node; children continue at `L` below the same parent,
//!    unless `L` denies skipping and already matched above, which prunes the
//!    branch

use product_tree::NestedElement;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::definition::{CategoryFilter, CollectorOptions};
use crate::error::CollectorError;
use crate::node::{NodeId, TreeNodeForest};
use crate::table::DataTable;
use crate::template::RowTemplate;

// ============================================================================
// CHILD INDEX
// ============================================================================

/// Parent/child relations of a flat element list, recovered from the usage
/// paths. Elements whose parent is not in the list count as roots.
struct ChildIndex {
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl ChildIndex {
    fn build(elements: &[NestedElement<'_>]) -> Self {
        let paths: Vec<Vec<Uuid>> = elements.iter().map(|e| e.path()).collect();
        let by_path: FxHashMap<&[Uuid], usize> = paths
            .iter()
            .enumerate()
            .map(|(i, path)| (path.as_slice(), i))
            .collect();

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); elements.len()];

        for (i, path) in paths.iter().enumerate() {
            let parent = match path.split_last() {
                Some((_, parent_path)) if !parent_path.is_empty() => by_path.get(parent_path).copied(),
                _ => None,
            };
            match parent {
                Some(p) => children[p].push(i),
                None => roots.push(i),
            }
        }

        ChildIndex { roots, children }
    }
}

// ============================================================================
// WALKER
// ============================================================================

pub struct TreeWalker<'a> {
    template: &'a RowTemplate,
}

impl<'a> TreeWalker<'a> {
    pub fn new(template: &'a RowTemplate) -> Self {
        TreeWalker { template }
    }

    pub fn template(&self) -> &'a RowTemplate {
        self.template
    }

    /// Builds the node forest for `elements`. Fails only when the template
    /// names a category that is not in the filter's scope.
    pub fn create_nodes(
        &self,
        filter: &'a CategoryFilter<'a>,
        elements: &'a [NestedElement<'a>],
    ) -> Result<TreeNodeForest<'a>, CollectorError> {
        let template = self.template.bind(filter.categories_in_scope())?;
        let mut forest = TreeNodeForest::new(template);
        let index = ChildIndex::build(elements);

        for &root in &index.roots {
            self.walk(&mut forest, &index, elements, root, filter, None);
        }

        log::debug!(
            "matched {} of {} elements into {} top-level nodes for {}",
            forest.len(),
            elements.len(),
            forest.roots().count(),
            self.template.name()
        );

        Ok(forest)
    }

    fn walk(
        &self,
        forest: &mut TreeNodeForest<'a>,
        index: &ChildIndex,
        elements: &'a [NestedElement<'a>],
        position: usize,
        level: &'a CategoryFilter<'a>,
        parent: Option<NodeId>,
    ) {
        let element = &elements[position];

        let (level, parent) = if element.is_member_of_category(level.category()) {
            log::trace!("{} matches {}", element.short_name(), level.field_name());
            (level, Some(forest.add_node(element, level, parent)))
        } else {
            let matched_above = parent
                .and_then(|p| forest.node(p))
                .map_or(false, |p| p.has_category_up_tree(level.category()));

            match level.next() {
                Some(next) if matched_above && element.is_member_of_category(next.category()) => {
                    log::trace!("{} matches {}", element.short_name(), next.field_name());
                    (next, Some(forest.add_node(element, next, parent)))
                }
                _ if matched_above && !level.allow_skip_unknown_categories() => {
                    log::trace!("{} pruned below {}", element.short_name(), level.field_name());
                    return;
                }
                _ => (level, parent),
            }
        };

        for &child in &index.children[position] {
            self.walk(forest, index, elements, child, level, parent);
        }
    }

    /// Collects the table for `elements`, or `None` if no element matched
    /// the top level.
    pub fn get_table(
        &self,
        filter: &'a CategoryFilter<'a>,
        elements: &'a [NestedElement<'a>],
        exclude_missing_parameters: bool,
    ) -> Result<Option<DataTable>, CollectorError> {
        let forest = self.create_nodes(filter, elements)?;
        let table = forest.get_table(exclude_missing_parameters);

        if let Some(table) = &table {
            log::debug!(
                "collected {} rows in {} columns for {}",
                table.row_count(),
                table.columns().len(),
                self.template.name()
            );
        }

        Ok(table)
    }
}

/// Convenience entry point: walk `elements` with `template` and `options`.
pub fn collect_table<'a>(
    template: &'a RowTemplate,
    filter: &'a CategoryFilter<'a>,
    elements: &'a [NestedElement<'a>],
    options: &CollectorOptions,
) -> Result<Option<DataTable>, CollectorError> {
    TreeWalker::new(template).get_table(filter, elements, options.exclude_missing_parameters)
}
