//! FILENAME: core/product-tree/src/nested.rs
//! PURPOSE: The flattened product tree.
//! CONTEXT: A `NestedElement` is the top element plus the chain of usages
//! leading to one position in the product tree. The generator emits all of
//! them as a flat list in depth-first pre-order; parent/child relations are
//! recovered from the usage paths.

use rustc_hash::FxHashSet;
use uuid::Uuid;

use crate::category::{Category, CategoryRegistry};
use crate::element::{ElementDefinition, ElementUsage, ProductModel};
use crate::error::ModelError;
use crate::parameter::{Parameter, ParameterOverride, ParameterType, ValueSet};

// ============================================================================
// NESTED PARAMETER
// ============================================================================

/// A parameter as seen from one position in the product tree: the definition
/// parameter, possibly replaced by the override of the usage at that position.
#[derive(Debug, Clone, Copy)]
pub struct NestedParameter<'m> {
    pub parameter: &'m Parameter,
    pub parameter_override: Option<&'m ParameterOverride>,
}

impl<'m> NestedParameter<'m> {
    pub fn parameter_type(&self) -> &'m ParameterType {
        &self.parameter.parameter_type
    }

    pub fn owner(&self) -> &'m str {
        match self.parameter_override {
            Some(o) => &o.owner,
            None => &self.parameter.owner,
        }
    }

    pub fn value_sets(&self) -> &'m [ValueSet] {
        match self.parameter_override {
            Some(o) => &o.value_sets,
            None => &self.parameter.value_sets,
        }
    }

    pub fn is_override(&self) -> bool {
        self.parameter_override.is_some()
    }
}

// ============================================================================
// NESTED ELEMENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct NestedElement<'m> {
    categories_in_scope: &'m CategoryRegistry,
    root: &'m ElementDefinition,
    usages: Vec<&'m ElementUsage>,
    definition: &'m ElementDefinition,
    direct_categories: Vec<&'m Category>,
    memberships: FxHashSet<Uuid>,
    nested_parameters: Vec<NestedParameter<'m>>,
    option: String,
}

impl<'m> NestedElement<'m> {
    fn new(
        model: &'m ProductModel,
        root: &'m ElementDefinition,
        usages: Vec<&'m ElementUsage>,
        definition: &'m ElementDefinition,
        option: &str,
    ) -> Self {
        let usage = usages.last().copied();

        let direct_iids: Vec<Uuid> = usage
            .map(|u| u.categories.as_slice())
            .unwrap_or(&[])
            .iter()
            .chain(definition.categories.iter())
            .copied()
            .collect();

        let mut seen = FxHashSet::default();
        let direct_categories = direct_iids
            .iter()
            .filter(|iid| seen.insert(**iid))
            .filter_map(|iid| model.categories.get(*iid))
            .collect();

        let memberships = model.categories.closure(&direct_iids);

        let nested_parameters = definition
            .parameters
            .iter()
            .map(|parameter| NestedParameter {
                parameter,
                parameter_override: usage.and_then(|u| u.override_for(parameter.iid)),
            })
            .collect();

        NestedElement {
            categories_in_scope: &model.categories,
            root,
            usages,
            definition,
            direct_categories,
            memberships,
            nested_parameters,
            option: option.to_string(),
        }
    }

    /// Display name: the usage name, or the definition name for the root.
    pub fn name(&self) -> &'m str {
        match self.usages.last() {
            Some(u) => &u.name,
            None => &self.root.name,
        }
    }

    /// Dotted short-name path, e.g. `ed1.eu12p1.eu2p31`.
    pub fn short_name(&self) -> String {
        std::iter::once(self.root.short_name.as_str())
            .chain(self.usages.iter().map(|u| u.short_name.as_str()))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Iid of the backing element: the last usage, or the root definition.
    pub fn iid(&self) -> Uuid {
        match self.usages.last() {
            Some(u) => u.iid,
            None => self.root.iid,
        }
    }

    pub fn owner(&self) -> &'m str {
        match self.usages.last() {
            Some(u) => &u.owner,
            None => &self.root.owner,
        }
    }

    pub fn element_definition(&self) -> &'m ElementDefinition {
        self.definition
    }

    pub fn element_usage(&self) -> Option<&'m ElementUsage> {
        self.usages.last().copied()
    }

    pub fn is_root(&self) -> bool {
        self.usages.is_empty()
    }

    /// Number of usages between the root and this element.
    pub fn depth(&self) -> usize {
        self.usages.len()
    }

    pub fn option(&self) -> &str {
        &self.option
    }

    /// Root iid followed by the iids of every usage on the path.
    pub fn path(&self) -> Vec<Uuid> {
        std::iter::once(self.root.iid)
            .chain(self.usages.iter().map(|u| u.iid))
            .collect()
    }

    /// Categories applied directly to the usage or its definition.
    pub fn categories(&self) -> &[&'m Category] {
        &self.direct_categories
    }

    pub fn categories_in_scope(&self) -> &'m CategoryRegistry {
        self.categories_in_scope
    }

    /// True if the element carries `category` or one of its sub-categories.
    pub fn is_member_of_category(&self, category: &Category) -> bool {
        self.memberships.contains(&category.iid)
    }

    /// The direct category through which the element is a member of `category`.
    pub fn actual_category(&self, category: &Category) -> Option<&'m Category> {
        self.direct_categories
            .iter()
            .copied()
            .find(|c| self.categories_in_scope.is_same_or_descendant(c.iid, category.iid))
    }

    pub fn nested_parameters(&self) -> &[NestedParameter<'m>] {
        &self.nested_parameters
    }

    pub fn nested_parameter_by_type(&self, type_short_name: &str) -> Option<&NestedParameter<'m>> {
        self.nested_parameters
            .iter()
            .find(|p| p.parameter_type().short_name == type_short_name)
    }

    /// True if `self` sits exactly one usage below `parent`.
    pub fn is_child_of(&self, parent: &NestedElement<'_>) -> bool {
        self.root.iid == parent.root.iid
            && self.usages.len() == parent.usages.len() + 1
            && self
                .usages
                .iter()
                .zip(parent.usages.iter())
                .all(|(a, b)| a.iid == b.iid)
    }

    /// Ordered children of this element within the flat element list.
    pub fn children<'e>(
        &'e self,
        elements: &'e [NestedElement<'m>],
    ) -> impl Iterator<Item = &'e NestedElement<'m>> + 'e {
        elements.iter().filter(move |e| e.is_child_of(self))
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

/// Flattens the product tree of a model for one option.
pub struct NestedElementTreeGenerator;

impl NestedElementTreeGenerator {
    pub fn generate<'m>(model: &'m ProductModel, option: &str) -> Result<Vec<NestedElement<'m>>, ModelError> {
        let root = model.top_element()?;

        let mut result = Vec::new();
        let mut usages = Vec::new();
        let mut on_path = vec![root.iid];

        Self::visit(model, root, root, &mut usages, &mut on_path, option, &mut result)?;

        log::debug!(
            "generated {} nested elements below {} for option {}",
            result.len(),
            root.short_name,
            option
        );

        Ok(result)
    }

    fn visit<'m>(
        model: &'m ProductModel,
        root: &'m ElementDefinition,
        definition: &'m ElementDefinition,
        usages: &mut Vec<&'m ElementUsage>,
        on_path: &mut Vec<Uuid>,
        option: &str,
        result: &mut Vec<NestedElement<'m>>,
    ) -> Result<(), ModelError> {
        result.push(NestedElement::new(model, root, usages.clone(), definition, option));

        for usage in &definition.contained_elements {
            if usage.is_excluded_from(option) {
                continue;
            }

            let child = model
                .definition(usage.element_definition)
                .ok_or(ModelError::DefinitionNotFound(usage.element_definition))?;

            if on_path.contains(&child.iid) {
                log::warn!(
                    "usage {} of {} points back at a definition on its own path; subtree pruned",
                    usage.short_name,
                    child.short_name
                );
                continue;
            }

            usages.push(usage);
            on_path.push(child.iid);
            Self::visit(model, root, child, usages, on_path, option, result)?;
            on_path.pop();
            usages.pop();
        }

        Ok(())
    }
}
