//! FILENAME: core/product-tree/src/element.rs
//! PURPOSE: Element definitions, element usages and the product model arena.
//! CONTEXT: A definition contains usages; each usage points at another
//! definition. Starting from the top element this forms the product tree
//! that `NestedElementTreeGenerator` flattens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::{Category, CategoryRegistry};
use crate::error::ModelError;
use crate::parameter::{Parameter, ParameterOverride};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinition {
    pub iid: Uuid,
    pub short_name: String,
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub contained_elements: Vec<ElementUsage>,
}

impl ElementDefinition {
    pub fn new(short_name: impl Into<String>, name: impl Into<String>, owner: impl Into<String>) -> Self {
        ElementDefinition {
            iid: Uuid::new_v4(),
            short_name: short_name.into(),
            name: name.into(),
            owner: owner.into(),
            categories: Vec::new(),
            parameters: Vec::new(),
            contained_elements: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: &Category) -> Self {
        self.categories.push(category.iid);
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// The parameter whose type has the given short name.
    pub fn parameter_by_type(&self, type_short_name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.parameter_type.short_name == type_short_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementUsage {
    pub iid: Uuid,
    pub short_name: String,
    pub name: String,
    pub owner: String,
    /// Iid of the definition this usage instantiates.
    pub element_definition: Uuid,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    #[serde(default)]
    pub parameter_overrides: Vec<ParameterOverride>,
    /// Short names of the options this usage is excluded from.
    #[serde(default)]
    pub excluded_options: Vec<String>,
}

impl ElementUsage {
    pub fn new(
        short_name: impl Into<String>,
        name: impl Into<String>,
        owner: impl Into<String>,
        element_definition: Uuid,
    ) -> Self {
        ElementUsage {
            iid: Uuid::new_v4(),
            short_name: short_name.into(),
            name: name.into(),
            owner: owner.into(),
            element_definition,
            categories: Vec::new(),
            parameter_overrides: Vec::new(),
            excluded_options: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: &Category) -> Self {
        self.categories.push(category.iid);
        self
    }

    pub fn with_override(mut self, parameter_override: ParameterOverride) -> Self {
        self.parameter_overrides.push(parameter_override);
        self
    }

    pub fn excluded_from(mut self, option: impl Into<String>) -> Self {
        self.excluded_options.push(option.into());
        self
    }

    pub fn override_for(&self, parameter: Uuid) -> Option<&ParameterOverride> {
        self.parameter_overrides.iter().find(|o| o.parameter == parameter)
    }

    pub fn is_excluded_from(&self, option: &str) -> bool {
        self.excluded_options.iter().any(|o| o == option)
    }
}

// ============================================================================
// PRODUCT MODEL
// ============================================================================

/// Arena owning every definition of one iteration of a model, plus the
/// categories in scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductModel {
    pub categories: CategoryRegistry,
    definitions: Vec<ElementDefinition>,
    top_element: Option<Uuid>,
}

impl ProductModel {
    pub fn new() -> Self {
        ProductModel::default()
    }

    pub fn add_category(&mut self, category: Category) -> Uuid {
        self.categories.add(category)
    }

    pub fn add_definition(&mut self, definition: ElementDefinition) -> Uuid {
        let iid = definition.iid;
        self.definitions.push(definition);
        iid
    }

    /// Adds `usage` to the contained elements of the definition `container`.
    pub fn add_usage(&mut self, container: Uuid, usage: ElementUsage) -> Result<Uuid, ModelError> {
        if self.definition(usage.element_definition).is_none() {
            return Err(ModelError::DefinitionNotFound(usage.element_definition));
        }

        let iid = usage.iid;
        let definition = self
            .definition_mut(container)
            .ok_or(ModelError::DefinitionNotFound(container))?;
        definition.contained_elements.push(usage);
        Ok(iid)
    }

    pub fn set_top_element(&mut self, iid: Uuid) -> Result<(), ModelError> {
        if self.definition(iid).is_none() {
            return Err(ModelError::DefinitionNotFound(iid));
        }
        self.top_element = Some(iid);
        Ok(())
    }

    pub fn top_element(&self) -> Result<&ElementDefinition, ModelError> {
        let iid = self.top_element.ok_or(ModelError::NoTopElement)?;
        self.definition(iid).ok_or(ModelError::DefinitionNotFound(iid))
    }

    pub fn definition(&self, iid: Uuid) -> Option<&ElementDefinition> {
        self.definitions.iter().find(|d| d.iid == iid)
    }

    pub fn definition_mut(&mut self, iid: Uuid) -> Option<&mut ElementDefinition> {
        self.definitions.iter_mut().find(|d| d.iid == iid)
    }

    pub fn usage_mut(&mut self, iid: Uuid) -> Option<&mut ElementUsage> {
        self.definitions
            .iter_mut()
            .flat_map(|d| d.contained_elements.iter_mut())
            .find(|u| u.iid == iid)
    }

    pub fn definitions(&self) -> &[ElementDefinition] {
        &self.definitions
    }

    /// Adds a category to a definition or usage after the fact.
    pub fn categorize(&mut self, thing: Uuid, category: Uuid) -> Result<(), ModelError> {
        if let Some(definition) = self.definition_mut(thing) {
            definition.categories.push(category);
            return Ok(());
        }
        if let Some(usage) = self.usage_mut(thing) {
            usage.categories.push(category);
            return Ok(());
        }
        Err(ModelError::DefinitionNotFound(thing))
    }
}
