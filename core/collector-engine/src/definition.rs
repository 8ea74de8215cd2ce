//! FILENAME: core/collector-engine/src/definition.rs
//! Collector Definition - the category hierarchy and collection options.
//!
//! `CategoryFilter` is the built form: a singly linked chain of levels, each
//! bound to a `Category` of the model. `HierarchyDefinition` is the
//! serializable form a report stores; `build` resolves it against the
//! categories in scope.

use product_tree::{Category, CategoryRegistry};
use serde::{Deserialize, Serialize};

use crate::error::CollectorError;

// ============================================================================
// CATEGORY FILTER
// ============================================================================

/// One level of the category hierarchy.
#[derive(Debug, Clone)]
pub struct CategoryFilter<'a> {
    category: &'a Category,
    categories_in_scope: &'a CategoryRegistry,
    field_name: String,
    max_recursion_levels: usize,
    allow_skip_unknown_categories: bool,
    next: Option<Box<CategoryFilter<'a>>>,
}

impl<'a> CategoryFilter<'a> {
    pub fn builder(categories: &'a CategoryRegistry) -> CategoryFilterBuilder<'a> {
        CategoryFilterBuilder {
            categories,
            levels: Vec::new(),
        }
    }

    pub fn category(&self) -> &'a Category {
        self.category
    }

    pub fn categories_in_scope(&self) -> &'a CategoryRegistry {
        self.categories_in_scope
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn max_recursion_levels(&self) -> usize {
        self.max_recursion_levels
    }

    pub fn is_recursive(&self) -> bool {
        self.max_recursion_levels > 1
    }

    pub fn allow_skip_unknown_categories(&self) -> bool {
        self.allow_skip_unknown_categories
    }

    pub fn next(&self) -> Option<&CategoryFilter<'a>> {
        self.next.as_deref()
    }

    /// This level followed by every level below it.
    pub fn levels(&self) -> Levels<'_, 'a> {
        Levels { current: Some(self) }
    }

    /// Column name for a node that is the `count`-th match of this level's
    /// category on its path. Counts above the recursion limit share the last
    /// column.
    pub fn level_column_name(&self, count: usize) -> String {
        if self.is_recursive() {
            format!("{}_{}", self.field_name, count.clamp(1, self.max_recursion_levels))
        } else {
            self.field_name.clone()
        }
    }

    /// Level columns from this level down, recursive levels expanded to
    /// `{field}_1 .. {field}_N`.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for level in self.levels() {
            if level.is_recursive() {
                names.extend((1..=level.max_recursion_levels).map(|i| level.level_column_name(i)));
            } else {
                names.push(level.field_name.clone());
            }
        }
        names
    }
}

pub struct Levels<'f, 'a> {
    current: Option<&'f CategoryFilter<'a>>,
}

impl<'f, 'a> Iterator for Levels<'f, 'a> {
    type Item = &'f CategoryFilter<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let level = self.current?;
        self.current = level.next.as_deref();
        Some(level)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

#[derive(Debug)]
struct PendingLevel<'a> {
    category: &'a Category,
    field_name: String,
    max_recursion_levels: usize,
    allow_skip_unknown_categories: bool,
}

/// Accumulates levels top-down. Category short names are resolved as soon as
/// a level is added, so an unknown name fails at the offending call.
#[derive(Debug)]
pub struct CategoryFilterBuilder<'a> {
    categories: &'a CategoryRegistry,
    levels: Vec<PendingLevel<'a>>,
}

impl<'a> CategoryFilterBuilder<'a> {
    pub fn with_top_level(categories: &'a CategoryRegistry, short_name: &str) -> Result<Self, CollectorError> {
        CategoryFilter::builder(categories).add_level(short_name)
    }

    pub fn add_level(self, short_name: &str) -> Result<Self, CollectorError> {
        self.push_level(short_name, None, 1)
    }

    pub fn add_level_with_field(self, short_name: &str, field_name: &str) -> Result<Self, CollectorError> {
        self.push_level(short_name, Some(field_name), 1)
    }

    pub fn add_recursive_level(
        self,
        short_name: &str,
        field_name: &str,
        max_recursion_levels: usize,
    ) -> Result<Self, CollectorError> {
        self.push_level(short_name, Some(field_name), max_recursion_levels)
    }

    /// Prunes branches below the most recently added level that continue
    /// through elements of other categories.
    pub fn deny_skip_unknown_categories(mut self) -> Result<Self, CollectorError> {
        let level = self
            .levels
            .last_mut()
            .ok_or(CollectorError::NoLevel("deny_skip_unknown_categories"))?;
        level.allow_skip_unknown_categories = false;
        Ok(self)
    }

    pub fn build(self) -> Result<CategoryFilter<'a>, CollectorError> {
        if self.levels.is_empty() {
            return Err(CollectorError::EmptyHierarchy);
        }

        let categories_in_scope = self.categories;
        let head = self.levels.into_iter().rev().fold(None, |next, level| {
            Some(Box::new(CategoryFilter {
                category: level.category,
                categories_in_scope,
                field_name: level.field_name,
                max_recursion_levels: level.max_recursion_levels,
                allow_skip_unknown_categories: level.allow_skip_unknown_categories,
                next,
            }))
        });

        head.map(|b| *b).ok_or(CollectorError::EmptyHierarchy)
    }

    fn push_level(
        mut self,
        short_name: &str,
        field_name: Option<&str>,
        max_recursion_levels: usize,
    ) -> Result<Self, CollectorError> {
        let category = self.categories.find_by_short_name(short_name)?;
        let field_name = field_name.unwrap_or(category.short_name.as_str()).to_string();

        if max_recursion_levels == 0 {
            return Err(CollectorError::InvalidRecursionLevels { field_name });
        }

        self.levels.push(PendingLevel {
            category,
            field_name,
            max_recursion_levels,
            allow_skip_unknown_categories: true,
        });
        Ok(self)
    }
}

// ============================================================================
// SERIALIZABLE DEFINITION
// ============================================================================

fn default_recursion_levels() -> usize {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    /// Category short name.
    pub category: String,
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default = "default_recursion_levels")]
    pub max_recursion_levels: usize,
    #[serde(default = "default_true")]
    pub allow_skip_unknown_categories: bool,
}

impl LevelDefinition {
    pub fn new(category: impl Into<String>) -> Self {
        LevelDefinition {
            category: category.into(),
            field_name: None,
            max_recursion_levels: 1,
            allow_skip_unknown_categories: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyDefinition {
    pub levels: Vec<LevelDefinition>,
}

impl HierarchyDefinition {
    pub fn from_json(json: &str) -> Result<Self, CollectorError> {
        serde_json::from_str(json).map_err(|e| CollectorError::InvalidDefinition(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn build<'a>(&self, categories: &'a CategoryRegistry) -> Result<CategoryFilter<'a>, CollectorError> {
        let mut builder = CategoryFilter::builder(categories);
        for level in &self.levels {
            let field_name = level.field_name.as_deref();
            builder = builder.push_level(&level.category, field_name, level.max_recursion_levels)?;
            if !level.allow_skip_unknown_categories {
                builder = builder.deny_skip_unknown_categories()?;
            }
        }
        builder.build()
    }
}

/// Per-call switches for table collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorOptions {
    /// Leaf rows without a single resolved parameter are left out.
    #[serde(default)]
    pub exclude_missing_parameters: bool,
}
