//! FILENAME: core/product-tree/src/category.rs
//! PURPOSE: Categories and the registry of categories in scope.
//! CONTEXT: Categories form a DAG through their super-categories. An element
//! that is a member of a sub-category is also a member of every category
//! above it, which is what the decomposition filters and category columns rely on.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// A classification that can be applied to element definitions and usages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub iid: Uuid,
    pub short_name: String,
    pub name: String,
    /// Direct super-categories (by iid).
    #[serde(default)]
    pub super_categories: Vec<Uuid>,
}

impl Category {
    pub fn new(short_name: impl Into<String>, name: impl Into<String>) -> Self {
        Category {
            iid: Uuid::new_v4(),
            short_name: short_name.into(),
            name: name.into(),
            super_categories: Vec::new(),
        }
    }

    pub fn with_super_category(mut self, super_category: &Category) -> Self {
        self.super_categories.push(super_category.iid);
        self
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// The read-only list of categories in scope of a model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        CategoryRegistry {
            categories: Vec::new(),
        }
    }

    /// Adds a category and returns its iid.
    pub fn add(&mut self, category: Category) -> Uuid {
        let iid = category.iid;
        self.categories.push(category);
        iid
    }

    pub fn get(&self, iid: Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.iid == iid)
    }

    pub fn get_mut(&mut self, iid: Uuid) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.iid == iid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Looks up the single category with the given short name.
    /// Zero or several matches are both configuration errors.
    pub fn find_by_short_name(&self, short_name: &str) -> Result<&Category, ModelError> {
        let mut matches = self.categories.iter().filter(|c| c.short_name == short_name);

        let first = matches
            .next()
            .ok_or_else(|| ModelError::CategoryNotFound(short_name.to_string()))?;

        let extra = matches.count();
        if extra > 0 {
            return Err(ModelError::AmbiguousCategory {
                short_name: short_name.to_string(),
                count: extra + 1,
            });
        }

        Ok(first)
    }

    /// Returns true if `category` is `ancestor` or has it among its
    /// transitive super-categories.
    pub fn is_same_or_descendant(&self, category: Uuid, ancestor: Uuid) -> bool {
        if category == ancestor {
            return true;
        }

        let mut visited = FxHashSet::default();
        let mut stack = vec![category];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(cat) = self.get(current) else {
                continue;
            };
            for &parent in &cat.super_categories {
                if parent == ancestor {
                    return true;
                }
                stack.push(parent);
            }
        }

        false
    }

    /// All categories implied by the given direct categories: the categories
    /// themselves plus every transitive super-category.
    pub fn closure(&self, direct: &[Uuid]) -> FxHashSet<Uuid> {
        let mut result = FxHashSet::default();
        let mut stack: Vec<Uuid> = direct.to_vec();

        while let Some(current) = stack.pop() {
            if !result.insert(current) {
                continue;
            }
            if let Some(cat) = self.get(current) {
                stack.extend(cat.super_categories.iter().copied());
            }
        }

        result
    }
}
