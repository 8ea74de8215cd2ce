//! FILENAME: core/collector-engine/tests/common/mod.rs
//! Product model fixtures and helpers for collector integration tests.

#![allow(dead_code)]

use collector_engine::{CategoryFilter, CellValue, DataTable};
use product_tree::{
    value_array, ActualState, Category, CategoryRegistry, ElementDefinition, ElementUsage, NestedElement,
    NestedElementTreeGenerator, Parameter, ParameterOverride, ParameterType, ProductModel, ValueSet,
};
use uuid::Uuid;

pub const OPTION: &str = "option1";

/// Builds a filter chain from category short names, top level first.
pub fn filter<'a>(categories: &'a CategoryRegistry, levels: &[&str]) -> CategoryFilter<'a> {
    let mut builder = CategoryFilter::builder(categories);
    for level in levels {
        builder = builder.add_level(level).unwrap();
    }
    builder.build().unwrap()
}

pub fn elements(model: &ProductModel) -> Vec<NestedElement<'_>> {
    NestedElementTreeGenerator::generate(model, OPTION).unwrap()
}

/// Text cells of `row` for the given columns; empty cells read as `None`.
pub fn texts(table: &DataTable, row: usize, columns: &[&str]) -> Vec<Option<String>> {
    columns
        .iter()
        .map(|c| table.cell(row, c).as_text().map(str::to_string))
        .collect()
}

pub fn text(value: &str) -> CellValue {
    CellValue::text(value)
}

// ============================================================================
// STRUCTURE FIXTURE
// ============================================================================

pub const ED1: &str = "element definition 1";
pub const EU12N1: &str = "element usage 1->2n #1";
pub const EU12P1: &str = "element usage 1->2p #1";
pub const EU2P31: &str = "element usage 2p->3 #1";
pub const EU4: &str = "element usage 1->4";
pub const EU5: &str = "element usage 4->5";
pub const EU6: &str = "element usage 5->6";
pub const EU7: &str = "element usage 6->7";

/// ```text
/// ed1 {cat1}
/// ├── eu12n1 {cat2} -> ed2n ── eu2n31, eu2n32 -> ed3
/// ├── eu12n2        -> ed2n ── eu2n31, eu2n32 -> ed3
/// ├── eu12p1 {cat2} -> ed2p ── eu2p31 {cat3}, eu2p32 -> ed3
/// ├── eu12p2        -> ed2p ── eu2p31 {cat3}, eu2p32 -> ed3
/// └── eu4 {cat2}    -> ed4 ── eu5 -> ed5 ── eu6 -> ed6 ── eu7 -> ed7 {cat3}
/// ```
pub struct StructureFixture {
    pub model: ProductModel,
    pub ed5: Uuid,
    pub ed6: Uuid,
}

impl StructureFixture {
    pub fn new() -> Self {
        let mut model = ProductModel::new();
        let cat1 = Category::new("cat1", "cat1");
        let cat2 = Category::new("cat2", "cat2");
        let cat3 = Category::new("cat3", "cat3");
        model.add_category(cat1.clone());
        model.add_category(cat2.clone());
        model.add_category(cat3.clone());

        let parameter = Parameter::new(ParameterType::quantity("par", "par"), "domain").with_value("2");
        let ed1 = model.add_definition(
            ElementDefinition::new("ed1", ED1, "domain")
                .with_category(&cat1)
                .with_parameter(parameter),
        );
        let ed2p = model.add_definition(ElementDefinition::new("ed2p", "element definition 2p", "domain"));
        let ed2n = model.add_definition(ElementDefinition::new("ed2n", "element definition 2n", "domain"));
        let ed3 = model.add_definition(ElementDefinition::new("ed3", "element definition 3", "domain"));
        let ed4 = model.add_definition(ElementDefinition::new("ed4", "element definition 4", "domain"));
        let ed5 = model.add_definition(ElementDefinition::new(
            "ed5",
            "element definition 5 same category",
            "domain",
        ));
        let ed6 = model.add_definition(ElementDefinition::new("ed6", "element definition 6 no category", "domain"));
        let ed7 = model.add_definition(
            ElementDefinition::new("ed7", "element definition 7 ", "domain").with_category(&cat3),
        );
        model.set_top_element(ed1).unwrap();

        let usages = [
            (ed1, ElementUsage::new("eu12n1", EU12N1, "domain", ed2n).with_category(&cat2)),
            (ed1, ElementUsage::new("eu12n2", "element usage 1->2n #2", "domain", ed2n)),
            (ed1, ElementUsage::new("eu12p1", EU12P1, "domain", ed2p).with_category(&cat2)),
            (ed1, ElementUsage::new("eu12p2", "element usage 1->2p #2", "domain", ed2p)),
            (ed2n, ElementUsage::new("eu2n31", "element usage 2n->3 #1", "domain", ed3)),
            (ed2n, ElementUsage::new("eu2n32", "element usage 2n->3 #2", "domain", ed3)),
            (ed2p, ElementUsage::new("eu2p31", EU2P31, "domain", ed3).with_category(&cat3)),
            (ed2p, ElementUsage::new("eu2p32", "element usage 2p->3 #2", "domain", ed3)),
            (ed1, ElementUsage::new("eu4", EU4, "domain", ed4).with_category(&cat2)),
            (ed4, ElementUsage::new("eu5", EU5, "domain", ed5)),
            (ed5, ElementUsage::new("eu6", EU6, "domain", ed6)),
            (ed6, ElementUsage::new("eu7", EU7, "domain", ed7)),
        ];
        for (container, usage) in usages {
            model.add_usage(container, usage).unwrap();
        }

        StructureFixture { model, ed5, ed6 }
    }

    pub fn categorize(&mut self, thing: Uuid, short_name: &str) {
        let category = self.model.categories.find_by_short_name(short_name).unwrap().iid;
        self.model.categorize(thing, category).unwrap();
    }
}

// ============================================================================
// PARAMETER FIXTURE
// ============================================================================

/// ```text
/// ed1 {cat1}  type1=11 type2=12 type3=13 type4={state1: 14, state2: 14}
/// ├── eu1 {cat2} -> ed2  overrides type1=121 type2=122 type3=123
/// └── eu2 {cat2} -> ed2  type1=-21 type2=-22 type3=-23
/// ```
pub struct ParameterFixture {
    pub model: ProductModel,
    pub eu1: Uuid,
    pub eu2: Uuid,
}

impl ParameterFixture {
    pub const ELEMENT_OWNER: &'static str = "owner";
    pub const PARAMETER_OWNER: &'static str = "owner1";
    pub const OVERRIDE_OWNER: &'static str = "owner2";

    pub fn new() -> Self {
        let mut model = ProductModel::new();
        let cat1 = Category::new("cat1", "cat1");
        let cat2 = Category::new("cat2", "cat2");
        model.add_category(cat1.clone());
        model.add_category(cat2.clone());

        let type1 = ParameterType::quantity("type1", "parameter type 1");
        let type2 = ParameterType::quantity("type2", "parameter type 2");
        let type3 = ParameterType::quantity("type3", "parameter type 3");
        let type4 = ParameterType::quantity("type4", "parameter type 4");

        let state1 = ActualState::new("state1", "possiblestate1");
        let state2 = ActualState::new("state2", "possiblestate2");

        let ed1 = ElementDefinition::new("ed1", "element definition 1", Self::ELEMENT_OWNER)
            .with_category(&cat1)
            .with_parameter(Parameter::new(type1.clone(), Self::PARAMETER_OWNER).with_value("11"))
            .with_parameter(Parameter::new(type2.clone(), Self::PARAMETER_OWNER).with_value("12"))
            .with_parameter(Parameter::new(type3.clone(), Self::PARAMETER_OWNER).with_value("13"))
            .with_parameter(
                Parameter::new(type4, Self::PARAMETER_OWNER)
                    .with_value_set(ValueSet::manual(value_array(["14"])).with_state(state1))
                    .with_value_set(ValueSet::manual(value_array(["14"])).with_state(state2)),
            );
        let ed1 = model.add_definition(ed1);

        let parameter1 = Parameter::new(type1, Self::ELEMENT_OWNER).with_value("-21");
        let parameter2 = Parameter::new(type2, Self::ELEMENT_OWNER).with_value("-22");
        let parameter3 = Parameter::new(type3, Self::ELEMENT_OWNER).with_value("-23");
        let ed2 = model.add_definition(
            ElementDefinition::new("ed2", "element definition 2", Self::ELEMENT_OWNER)
                .with_parameter(parameter1.clone())
                .with_parameter(parameter2.clone())
                .with_parameter(parameter3.clone()),
        );
        model.set_top_element(ed1).unwrap();

        let eu1 = ElementUsage::new("eu1", "element usage 1", Self::ELEMENT_OWNER, ed2)
            .with_category(&cat2)
            .with_override(ParameterOverride::new(&parameter1, Self::OVERRIDE_OWNER).with_value("121"))
            .with_override(ParameterOverride::new(&parameter2, Self::OVERRIDE_OWNER).with_value("122"))
            .with_override(ParameterOverride::new(&parameter3, Self::OVERRIDE_OWNER).with_value("123"));
        let eu1 = model.add_usage(ed1, eu1).unwrap();

        let eu2 = ElementUsage::new("eu2", "element usage 2", Self::ELEMENT_OWNER, ed2).with_category(&cat2);
        let eu2 = model.add_usage(ed1, eu2).unwrap();

        ParameterFixture { model, eu1, eu2 }
    }
}

// ============================================================================
// CATEGORY COLUMN FIXTURE
// ============================================================================

/// ```text
/// ed1 {cat1}
/// └── eu {cat2} -> ed2
/// ```
/// plus `superCat` and its sub-category `subCat`, not applied to anything.
pub struct CategoryColumnFixture {
    pub model: ProductModel,
    pub ed1: Uuid,
}

impl CategoryColumnFixture {
    pub fn new() -> Self {
        let mut model = ProductModel::new();
        let cat1 = Category::new("cat1", "cat1");
        let cat2 = Category::new("cat2", "cat2");
        let super_cat = Category::new("superCat", "superCat");
        let sub_cat = Category::new("subCat", "subCat").with_super_category(&super_cat);
        model.add_category(cat1.clone());
        model.add_category(cat2.clone());
        model.add_category(Category::new("cat3", "cat3"));
        model.add_category(super_cat);
        model.add_category(sub_cat);

        let ed1 = model.add_definition(ElementDefinition::new("ed1", "element definition 1", "domain").with_category(&cat1));
        let ed2 = model.add_definition(ElementDefinition::new("ed2", "element definition 2", "domain"));
        model.set_top_element(ed1).unwrap();
        model
            .add_usage(ed1, ElementUsage::new("eu", "element usage", "domain", ed2).with_category(&cat2))
            .unwrap();

        CategoryColumnFixture { model, ed1 }
    }

    pub fn categorize_top(&mut self, short_name: &str) {
        let category = self.model.categories.find_by_short_name(short_name).unwrap().iid;
        self.model.categorize(self.ed1, category).unwrap();
    }
}
