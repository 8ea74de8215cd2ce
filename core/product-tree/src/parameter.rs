//! FILENAME: core/product-tree/src/parameter.rs
//! PURPOSE: Parameter types, parameters, overrides and their value sets.
//! CONTEXT: Values are kept as raw strings exactly as the model stores them;
//! interpreting them (numbers, text, booleans) is left to the consumer.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

/// Raw values of a value set, one entry per parameter type component.
pub type ValueArray = SmallVec<[String; 1]>;

/// Builds a `ValueArray` from anything string-like.
pub fn value_array<I, S>(values: I) -> ValueArray
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

// ============================================================================
// PARAMETER TYPES
// ============================================================================

/// One named component of a compound parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterTypeComponent {
    pub short_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterTypeKind {
    Quantity,
    Text,
    Boolean,
    Compound(Vec<ParameterTypeComponent>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterType {
    pub iid: Uuid,
    pub short_name: String,
    pub name: String,
    pub kind: ParameterTypeKind,
}

impl ParameterType {
    pub fn new(short_name: impl Into<String>, name: impl Into<String>, kind: ParameterTypeKind) -> Self {
        ParameterType {
            iid: Uuid::new_v4(),
            short_name: short_name.into(),
            name: name.into(),
            kind,
        }
    }

    pub fn quantity(short_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(short_name, name, ParameterTypeKind::Quantity)
    }

    pub fn text(short_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(short_name, name, ParameterTypeKind::Text)
    }

    pub fn compound<I, S>(short_name: impl Into<String>, name: impl Into<String>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let components = components
            .into_iter()
            .map(|c| ParameterTypeComponent { short_name: c.into() })
            .collect();
        Self::new(short_name, name, ParameterTypeKind::Compound(components))
    }

    /// Number of values a value set of this type carries.
    pub fn number_of_values(&self) -> usize {
        match &self.kind {
            ParameterTypeKind::Compound(components) => components.len(),
            _ => 1,
        }
    }

    pub fn components(&self) -> &[ParameterTypeComponent] {
        match &self.kind {
            ParameterTypeKind::Compound(components) => components,
            _ => &[],
        }
    }
}

// ============================================================================
// STATES AND VALUE SETS
// ============================================================================

/// A concrete state a state-dependent parameter can take a value for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualState {
    pub iid: Uuid,
    pub short_name: String,
    pub name: String,
}

impl ActualState {
    pub fn new(short_name: impl Into<String>, name: impl Into<String>) -> Self {
        ActualState {
            iid: Uuid::new_v4(),
            short_name: short_name.into(),
            name: name.into(),
        }
    }
}

/// Which of the value arrays is the actual value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueSwitch {
    Manual,
    Computed,
    Reference,
}

impl Default for ValueSwitch {
    fn default() -> Self {
        ValueSwitch::Manual
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSet {
    pub iid: Uuid,
    /// The state this value set belongs to, if the parameter is state dependent.
    #[serde(default)]
    pub actual_state: Option<ActualState>,
    pub manual: ValueArray,
    pub computed: ValueArray,
    pub reference: ValueArray,
    #[serde(default)]
    pub value_switch: ValueSwitch,
}

impl ValueSet {
    /// A value set whose arrays all hold `values`, switched to manual.
    pub fn manual(values: ValueArray) -> Self {
        ValueSet {
            iid: Uuid::new_v4(),
            actual_state: None,
            manual: values.clone(),
            computed: values.clone(),
            reference: values,
            value_switch: ValueSwitch::Manual,
        }
    }

    pub fn with_state(mut self, state: ActualState) -> Self {
        self.actual_state = Some(state);
        self
    }

    pub fn with_switch(mut self, value_switch: ValueSwitch) -> Self {
        self.value_switch = value_switch;
        self
    }

    /// The array selected by the value switch.
    pub fn actual_value(&self) -> &ValueArray {
        match self.value_switch {
            ValueSwitch::Manual => &self.manual,
            ValueSwitch::Computed => &self.computed,
            ValueSwitch::Reference => &self.reference,
        }
    }

    /// Short name of the state, or None for a state independent value set.
    pub fn state_short_name(&self) -> Option<&str> {
        self.actual_state.as_ref().map(|s| s.short_name.as_str())
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub iid: Uuid,
    pub parameter_type: ParameterType,
    /// Short name of the owning domain of expertise.
    pub owner: String,
    pub value_sets: Vec<ValueSet>,
}

impl Parameter {
    pub fn new(parameter_type: ParameterType, owner: impl Into<String>) -> Self {
        Parameter {
            iid: Uuid::new_v4(),
            parameter_type,
            owner: owner.into(),
            value_sets: Vec::new(),
        }
    }

    pub fn with_value_set(mut self, value_set: ValueSet) -> Self {
        self.value_sets.push(value_set);
        self
    }

    /// Shorthand for a state independent parameter with a single manual value.
    pub fn with_value(self, value: impl Into<String>) -> Self {
        self.with_value_set(ValueSet::manual(value_array([value])))
    }

    pub fn is_state_dependent(&self) -> bool {
        self.value_sets.iter().any(|vs| vs.actual_state.is_some())
    }
}

/// Replaces the value sets of a definition parameter for one usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterOverride {
    pub iid: Uuid,
    /// Iid of the overridden parameter on the usage's element definition.
    pub parameter: Uuid,
    pub owner: String,
    pub value_sets: Vec<ValueSet>,
}

impl ParameterOverride {
    pub fn new(parameter: &Parameter, owner: impl Into<String>) -> Self {
        ParameterOverride {
            iid: Uuid::new_v4(),
            parameter: parameter.iid,
            owner: owner.into(),
            value_sets: Vec::new(),
        }
    }

    pub fn with_value_set(mut self, value_set: ValueSet) -> Self {
        self.value_sets.push(value_set);
        self
    }

    pub fn with_value(self, value: impl Into<String>) -> Self {
        self.with_value_set(ValueSet::manual(value_array([value])))
    }
}
