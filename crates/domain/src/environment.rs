//! Environments and their variables.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tree::Named;

/// A single environment variable.
///
/// Values are stored parsed: a raw input that is valid JSON is kept as the
/// JSON value it denotes, anything else as a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name.
    #[serde(default)]
    pub key: String,

    /// Variable value.
    #[serde(default)]
    pub value: Value,
}

impl Variable {
    /// Creates a variable, parsing `raw` with [`parse_variable_value`].
    #[must_use]
    pub fn new(key: impl Into<String>, raw: &str) -> Self {
        Self {
            key: key.into(),
            value: parse_variable_value(raw),
        }
    }
}

/// Parses a raw variable value.
///
/// `"123"` becomes the number `123`, `"true"` the boolean, `"abc"` stays the
/// string `"abc"`.
#[must_use]
pub fn parse_variable_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// A named set of variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Environment name, unique case-insensitively within a project.
    pub name: String,

    /// Variables in display order.
    #[serde(default)]
    pub variables: Vec<Variable>,

    /// Position of the environment in its list.
    ///
    /// Used as a secondary key by duplicate checks; kept equal to the array
    /// position after every insert or removal.
    #[serde(
        default,
        rename = "environmentIndex",
        skip_serializing_if = "Option::is_none"
    )]
    pub environment_index: Option<usize>,
}

impl Environment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            environment_index: None,
        }
    }

    /// Appends a variable parsed from a raw value.
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, raw: &str) -> Self {
        self.variables.push(Variable::new(key, raw));
        self
    }

    /// Looks a variable value up by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables
            .iter()
            .find(|variable| variable.key == key)
            .map(|variable| &variable.value)
    }
}

impl Named for Environment {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Rewrites `environment_index` so it matches each environment's position.
pub fn renumber_environments(environments: &mut [Environment]) {
    for (index, environment) in environments.iter_mut().enumerate() {
        environment.environment_index = Some(index);
    }
}
