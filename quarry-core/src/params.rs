//! Named bind parameters

use crate::Value;
use std::collections::BTreeMap;

/// Normalize a placeholder name to carry exactly one leading colon
pub fn placeholder(name: &str) -> String {
    format!(":{}", name.trim_start_matches(':'))
}

/// Accumulates named bind parameters for a statement.
///
/// Keys are always stored colon-prefixed; re-setting a key overwrites it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterRegistry {
    parameters: BTreeMap<String, Value>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge parameters into the registry
    ///
    /// # Examples
    /// ```
    /// use quarry_core::ParameterRegistry;
    ///
    /// let mut registry = ParameterRegistry::new();
    /// registry.set_parameters([("id", 1)]);
    /// registry.set_parameters([(":id", 2)]);
    ///
    /// assert_eq!(registry.len(), 1);
    /// assert_eq!(registry.get(":id"), Some(&2.into()));
    /// ```
    pub fn set_parameters<I, K, V>(&mut self, parameters: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in parameters {
            self.parameters
                .insert(placeholder(key.as_ref()), value.into());
        }
    }

    /// Get the full accumulated parameter set
    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    /// Look up a parameter; the name may be given with or without its colon
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.parameters.get(&placeholder(name))
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn clear(&mut self) {
        self.parameters.clear();
    }

    /// Ordered `(placeholder, value)` pairs for the final bind pass
    pub fn bindings(&self) -> Vec<(String, Value)> {
        self.parameters
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
