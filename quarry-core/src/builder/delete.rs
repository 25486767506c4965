//! DELETE statement builder

use super::common::QueryBuilder;
use crate::{ParameterRegistry, Value};

/// DELETE of the row whose key column equals `:id`
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table_name: String,
    key: String,
    parameters: ParameterRegistry,
}

impl DeleteBuilder {
    /// Create a new DELETE builder
    pub fn new(table: &str, key: &str) -> Self {
        Self {
            table_name: table.to_string(),
            key: key.to_string(),
            parameters: ParameterRegistry::new(),
        }
    }

    /// Bind the key value
    pub fn id(mut self, id: impl Into<Value>) -> Self {
        self.parameters.set_parameters([("id", id)]);
        self
    }
}

impl QueryBuilder for DeleteBuilder {
    fn to_sql(&self) -> String {
        format!("DELETE FROM {} WHERE {}=:id", self.table_name, self.key)
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_by_key() {
        let query = DeleteBuilder::new("users", "user_id").id(5);
        assert_eq!(query.to_sql(), "DELETE FROM users WHERE user_id=:id");
        assert_eq!(query.parameters().get(":id"), Some(&Value::Int(5)));
    }
}
