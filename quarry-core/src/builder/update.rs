//! UPDATE statement builder

use super::common::QueryBuilder;
use crate::params::placeholder;
use crate::{ParameterRegistry, Value};

/// UPDATE statement keyed by a single column
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table_name: String,
    set_columns: Vec<String>,
    key: Option<String>,
    parameters: ParameterRegistry,
}

impl UpdateBuilder {
    /// Create a new UPDATE builder
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            set_columns: Vec::new(),
            key: None,
            parameters: ParameterRegistry::new(),
        }
    }

    /// Set column values
    pub fn set<I, K, V>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (column, value) in data {
            let column = column.as_ref();
            if !self.set_columns.iter().any(|c| c == column) {
                self.set_columns.push(column.to_string());
            }
            self.parameters.set_parameters([(column, value)]);
        }
        self
    }

    /// Restrict the update to rows where `column` equals `value`, bound as `:column`
    pub fn where_key(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.parameters.set_parameters([(column, value)]);
        self.key = Some(column.to_string());
        self
    }
}

impl QueryBuilder for UpdateBuilder {
    fn to_sql(&self) -> String {
        let assignments: Vec<String> = self
            .set_columns
            .iter()
            .map(|column| format!("{}={}", column, placeholder(column)))
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table_name, assignments.join(", "));
        if let Some(key) = &self.key {
            sql.push_str(&format!(" WHERE {}={}", key, placeholder(key)));
        }
        sql
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_set_and_key() {
        let query = UpdateBuilder::new("users")
            .set([("name", Value::from("Jane")), ("age", Value::from(25))])
            .where_key("id", 7);

        assert_eq!(
            query.to_sql(),
            "UPDATE users SET name=:name, age=:age WHERE id=:id"
        );
        assert_eq!(query.parameters().len(), 3);
        assert_eq!(query.parameters().get(":id"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_update_without_key() {
        let query = UpdateBuilder::new("flags").set([("enabled", false)]);
        assert_eq!(query.to_sql(), "UPDATE flags SET enabled=:enabled");
    }
}
