//! INSERT statement builder

use super::common::QueryBuilder;
use crate::{ParameterRegistry, Value};

/// INSERT statement with one named placeholder per column
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table_name: String,
    columns: Vec<String>,
    parameters: ParameterRegistry,
}

impl InsertBuilder {
    /// Create a new INSERT builder
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            columns: Vec::new(),
            parameters: ParameterRegistry::new(),
        }
    }

    /// Add column values in the order given
    ///
    /// # Examples
    /// ```
    /// use quarry_core::{InsertBuilder, QueryBuilder, Value};
    ///
    /// let query = InsertBuilder::new("users")
    ///     .values([("name", Value::from("John")), ("age", Value::from(30))]);
    ///
    /// assert_eq!(query.to_sql(), "INSERT INTO users (name, age) VALUES (:name, :age)");
    /// ```
    pub fn values<I, K, V>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (column, value) in data {
            let column = column.as_ref();
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.to_string());
            }
            self.parameters.set_parameters([(column, value)]);
        }
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl QueryBuilder for InsertBuilder {
    fn to_sql(&self) -> String {
        let placeholders: Vec<String> = self
            .columns
            .iter()
            .map(|column| format!(":{}", column))
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table_name,
            self.columns.join(", "),
            placeholders.join(", ")
        )
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.parameters
    }
}
