//! Driver interface and prepared statements

use crate::params::placeholder;
use crate::{BindType, ParameterRegistry, Result, Row, Value};
use std::future::Future;

/// A named parameter bound to a prepared statement
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: Value,
    pub bind_type: BindType,
}

/// Placeholder syntax expected by a driver that lacks named parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` per occurrence (SQLite, MySQL)
    Question,
    /// `$1`, `$2`, ... per distinct name (PostgreSQL)
    Dollar,
}

/// SQL text plus the named parameters bound to it
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    bindings: Vec<Binding>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Look up a binding; the name may be given with or without its colon
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        let name = placeholder(name);
        self.bindings.iter().find(|binding| binding.name == name)
    }

    /// Bind a value, inferring its bind type; rebinding a name replaces it
    pub fn bind(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        let binding = Binding {
            name: placeholder(name),
            bind_type: BindType::of(&value),
            value,
        };

        match self.bindings.iter_mut().find(|b| b.name == binding.name) {
            Some(existing) => *existing = binding,
            None => self.bindings.push(binding),
        }
        self
    }

    /// Bind every parameter in the registry
    pub fn bind_all(&mut self, parameters: &ParameterRegistry) -> &mut Self {
        for (name, value) in parameters.parameters() {
            self.bind(name, value.clone());
        }
        self
    }

    /// Rewrite `:name` placeholders into positional ones, returning the new
    /// SQL and the values in placeholder order.
    ///
    /// Quoted literals, `::` casts and names with no binding are left as-is.
    ///
    /// # Examples
    /// ```
    /// use quarry_core::{PlaceholderStyle, Statement, Value};
    ///
    /// let mut statement = Statement::new("SELECT * FROM users WHERE id = :id AND name <> ':id'");
    /// statement.bind("id", 7);
    ///
    /// let (sql, values) = statement.to_positional(PlaceholderStyle::Question);
    /// assert_eq!(sql, "SELECT * FROM users WHERE id = ? AND name <> ':id'");
    /// assert_eq!(values, vec![Value::Int(7)]);
    /// ```
    pub fn to_positional(&self, style: PlaceholderStyle) -> (String, Vec<Value>) {
        let chars: Vec<char> = self.sql.chars().collect();
        let mut sql = String::with_capacity(self.sql.len());
        let mut values = Vec::new();
        let mut numbered: Vec<&str> = Vec::new();
        let mut in_literal = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if c == '\'' {
                in_literal = !in_literal;
            }

            let starts_name = !in_literal
                && c == ':'
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_alphabetic() || *n == '_')
                && (i == 0 || chars[i - 1] != ':');

            if !starts_name {
                sql.push(c);
                i += 1;
                continue;
            }

            let mut end = i + 1;
            while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                end += 1;
            }
            let name: String = chars[i..end].iter().collect();

            match self.bindings.iter().find(|binding| binding.name == name) {
                Some(binding) => match style {
                    PlaceholderStyle::Question => {
                        sql.push('?');
                        values.push(binding.value.clone());
                    }
                    PlaceholderStyle::Dollar => {
                        let position = match numbered.iter().position(|n| *n == binding.name) {
                            Some(position) => position,
                            None => {
                                numbered.push(&binding.name);
                                values.push(binding.value.clone());
                                numbered.len() - 1
                            }
                        };
                        sql.push_str(&format!("${}", position + 1));
                    }
                },
                None => sql.push_str(&name),
            }
            i = end;
        }

        (sql, values)
    }
}

/// Trait for the relational driver the lifecycle runs statements through.
///
/// The connection behind a driver is owned by the caller; mutating calls
/// must not be issued concurrently on the same connection.
pub trait Driver: Send + Sync {
    /// Driver identifier, used to select the pagination dialect
    fn name(&self) -> &str;

    /// Prepare SQL text for binding
    fn prepare(&self, sql: &str) -> impl Future<Output = Result<Statement>> + Send {
        let statement = Statement::new(sql);
        async move { Ok(statement) }
    }

    /// Execute a statement that returns no rows and report rows affected
    fn execute(&self, statement: &Statement) -> impl Future<Output = Result<u64>> + Send;

    /// Execute a statement and return every row
    fn fetch_all(&self, statement: &Statement) -> impl Future<Output = Result<Vec<Row>>> + Send;

    /// Begin a transaction on the underlying connection
    fn begin_transaction(&self) -> impl Future<Output = Result<()>> + Send;

    /// Commit the open transaction
    fn commit(&self) -> impl Future<Output = Result<()>> + Send;

    /// Roll back the open transaction
    fn rollback(&self) -> impl Future<Output = Result<()>> + Send;
}

/// SQLx SQLite driver
#[cfg(feature = "sqlite")]
pub mod sqlite {
    use super::*;
    use crate::{Attributes, Error};
    use sqlx::query::Query;
    use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
    use sqlx::{Column, Row as _, Sqlite, TypeInfo};
    use crate::value::FromValue;
    use tokio::sync::Mutex;

    /// SQLite driver over a connection pool.
    ///
    /// While a transaction is open every statement runs on it; otherwise
    /// statements run directly on the pool.
    pub struct SqliteDriver {
        pool: SqlitePool,
        transaction: Mutex<Option<sqlx::Transaction<'static, Sqlite>>>,
    }

    impl SqliteDriver {
        /// Create a new driver from a connection string
        pub async fn connect(database_url: &str) -> Result<Self> {
            let pool = SqlitePool::connect(database_url).await?;
            Ok(Self::from_pool(pool))
        }

        /// Create from an existing SqlitePool
        pub fn from_pool(pool: SqlitePool) -> Self {
            Self {
                pool,
                transaction: Mutex::new(None),
            }
        }

        pub fn pool(&self) -> &SqlitePool {
            &self.pool
        }
    }

    impl Driver for SqliteDriver {
        fn name(&self) -> &str {
            "sqlite"
        }

        async fn execute(&self, statement: &Statement) -> Result<u64> {
            let (sql, values) = statement.to_positional(PlaceholderStyle::Question);
            let query = bind_values_to_query(sqlx::query(&sql), values);

            let mut transaction = self.transaction.lock().await;
            let result = match transaction.as_mut() {
                Some(tx) => query.execute(&mut **tx).await?,
                None => query.execute(&self.pool).await?,
            };
            Ok(result.rows_affected())
        }

        async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>> {
            let (sql, values) = statement.to_positional(PlaceholderStyle::Question);
            let query = bind_values_to_query(sqlx::query(&sql), values);

            let mut transaction = self.transaction.lock().await;
            let rows = match transaction.as_mut() {
                Some(tx) => query.fetch_all(&mut **tx).await?,
                None => query.fetch_all(&self.pool).await?,
            };
            rows.iter().map(row_to_attributes).collect()
        }

        async fn begin_transaction(&self) -> Result<()> {
            let mut transaction = self.transaction.lock().await;
            if transaction.is_some() {
                return Err(Error::driver("a transaction is already open"));
            }
            *transaction = Some(self.pool.begin().await?);
            Ok(())
        }

        async fn commit(&self) -> Result<()> {
            let open = self.transaction.lock().await.take();
            match open {
                Some(tx) => Ok(tx.commit().await?),
                None => Err(Error::driver("no open transaction to commit")),
            }
        }

        async fn rollback(&self) -> Result<()> {
            let open = self.transaction.lock().await.take();
            match open {
                Some(tx) => Ok(tx.rollback().await?),
                None => Err(Error::driver("no open transaction to roll back")),
            }
        }
    }

    /// Bind values to a SQLx query using their inferred bind types
    fn bind_values_to_query<'q>(
        mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
        values: Vec<Value>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        for value in values {
            query = match value.bind_type() {
                BindType::Int => query.bind(i64::from_value(&value)),
                BindType::Bool => query.bind(bool::from_value(&value)),
                BindType::Null => query.bind(None::<String>),
                BindType::Str => query.bind(value.to_bind_string()),
            };
        }
        query
    }

    fn row_to_attributes(row: &SqliteRow) -> Result<Row> {
        let mut attributes = Attributes::new();
        for (idx, column) in row.columns().iter().enumerate() {
            let value = decode_column(row, idx, column.type_info().name());
            attributes.set(column.name(), value);
        }
        Ok(attributes)
    }

    // SQLite is dynamically typed: a value whose storage class does not
    // match the declared column type is decoded by its own storage class.
    fn decode_column(row: &SqliteRow, idx: usize, type_name: &str) -> Value {
        let decoded = match type_name {
            "BOOLEAN" => row
                .try_get::<Option<bool>, _>(idx)
                .map(|v| v.map_or(Value::Null, Value::Bool)),
            "INTEGER" | "INT8" | "BIGINT" => row
                .try_get::<Option<i64>, _>(idx)
                .map(|v| v.map_or(Value::Null, Value::Int)),
            "REAL" => row
                .try_get::<Option<f64>, _>(idx)
                .map(|v| v.map_or(Value::Null, Value::Float)),
            "BLOB" => row.try_get::<Option<Vec<u8>>, _>(idx).map(|v| {
                v.map_or(Value::Null, |bytes| {
                    Value::Text(String::from_utf8_lossy(&bytes).into_owned())
                })
            }),
            _ => return decode_untyped(row, idx),
        };
        decoded.unwrap_or_else(|_| decode_untyped(row, idx))
    }

    // Expression columns carry no declared type; probe the common storage classes.
    fn decode_untyped(row: &SqliteRow, idx: usize) -> Value {
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return Value::Int(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return Value::Float(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<String>, _>(idx) {
            return Value::Text(v);
        }
        Value::Null
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_infers_types_and_normalizes_names() {
        let mut statement = Statement::new("SELECT 1");
        statement
            .bind("id", 1)
            .bind(":active", true)
            .bind("deleted_at", ())
            .bind("name", "x");

        assert_eq!(statement.binding(":id").unwrap().bind_type, BindType::Int);
        assert_eq!(statement.binding("active").unwrap().bind_type, BindType::Bool);
        assert_eq!(statement.binding("deleted_at").unwrap().bind_type, BindType::Null);
        assert_eq!(statement.binding("name").unwrap().bind_type, BindType::Str);
    }

    #[test]
    fn test_rebinding_replaces_value() {
        let mut statement = Statement::new("SELECT 1");
        statement.bind("id", 1).bind(":id", 2);

        assert_eq!(statement.bindings().len(), 1);
        assert_eq!(statement.binding("id").unwrap().value, Value::Int(2));
    }

    #[test]
    fn test_bind_all_from_registry() {
        let mut registry = ParameterRegistry::new();
        registry.set_parameters([("a", 1), ("b", 2)]);

        let mut statement = Statement::new("SELECT :a, :b");
        statement.bind_all(&registry);
        assert_eq!(statement.bindings().len(), 2);
    }

    #[test]
    fn test_question_placeholders_repeat_values() {
        let mut statement = Statement::new("SELECT * FROM t WHERE a = :x OR b = :x AND c = :y");
        statement.bind("x", 1).bind("y", "z");

        let (sql, values) = statement.to_positional(PlaceholderStyle::Question);
        assert_eq!(sql, "SELECT * FROM t WHERE a = ? OR b = ? AND c = ?");
        assert_eq!(values, vec![Value::Int(1), Value::Int(1), Value::from("z")]);
    }

    #[test]
    fn test_dollar_placeholders_reuse_positions() {
        let mut statement = Statement::new("UPDATE t SET a=:a, b=:b WHERE a=:a");
        statement.bind("a", 1).bind("b", 2);

        let (sql, values) = statement.to_positional(PlaceholderStyle::Dollar);
        assert_eq!(sql, "UPDATE t SET a=$1, b=$2 WHERE a=$1");
        assert_eq!(values, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_casts_and_unbound_names_are_untouched() {
        let mut statement = Statement::new("SELECT created::date, :missing FROM t WHERE id = :id");
        statement.bind("id", 3);

        let (sql, values) = statement.to_positional(PlaceholderStyle::Dollar);
        assert_eq!(sql, "SELECT created::date, :missing FROM t WHERE id = $1");
        assert_eq!(values, vec![Value::Int(3)]);
    }
}
