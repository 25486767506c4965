//! SELECT statement builder

use super::common::{IntoColumns, JoinType, OrderByClause, QueryBuilder, SortDirection};
use super::fragment::{Fragment, FragmentKind};
use crate::{Dialect, ParameterRegistry, Result, Value};
use std::collections::HashMap;

/// Accumulates named SELECT fragments and assembles the final SQL text.
///
/// Fragments persist across calls until [`StatementBuilder::reset`]; the
/// table and dialect survive a reset.
#[derive(Debug, Clone, Default)]
pub struct StatementBuilder {
    table_name: String,
    dialect: Dialect,
    fragments: HashMap<FragmentKind, Fragment>,
    parameters: ParameterRegistry,
}

impl StatementBuilder {
    /// Create a new builder for the given table
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            ..Self::default()
        }
    }

    pub fn set_table(&mut self, table: &str) -> &mut Self {
        self.table_name = table.to_string();
        self
    }

    pub fn table(&self) -> &str {
        &self.table_name
    }

    /// Select the pagination dialect from a driver identifier
    pub fn set_driver(&mut self, driver_name: &str) -> &mut Self {
        self.dialect = Dialect::from_driver_name(driver_name);
        self
    }

    pub fn set_dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.dialect = dialect;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Store a fragment under its own name, replacing any previous value
    pub fn set_statement(&mut self, fragment: Fragment) -> &mut Self {
        self.fragments.insert(fragment.kind(), fragment);
        self
    }

    /// Get a fragment; unset and falsy fragments both read as `None`
    pub fn get_statement(&self, kind: FragmentKind) -> Option<&Fragment> {
        self.fragments.get(&kind).filter(|fragment| fragment.is_set())
    }

    /// Merge named parameters; keys are normalized to `:name`
    pub fn set_parameter<I, K, V>(&mut self, parameters: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.parameters.set_parameters(parameters);
        self
    }

    pub fn set_fields<C: IntoColumns>(&mut self, columns: C) -> &mut Self {
        self.set_statement(Fragment::Fields(columns.into_columns()))
    }

    pub fn set_distinct(&mut self, distinct: bool) -> &mut Self {
        self.set_statement(Fragment::Distinct(distinct))
    }

    /// Replace the WHERE condition
    pub fn set_where(&mut self, condition: &str) -> &mut Self {
        self.set_statement(Fragment::Where(condition.to_string()))
    }

    /// Append to the WHERE condition with a single space. The caller
    /// supplies any boolean connector (`AND`, `OR`) in `condition`.
    pub fn append_where(&mut self, condition: &str) -> &mut Self {
        let combined = match self.where_clause() {
            Some(existing) => format!("{} {}", existing, condition),
            None => condition.to_string(),
        };
        self.set_where(&combined)
    }

    /// Add a join clause; `join_type` is one of INNER, LEFT or RIGHT in any case
    ///
    /// # Examples
    /// ```
    /// use quarry_core::{QueryBuilder, StatementBuilder};
    ///
    /// let mut builder = StatementBuilder::new("users");
    /// builder.set_fields("*");
    /// builder.set_join("left", "orders", "orders.user_id = users.id").unwrap();
    ///
    /// assert_eq!(
    ///     builder.to_sql(),
    ///     "SELECT * FROM users LEFT JOIN orders ON orders.user_id = users.id"
    /// );
    /// assert!(builder.set_join("outer", "x", "1 = 1").is_err());
    /// ```
    pub fn set_join(&mut self, join_type: &str, table: &str, condition: &str) -> Result<&mut Self> {
        let join_type: JoinType = join_type.parse()?;
        Ok(self.join(join_type, table, condition))
    }

    /// Append a pre-rendered `{TYPE} JOIN {table} ON {condition}` clause
    pub fn join(&mut self, join_type: JoinType, table: &str, condition: &str) -> &mut Self {
        let mut joins = self.joins().to_vec();
        joins.push(format!("{} JOIN {} ON {}", join_type, table, condition));
        self.set_statement(Fragment::Join(joins))
    }

    /// Set the single ORDER BY column; the last call wins
    pub fn set_order(&mut self, column: &str, direction: &str) -> Result<&mut Self> {
        let direction: SortDirection = direction.parse()?;
        Ok(self.order_by(column, direction))
    }

    pub fn order_by(&mut self, column: &str, direction: SortDirection) -> &mut Self {
        self.set_statement(Fragment::Order(OrderByClause {
            column: column.to_string(),
            direction,
        }))
    }

    /// Set the row limit; zero means no limit
    pub fn set_limit(&mut self, limit: u64) -> &mut Self {
        self.set_statement(Fragment::Limit(limit))
    }

    pub fn set_offset(&mut self, offset: u64) -> &mut Self {
        self.set_statement(Fragment::Offset(offset))
    }

    /// Clear all fragments and parameters
    pub fn reset(&mut self) -> &mut Self {
        self.fragments.clear();
        self.parameters.clear();
        self
    }

    pub fn fields(&self) -> &[String] {
        match self.get_statement(FragmentKind::Fields) {
            Some(Fragment::Fields(fields)) => fields.as_slice(),
            _ => &[],
        }
    }

    pub fn is_distinct(&self) -> bool {
        self.get_statement(FragmentKind::Distinct).is_some()
    }

    pub fn joins(&self) -> &[String] {
        match self.get_statement(FragmentKind::Join) {
            Some(Fragment::Join(joins)) => joins.as_slice(),
            _ => &[],
        }
    }

    pub fn where_clause(&self) -> Option<&str> {
        match self.get_statement(FragmentKind::Where) {
            Some(Fragment::Where(condition)) => Some(condition.as_str()),
            _ => None,
        }
    }

    pub fn order(&self) -> Option<&OrderByClause> {
        match self.get_statement(FragmentKind::Order) {
            Some(Fragment::Order(order)) => Some(order),
            _ => None,
        }
    }

    pub fn limit(&self) -> Option<u64> {
        match self.get_statement(FragmentKind::Limit) {
            Some(Fragment::Limit(limit)) => Some(*limit),
            _ => None,
        }
    }

    pub fn offset(&self) -> Option<u64> {
        match self.get_statement(FragmentKind::Offset) {
            Some(Fragment::Offset(offset)) => Some(*offset),
            _ => None,
        }
    }

    /// Assemble SELECT, JOIN, WHERE, ORDER BY and pagination, skipping
    /// empty segments
    pub fn build_query(&self) -> String {
        let parts = [
            self.build_select(),
            self.build_joins(),
            self.build_where(),
            self.build_order_by(),
            self.build_limit_offset(),
        ];

        parts
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn build_select(&self) -> String {
        let keyword = if self.is_distinct() {
            "SELECT DISTINCT "
        } else {
            "SELECT "
        };
        format!("{}{} FROM {}", keyword, self.fields().join(", "), self.table_name)
    }

    fn build_joins(&self) -> String {
        self.joins().join(" ")
    }

    fn build_where(&self) -> String {
        self.where_clause()
            .map(|condition| format!("WHERE {}", condition))
            .unwrap_or_default()
    }

    fn build_order_by(&self) -> String {
        self.order().map(ToString::to_string).unwrap_or_default()
    }

    fn build_limit_offset(&self) -> String {
        if self.limit().is_none() {
            return String::new();
        }

        match self.dialect {
            Dialect::Generic => self.build_default_limit_offset(),
            Dialect::OffsetFetch => self.build_offset_fetch(),
        }
    }

    fn build_default_limit_offset(&self) -> String {
        let limit = self.limit().unwrap_or_default();
        match self.offset() {
            Some(offset) => format!("LIMIT {} OFFSET {}", limit, offset),
            None => format!("LIMIT {}", limit),
        }
    }

    // OFFSET/FETCH is only valid after an ORDER BY, so an ordinal one is
    // injected when none was configured.
    fn build_offset_fetch(&self) -> String {
        let offset = self.offset().unwrap_or(0);
        let limit = self
            .limit()
            .map_or_else(|| "ALL".to_string(), |limit| limit.to_string());

        let clause = format!("OFFSET {} ROWS FETCH NEXT {} ROWS ONLY", offset, limit);
        if self.order().is_none() {
            format!("ORDER BY 1 {}", clause)
        } else {
            clause
        }
    }
}

impl QueryBuilder for StatementBuilder {
    fn to_sql(&self) -> String {
        self.build_query()
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn users() -> StatementBuilder {
        let mut builder = StatementBuilder::new("users");
        builder.set_fields(("id", "name"));
        builder
    }

    #[test]
    fn test_basic_select() {
        let builder = users();
        assert_eq!(builder.build_query(), "SELECT id, name FROM users");
    }

    #[test]
    fn test_build_is_deterministic() {
        let mut builder = users();
        builder.set_where("id = :id").set_limit(5);
        assert_eq!(builder.build_query(), builder.build_query());
    }

    #[test]
    fn test_distinct() {
        let mut builder = StatementBuilder::new("users");
        builder.set_fields("status").set_distinct(true);
        assert_eq!(builder.build_query(), "SELECT DISTINCT status FROM users");
    }

    #[test]
    fn test_joins_keep_call_order() {
        let mut builder = users();
        builder
            .set_join("left", "orders", "orders.user_id=users.id")
            .unwrap()
            .set_join("inner", "payments", "payments.order_id=orders.id")
            .unwrap();

        assert_eq!(
            builder.build_query(),
            "SELECT id, name FROM users \
             LEFT JOIN orders ON orders.user_id=users.id \
             INNER JOIN payments ON payments.order_id=orders.id"
        );
    }

    #[test]
    fn test_duplicate_joins_are_kept() {
        let mut builder = users();
        builder.set_join("RIGHT", "a", "a.id=users.id").unwrap();
        builder.set_join("right", "a", "a.id=users.id").unwrap();
        assert_eq!(builder.joins().len(), 2);
    }

    #[test]
    fn test_invalid_join_type() {
        let mut builder = users();
        let err = builder.set_join("outer", "orders", "1=1").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(err.to_string().contains("'OUTER'"));
        assert!(err.to_string().contains("INNER, LEFT, RIGHT"));
        assert!(builder.joins().is_empty());
    }

    #[test]
    fn test_where_appends_with_space() {
        let mut builder = users();
        builder.append_where("age > :age");
        builder.append_where("AND name = :name");
        assert_eq!(
            builder.build_query(),
            "SELECT id, name FROM users WHERE age > :age AND name = :name"
        );
    }

    #[test]
    fn test_order_last_write_wins() {
        let mut builder = users();
        builder.set_order("id", "asc").unwrap();
        builder.set_order("name", "desc").unwrap();
        assert_eq!(builder.build_query(), "SELECT id, name FROM users ORDER BY name DESC");
    }

    #[test]
    fn test_invalid_direction() {
        let mut builder = users();
        let err = builder.set_order("x", "up").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(builder.order().is_none());
    }

    #[test]
    fn test_generic_limit_only() {
        let mut builder = users();
        builder.set_limit(10);
        assert_eq!(builder.build_query(), "SELECT id, name FROM users LIMIT 10");
    }

    #[test]
    fn test_generic_limit_and_offset() {
        let mut builder = users();
        builder.set_limit(10).set_offset(20);
        assert_eq!(builder.build_query(), "SELECT id, name FROM users LIMIT 10 OFFSET 20");
    }

    #[test]
    fn test_zero_offset_is_omitted() {
        let mut builder = users();
        builder.set_limit(10).set_offset(0);
        assert_eq!(builder.build_query(), "SELECT id, name FROM users LIMIT 10");
    }

    #[test]
    fn test_zero_limit_means_no_pagination() {
        let mut builder = users();
        builder.set_limit(0).set_offset(20);
        assert_eq!(builder.build_query(), "SELECT id, name FROM users");
        assert!(builder.get_statement(FragmentKind::Limit).is_none());
    }

    #[test]
    fn test_offset_fetch_injects_default_order() {
        let mut builder = users();
        builder.set_driver("sqlsrv").set_limit(10);
        assert_eq!(
            builder.build_query(),
            "SELECT id, name FROM users ORDER BY 1 OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_offset_fetch_with_explicit_order() {
        let mut builder = users();
        builder.set_driver("sqlsrv");
        builder.set_order("name", "ASC").unwrap();
        builder.set_limit(5).set_offset(15);
        assert_eq!(
            builder.build_query(),
            "SELECT id, name FROM users ORDER BY name ASC OFFSET 15 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn test_offset_fetch_without_limit() {
        let mut builder = users();
        builder.set_dialect(Dialect::OffsetFetch).set_offset(5);
        assert_eq!(builder.build_query(), "SELECT id, name FROM users");
    }

    #[test]
    fn test_full_statement_order() {
        let mut builder = StatementBuilder::new("users");
        builder
            .set_fields(["users.id", "orders.total"])
            .set_where("users.active = :active")
            .set_parameter([("active", true)])
            .set_limit(3);
        builder.set_join("inner", "orders", "orders.user_id = users.id").unwrap();
        builder.set_order("orders.total", "desc").unwrap();

        assert_eq!(
            builder.to_sql(),
            "SELECT users.id, orders.total FROM users \
             INNER JOIN orders ON orders.user_id = users.id \
             WHERE users.active = :active \
             ORDER BY orders.total DESC LIMIT 3"
        );
        assert_eq!(builder.parameters().get("active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_reset_keeps_table_and_dialect() {
        let mut builder = users();
        builder.set_driver("sqlsrv").set_where("id = :id").set_parameter([("id", 1)]);
        builder.reset();

        assert!(builder.get_statement(FragmentKind::Fields).is_none());
        assert!(builder.where_clause().is_none());
        assert!(builder.parameters().is_empty());
        assert_eq!(builder.table(), "users");
        assert_eq!(builder.dialect(), Dialect::OffsetFetch);
        assert_eq!(builder.build_query(), "SELECT  FROM users");
    }

    #[test]
    fn test_generic_fragment_accessors() {
        let mut builder = users();
        builder.set_statement(Fragment::Join(Vec::new()));
        assert!(builder.get_statement(FragmentKind::Join).is_none());

        builder.set_statement(Fragment::Limit(7));
        assert_eq!(builder.get_statement(FragmentKind::Limit), Some(&Fragment::Limit(7)));
    }
}
