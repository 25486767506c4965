//! Record lifecycle: fetch, save, create, update and delete for mapped entities

use crate::builder::{
    DeleteBuilder, InsertBuilder, IntoColumns, JoinType, QueryBuilder, SortDirection,
    StatementBuilder, UpdateBuilder,
};
use crate::{Driver, Entity, Error, NamingResolver, Result, Row, Value};
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Attribute stamped on update when an entity tracks timestamps
pub const UPDATED_AT: &str = "updated_at";

/// Format of the `updated_at` stamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shape of a fetch result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// First row, hydrated into an entity
    One,
    /// First row as a raw mapping
    OneRow,
    /// Every row, hydrated into entities
    All,
    /// Every row as raw mappings
    AllRows,
}

impl FetchMode {
    /// Map the `all` / `associative` flag pair onto a mode
    pub fn from_flags(all: bool, associative: bool) -> Self {
        match (all, associative) {
            (true, true) => FetchMode::AllRows,
            (true, false) => FetchMode::All,
            (false, true) => FetchMode::OneRow,
            (false, false) => FetchMode::One,
        }
    }
}

/// Outcome of a successful fetch; failures travel in the `Err` arm
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<E> {
    Entity(E),
    Row(Row),
    Entities(Vec<E>),
    Rows(Vec<Row>),
    NotFound,
}

impl<E> Fetched<E> {
    pub fn is_found(&self) -> bool {
        !matches!(self, Fetched::NotFound)
    }

    pub fn into_entity(self) -> Option<E> {
        match self {
            Fetched::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn into_entities(self) -> Option<Vec<E>> {
        match self {
            Fetched::Entities(entities) => Some(entities),
            _ => None,
        }
    }

    pub fn into_row(self) -> Option<Row> {
        match self {
            Fetched::Row(row) => Some(row),
            _ => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            Fetched::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

/// CRUD lifecycle for one entity type over one driver.
///
/// Owns a single [`StatementBuilder`] for its query session. The table name
/// is resolved once, at construction.
pub struct Repository<E, D> {
    driver: D,
    builder: StatementBuilder,
    naming: NamingResolver,
    table: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E, D> Repository<E, D>
where
    E: Entity,
    D: Driver,
{
    /// Create a repository, selecting the pagination dialect from the driver
    pub fn new(driver: D) -> Self {
        let naming = NamingResolver::new();
        let table = match E::TABLE {
            Some(table) => table.to_string(),
            None => naming.table_name(E::type_name()),
        };

        let mut builder = StatementBuilder::new(&table);
        builder.set_driver(driver.name());

        Self {
            driver,
            builder,
            naming,
            table,
            _entity: PhantomData,
        }
    }

    /// Entity table used by writes and as the default SELECT target
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn naming(&self) -> &NamingResolver {
        &self.naming
    }

    pub fn builder(&self) -> &StatementBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut StatementBuilder {
        &mut self.builder
    }

    /// Start a new query: clears previous fragments and parameters
    pub fn select<C: IntoColumns>(&mut self, fields: C, distinct: bool) -> &mut Self {
        self.builder.reset();
        self.builder.set_fields(fields).set_distinct(distinct);
        self
    }

    /// Retarget the SELECT at another table
    pub fn from(&mut self, table: &str) -> &mut Self {
        self.builder.set_table(table);
        self
    }

    /// Add a condition and its parameters. Conditions after the first are
    /// appended verbatim, so they carry their own `AND` / `OR`.
    pub fn where_<I, K, V>(&mut self, condition: &str, parameters: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.builder.append_where(condition).set_parameter(parameters);
        self
    }

    /// Add a condition that binds no parameters
    pub fn where_raw(&mut self, condition: &str) -> &mut Self {
        self.builder.append_where(condition);
        self
    }

    pub fn inner(&mut self, table: &str, condition: &str) -> &mut Self {
        self.builder.join(JoinType::Inner, table, condition);
        self
    }

    pub fn left(&mut self, table: &str, condition: &str) -> &mut Self {
        self.builder.join(JoinType::Left, table, condition);
        self
    }

    pub fn right(&mut self, table: &str, condition: &str) -> &mut Self {
        self.builder.join(JoinType::Right, table, condition);
        self
    }

    pub fn asc(&mut self, column: &str) -> &mut Self {
        self.builder.order_by(column, SortDirection::Asc);
        self
    }

    pub fn desc(&mut self, column: &str) -> &mut Self {
        self.builder.order_by(column, SortDirection::Desc);
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.builder.set_limit(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.builder.set_offset(offset);
        self
    }

    /// SQL text of the current query
    pub fn to_sql(&self) -> String {
        self.builder.build_query()
    }

    /// Run the current query
    pub async fn fetch(&self, mode: FetchMode) -> Result<Fetched<E>> {
        let rows = self
            .run_select()
            .await
            .map_err(Error::retrieval_failed)?;

        debug!(table = %self.builder.table(), rows = rows.len(), "fetched rows");

        if rows.is_empty() {
            return Ok(Fetched::NotFound);
        }

        let mut rows = rows.into_iter();
        let fetched = match mode {
            FetchMode::AllRows => Fetched::Rows(rows.collect()),
            FetchMode::All => Fetched::Entities(rows.map(E::from_attributes).collect()),
            FetchMode::OneRow => rows.next().map_or(Fetched::NotFound, Fetched::Row),
            FetchMode::One => rows
                .next()
                .map_or(Fetched::NotFound, |row| Fetched::Entity(E::from_attributes(row))),
        };
        Ok(fetched)
    }

    /// Run the current query with the `all` / `associative` flag pair
    pub async fn fetch_with(&self, all: bool, associative: bool) -> Result<Fetched<E>> {
        self.fetch(FetchMode::from_flags(all, associative)).await
    }

    /// First matching entity
    pub async fn first(&self) -> Result<Option<E>> {
        Ok(self.fetch(FetchMode::One).await?.into_entity())
    }

    /// Every matching entity; empty when nothing matched
    pub async fn all(&self) -> Result<Vec<E>> {
        Ok(self
            .fetch(FetchMode::All)
            .await?
            .into_entities()
            .unwrap_or_default())
    }

    /// First matching raw row
    pub async fn first_row(&self) -> Result<Option<Row>> {
        Ok(self.fetch(FetchMode::OneRow).await?.into_row())
    }

    /// Every matching raw row; empty when nothing matched
    pub async fn all_rows(&self) -> Result<Vec<Row>> {
        Ok(self
            .fetch(FetchMode::AllRows)
            .await?
            .into_rows()
            .unwrap_or_default())
    }

    /// Insert when the primary key is empty, update otherwise
    pub async fn save(&self, entity: &mut E) -> Result<bool> {
        if entity.attributes().value_of(E::PRIMARY_KEY).is_empty() {
            self.create(entity).await
        } else {
            self.update(entity).await
        }
    }

    /// Insert the entity's writable attributes in a transaction.
    ///
    /// Returns `Ok(false)` without touching the driver when a required
    /// attribute is missing.
    pub async fn create(&self, entity: &E) -> Result<bool> {
        if !Self::has_required(entity) {
            return Ok(false);
        }

        let insert = InsertBuilder::new(&self.table).values(Self::writable(entity));
        self.run_in_transaction(&insert, Error::create_failed).await?;
        Ok(true)
    }

    /// Update the entity's writable attributes by primary key in a transaction.
    ///
    /// Timestamped entities get `updated_at` stamped before validation.
    pub async fn update(&self, entity: &mut E) -> Result<bool> {
        if E::TIMESTAMPS {
            let now = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
            entity.attributes_mut().set(UPDATED_AT, now);
        }

        if !Self::has_required(entity) {
            return Ok(false);
        }

        // The writable set never contains the key, so capture it first.
        let key = entity.attributes().value_of(E::PRIMARY_KEY);
        let update = UpdateBuilder::new(&self.table)
            .set(Self::writable(entity))
            .where_key(E::PRIMARY_KEY, key);

        self.run_in_transaction(&update, Error::update_failed).await?;
        Ok(true)
    }

    /// Delete the row with the given primary key. Runs outside any transaction.
    pub async fn delete(&self, id: impl Into<Value>) -> Result<bool> {
        let delete = DeleteBuilder::new(&self.table, E::PRIMARY_KEY).id(id);
        self.run(&delete).await.map_err(Error::delete_failed)?;
        Ok(true)
    }

    // A required attribute fails only when it is empty, not numeric and
    // not the explicit empty string.
    fn has_required(entity: &E) -> bool {
        for column in E::REQUIRED {
            let value = entity.attributes().value_of(column);
            if value.is_empty() && !value.is_numeric() && !value.is_empty_string() {
                debug!(column = %column, "missing required column, skipping write");
                return false;
            }
        }
        true
    }

    fn writable(entity: &E) -> Vec<(String, Value)> {
        let mut excluded: Vec<&str> = E::SAFE.to_vec();
        excluded.push(E::PRIMARY_KEY);
        entity.attributes().without(&excluded)
    }

    async fn run_select(&self) -> Result<Vec<Row>> {
        let mut statement = self.driver.prepare(&self.builder.build_query()).await?;
        statement.bind_all(self.builder.parameters());

        debug!(sql = %statement.sql(), params = statement.bindings().len(), "fetching");
        self.driver.fetch_all(&statement).await
    }

    async fn run<Q: QueryBuilder>(&self, query: &Q) -> Result<u64> {
        let mut statement = self.driver.prepare(&query.to_sql()).await?;
        statement.bind_all(query.parameters());

        debug!(sql = %statement.sql(), params = statement.bindings().len(), "executing");
        self.driver.execute(&statement).await
    }

    async fn run_in_transaction<Q: QueryBuilder>(
        &self,
        query: &Q,
        wrap: fn(Error) -> Error,
    ) -> Result<u64> {
        self.driver.begin_transaction().await.map_err(wrap)?;

        match self.run(query).await {
            Ok(affected) => {
                self.driver.commit().await.map_err(wrap)?;
                Ok(affected)
            }
            Err(err) => {
                warn!(table = %self.table, error = %err, "statement failed, rolling back");
                if let Err(rollback_err) = self.driver.rollback().await {
                    warn!(table = %self.table, error = %rollback_err, "rollback failed");
                }
                Err(wrap(err))
            }
        }
    }
}
