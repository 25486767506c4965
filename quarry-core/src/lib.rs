//! Quarry Core - a lightweight record-mapping layer over relational drivers
//!
//! Entities carry an ordered attribute bag and a little table configuration.
//! A [`Repository`] turns that configuration into SQL through the statement
//! builders and runs it through any [`Driver`], with named `:param`
//! placeholders throughout.

pub mod builder;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod naming;
pub mod params;
pub mod value;

// Re-export main types
pub use builder::{
    DeleteBuilder, Fragment, FragmentKind, InsertBuilder, IntoColumns, JoinType, OrderByClause,
    QueryBuilder, SortDirection, StatementBuilder, UpdateBuilder,
};
pub use dialect::Dialect;
pub use entity::{Attributes, Entity, Row};
pub use error::{Error, Result};
pub use executor::{Binding, Driver, PlaceholderStyle, Statement};
pub use lifecycle::{FetchMode, Fetched, Repository};
pub use naming::NamingResolver;
pub use params::ParameterRegistry;
pub use value::{BindType, FromValue, Value};

#[cfg(feature = "sqlite")]
pub use executor::sqlite::SqliteDriver;

/// Create a new SELECT builder for the given table
pub fn table(name: &str) -> StatementBuilder {
    StatementBuilder::new(name)
}
