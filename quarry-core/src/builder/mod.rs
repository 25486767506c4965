//! Statement builder module

pub mod common;
pub mod fragment;
pub mod select;
pub mod insert;
pub mod update;
pub mod delete;

// Re-export types from submodules
pub use common::{IntoColumns, JoinType, OrderByClause, QueryBuilder, SortDirection};
pub use fragment::{Fragment, FragmentKind};
pub use select::StatementBuilder;
pub use insert::InsertBuilder;
pub use update::UpdateBuilder;
pub use delete::DeleteBuilder;
