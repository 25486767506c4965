//! Named statement fragments accumulated before text assembly

use super::common::OrderByClause;

/// Name of a statement fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Fields,
    Distinct,
    Join,
    Where,
    Order,
    Limit,
    Offset,
}

/// A named piece of a SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Fields(Vec<String>),
    Distinct(bool),
    /// Pre-rendered join clauses in call order
    Join(Vec<String>),
    Where(String),
    Order(OrderByClause),
    Limit(u64),
    Offset(u64),
}

impl Fragment {
    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::Fields(_) => FragmentKind::Fields,
            Fragment::Distinct(_) => FragmentKind::Distinct,
            Fragment::Join(_) => FragmentKind::Join,
            Fragment::Where(_) => FragmentKind::Where,
            Fragment::Order(_) => FragmentKind::Order,
            Fragment::Limit(_) => FragmentKind::Limit,
            Fragment::Offset(_) => FragmentKind::Offset,
        }
    }

    /// Falsy fragments read back as unset: empty lists and strings,
    /// `false`, and zero limits or offsets.
    pub fn is_set(&self) -> bool {
        match self {
            Fragment::Fields(fields) => !fields.is_empty(),
            Fragment::Distinct(distinct) => *distinct,
            Fragment::Join(joins) => !joins.is_empty(),
            Fragment::Where(condition) => !condition.is_empty(),
            Fragment::Order(_) => true,
            Fragment::Limit(n) | Fragment::Offset(n) => *n != 0,
        }
    }
}
