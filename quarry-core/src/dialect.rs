//! Pagination dialects

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Pagination style used when rendering LIMIT/OFFSET
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `LIMIT n [OFFSET m]`
    #[default]
    Generic,
    /// `ORDER BY ... OFFSET m ROWS FETCH NEXT n ROWS ONLY`
    OffsetFetch,
}

impl Dialect {
    /// Driver identifier that selects the OFFSET/FETCH dialect
    pub const OFFSET_FETCH_DRIVER: &'static str = "sqlsrv";

    /// Select the dialect for a driver identifier. Every identifier other
    /// than [`Dialect::OFFSET_FETCH_DRIVER`] gets the generic dialect.
    pub fn from_driver_name(name: &str) -> Self {
        if name == Self::OFFSET_FETCH_DRIVER {
            Dialect::OffsetFetch
        } else {
            Dialect::Generic
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Generic => write!(f, "generic"),
            Dialect::OffsetFetch => write!(f, "offset-fetch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_name_selection() {
        assert_eq!(Dialect::from_driver_name("sqlsrv"), Dialect::OffsetFetch);
        assert_eq!(Dialect::from_driver_name("sqlite"), Dialect::Generic);
        assert_eq!(Dialect::from_driver_name("pgsql"), Dialect::Generic);
        assert_eq!(Dialect::from_driver_name(""), Dialect::Generic);
    }

    #[test]
    fn test_serde_names() {
        let dialect: Dialect = serde_json::from_str("\"offsetfetch\"").unwrap();
        assert_eq!(dialect, Dialect::OffsetFetch);
        assert_eq!(serde_json::to_string(&Dialect::Generic).unwrap(), "\"generic\"");
    }
}
