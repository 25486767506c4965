//! Error types for Quarry

use thiserror::Error;

/// The main error type for Quarry operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid builder argument, raised before any SQL text is built
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A fetch could not be prepared or executed
    #[error("Failed to retrieve data from the database.")]
    RetrievalFailed {
        #[source]
        source: Box<Error>,
    },

    /// An INSERT could not be prepared or executed
    #[error("Failed to create record.")]
    CreateFailed {
        #[source]
        source: Box<Error>,
    },

    /// An UPDATE could not be prepared or executed
    #[error("Failed to update record.")]
    UpdateFailed {
        #[source]
        source: Box<Error>,
    },

    /// A DELETE could not be prepared or executed
    #[error("Failed to delete data from the database.")]
    DeleteFailed {
        #[source]
        source: Box<Error>,
    },

    /// Database connection or execution error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure reported by a driver that is not backed by sqlx
    #[error("Driver error: {message}")]
    Driver { message: String },
}

/// Convenience Result type for Quarry operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new driver error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    pub(crate) fn retrieval_failed(source: Error) -> Self {
        Self::RetrievalFailed {
            source: Box::new(source),
        }
    }

    pub(crate) fn create_failed(source: Error) -> Self {
        Self::CreateFailed {
            source: Box::new(source),
        }
    }

    pub(crate) fn update_failed(source: Error) -> Self {
        Self::UpdateFailed {
            source: Box::new(source),
        }
    }

    pub(crate) fn delete_failed(source: Error) -> Self {
        Self::DeleteFailed {
            source: Box::new(source),
        }
    }

    /// Severity marker carried by the error, in HTTP status terms.
    ///
    /// Argument errors are caller faults (400); everything raised at the
    /// driver boundary is a server-side fault (500).
    pub fn status(&self) -> u16 {
        match self {
            Error::InvalidArgument { .. } => 400,
            _ => 500,
        }
    }
}
