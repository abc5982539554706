/*!
 * Error types for the wortschatz application.
 *
 * This module contains custom error types for the different parts of the
 * acquisition and persistence pipeline, using the thiserror crate for
 * ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when looking a word up in the lexical source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a usable response (DNS, timeout, connection reset)
    #[error("request failed for '{word}': {message}")]
    Transport {
        /// Word that was being looked up
        word: String,
        /// Underlying transport error
        message: String,
    },

    /// The source answered with a non-success status code
    #[error("source responded with HTTP {status} for '{word}'")]
    Status {
        /// Word that was being looked up
        word: String,
        /// HTTP status code
        status: u16,
    },

    /// The source confirms it has no entry for the word
    #[error("'{word}' not found in dictionary")]
    NotFound {
        /// Word that was being looked up
        word: String,
    },

    /// The page was retrieved but its layout was not understood
    #[error("unexpected page layout for '{word}': {message}")]
    Parse {
        /// Word that was being looked up
        word: String,
        /// What could not be extracted
        message: String,
    },
}

impl FetchError {
    /// A hard miss means the word does not exist at the source; retrying is pointless
    pub fn is_hard_miss(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }

    /// The word the failed lookup was issued for
    pub fn word(&self) -> &str {
        match self {
            FetchError::Transport { word, .. }
            | FetchError::Status { word, .. }
            | FetchError::NotFound { word }
            | FetchError::Parse { word, .. } => word,
        }
    }

    /// Short, user-facing reason without the word itself
    pub fn reason(&self) -> String {
        match self {
            FetchError::Transport { message, .. } => format!("request failed: {}", message),
            FetchError::Status { status, .. } => format!("HTTP {}", status),
            FetchError::NotFound { .. } => "not found in dictionary".to_string(),
            FetchError::Parse { message, .. } => format!("unexpected page layout: {}", message),
        }
    }
}

/// Errors raised before any store mutation when a record is malformed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `type` or `german` missing, empty or a placeholder
    #[error("required field '{0}' is blank")]
    BlankRequiredField(&'static str),

    /// Score outside of {-1, 0, 1, 2, 3}
    #[error("invalid score: {0}")]
    InvalidScore(i64),

    /// Query mode name not recognised
    #[error("unknown query mode: {0}")]
    UnknownQueryMode(String),

    /// Sort column name not recognised
    #[error("unknown sort column: {0}")]
    UnknownSortColumn(String),
}

/// Errors from the record store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A store-level constraint (NOT NULL, CHECK) rejected the write
    #[error("integrity constraint violated: {0}")]
    Integrity(String),

    /// Any other database failure
    #[error("database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(error: anyhow::Error) -> Self {
        if let Some(rusqlite::Error::SqliteFailure(code, message)) =
            error.downcast_ref::<rusqlite::Error>()
        {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                return Self::Integrity(message.clone().unwrap_or_else(|| code.to_string()));
            }
        }
        Self::Database(format!("{:#}", error))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::from(anyhow::Error::new(error))
    }
}

/// Errors from the working-set manager: validation first, then storage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record was rejected before reaching the store
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The store rejected or failed the operation
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the batch translator itself (per-word failures are folded into the report)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// A previous batch has not delivered its result yet
    #[error("a batch is already running")]
    AlreadyRunning,

    /// The worker task died before delivering its result
    #[error("batch worker failed: {0}")]
    Worker(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(String),

    /// Error from the lexical source
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error from record validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Error from the record store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from the batch translator
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<RecordError> for AppError {
    fn from(error: RecordError) -> Self {
        match error {
            RecordError::Validation(e) => Self::Validation(e),
            RecordError::Store(e) => Self::Store(e),
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
