//! Error types for rowkit.
//!
//! Failures fall into four families:
//!
//! - **Access**: the cursor, statement or connection itself reported an error.
//! - **Decode**: a raw column value could not be turned into the requested type.
//! - **Protocol**: a reader or iterator was driven against its contract.
//! - **Cleanup**: releasing a cursor or statement failed.
//!
//! Access and decode failures share the "database operation failed" message
//! but stay distinguishable through [`RowError::kind`].

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed error used as the cause of an [`AccessError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure reported by a row source collaborator.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AccessError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl AccessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the driver error that caused this failure.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Why a column could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeErrorKind {
    /// The column holds a different kind of value.
    #[error("expected {expected}, found {found} ('{data}')")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        data: String,
    },

    /// NULL where the target type has no NULL.
    #[error("unexpected NULL for {expected}")]
    UnexpectedNull { expected: &'static str },

    /// The value does not fit the target type.
    #[error("{data} is out of range for {expected}")]
    OutOfRange { expected: &'static str, data: String },

    /// Text that does not parse as the target domain value.
    #[error("cannot parse '{data}' as {expected}")]
    Unparsable { expected: &'static str, data: String },

    /// A coded column whose code matches no known value.
    #[error("no value for code: {code}")]
    UnknownCode { code: String },

    /// A user conversion rejected the decoded value.
    #[error("conversion failed: {0}")]
    Conversion(anyhow::Error),
}

/// A decode failure pinned to the column where it happened.
#[derive(Debug, Error)]
#[error("at column {column}: {kind}")]
pub struct DecodeError {
    column: usize,
    kind: DecodeErrorKind,
}

impl DecodeError {
    pub fn new(column: usize, kind: DecodeErrorKind) -> Self {
        Self { column, kind }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }
}

/// Misuse of a reader, iterator or decoder contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// The decoder returned the "no data" marker for an existing row.
    #[error("decoder produced a null record at row {row}; check the SQL or the decoder")]
    NullRecord { row: u64 },

    /// An element was requested after the sequence ended.
    #[error("no more records")]
    Exhausted,

    /// The reader was used after `close()`.
    #[error("reader already closed")]
    ReaderClosed,
}

/// A resource owned by a reader or query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Cursor,
    Statement,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Cursor => write!(f, "cursor"),
            Resource::Statement => write!(f, "statement"),
        }
    }
}

/// One failed release.
#[derive(Debug)]
pub struct CleanupFailure {
    pub resource: Resource,
    pub error: AccessError,
}

/// Every release that failed during a multi-resource close.
#[derive(Debug, Default)]
pub struct CleanupError {
    failures: Vec<CleanupFailure>,
}

impl CleanupError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one release attempt.
    pub fn record(&mut self, resource: Resource, result: Result<(), AccessError>) {
        if let Err(error) = result {
            self.failures.push(CleanupFailure { resource, error });
        }
    }

    pub fn into_result(self) -> Result<(), CleanupError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn failures(&self) -> &[CleanupFailure] {
        &self.failures
    }

    /// Whether releasing `resource` was among the failures.
    pub fn failed(&self, resource: Resource) -> bool {
        self.failures.iter().any(|f| f.resource == resource)
    }
}

impl fmt::Display for CleanupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "failed to release {}: {}", failure.resource, failure.error)?;
        }
        Ok(())
    }
}

impl StdError for CleanupError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.failures
            .first()
            .map(|f| &f.error as &(dyn StdError + 'static))
    }
}

/// Coarse classification of a [`RowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Access,
    Decode,
    Protocol,
    Cleanup,
}

/// The main error type for rowkit operations.
#[derive(Debug, Error)]
pub enum RowError {
    /// Cursor, statement or connection failure.
    #[error("database operation failed: {0}")]
    Access(#[from] AccessError),

    /// Column value could not be decoded.
    #[error("database operation failed: {0}")]
    Decode(#[from] DecodeError),

    /// Contract violation by the caller or a decoder.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// Releasing owned resources failed.
    #[error("{0}")]
    Cleanup(#[from] CleanupError),

    /// A failure whose cleanup also failed. Both stay reachable.
    #[error("{error} (cleanup also failed: {cleanup})")]
    Aborted {
        #[source]
        error: Box<RowError>,
        cleanup: CleanupError,
    },
}

impl RowError {
    pub fn decode(column: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode(DecodeError::new(column, kind))
    }

    /// Classify the error. An aborted operation reports its primary failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RowError::Access(_) => ErrorKind::Access,
            RowError::Decode(_) => ErrorKind::Decode,
            RowError::Protocol(_) => ErrorKind::Protocol,
            RowError::Cleanup(_) => ErrorKind::Cleanup,
            RowError::Aborted { error, .. } => error.kind(),
        }
    }

    /// The failure that started it all, skipping any cleanup wrapper.
    pub fn primary(&self) -> &RowError {
        match self {
            RowError::Aborted { error, .. } => error.primary(),
            other => other,
        }
    }

    /// Release failures carried by this error, if any.
    pub fn cleanup(&self) -> Option<&CleanupError> {
        match self {
            RowError::Cleanup(cleanup) | RowError::Aborted { cleanup, .. } => Some(cleanup),
            _ => None,
        }
    }

    /// Combine this failure with the outcome of the cleanup that followed it.
    pub(crate) fn with_cleanup(self, cleanup: Result<(), CleanupError>) -> Self {
        match cleanup {
            Ok(()) => self,
            Err(cleanup) => RowError::Aborted {
                error: Box::new(self),
                cleanup,
            },
        }
    }
}

/// Result type alias for rowkit operations.
pub type RowResult<T> = Result<T, RowError>;

/// Reader configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
