//! Error handling for StrokePlot
//!
//! Provides error types for every layer of the pipeline:
//! - Geometry errors (non-finite coordinates, degenerate polylines, bad parameters)
//! - File format errors (persisted polyline text files)
//! - Connection errors (serial transport)
//! - Transaction errors (device request/response protocol)
//! - Link state errors (misuse of the request/response alternation)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Geometry errors are normally recovered locally by dropping the
/// offending polyline. They surface as values only from constructors
/// and parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A coordinate was NaN or infinite
    #[error("Non-finite coordinate ({x}, {y})")]
    NonFinite {
        /// The X value.
        x: f64,
        /// The Y value.
        y: f64,
    },

    /// A polyline had fewer than two points
    #[error("Degenerate polyline with {points} point(s)")]
    Degenerate {
        /// Number of points the polyline had.
        points: usize,
    },

    /// A stage parameter was out of range
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Persisted polyline file error type
#[derive(Error, Debug)]
pub enum FileFormatError {
    /// A coordinate line could not be parsed
    #[error("Invalid coordinate at line {line_number}: {reason}")]
    InvalidCoordinate {
        /// 1-based line number.
        line_number: usize,
        /// The reason the line was rejected.
        reason: String,
    },

    /// A `#RRGGBB` color header could not be parsed
    #[error("Invalid color header at line {line_number}: {value}")]
    InvalidColor {
        /// 1-based line number.
        line_number: usize,
        /// The offending header text.
        value: String,
    },

    /// I/O error while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection error type
///
/// Transport level failures. These are fatal to the current session:
/// the link must be explicitly reopened.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    /// No port matched the request
    #[error("Port not found: {port}")]
    PortNotFound {
        /// The name of the port that was not found.
        port: String,
    },

    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Invalid connection parameters
    #[error("Invalid connection parameters: {reason}")]
    InvalidParameters {
        /// The reason the parameters are invalid.
        reason: String,
    },

    /// Connection lost mid-session
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// The reason the connection was lost.
        reason: String,
    },

    /// I/O error on the transport
    #[error("I/O error: {reason}")]
    IoError {
        /// The reason for the I/O error.
        reason: String,
    },
}

/// Transaction error type
///
/// Protocol failures of a single request/response exchange. These are
/// reported to the caller and never retried automatically, since the
/// device may already have executed part of the command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransactionError {
    /// No newline-terminated response arrived in time
    #[error("No response within {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The response line was not a valid response message
    #[error("Malformed response '{line}': {reason}")]
    MalformedResponse {
        /// The raw response line.
        line: String,
        /// The reason parsing failed.
        reason: String,
    },

    /// The device answered with `success: false`
    #[error("Device reported failure{}", diagnostic_suffix(.message))]
    Rejected {
        /// Diagnostic text from the device, if any.
        message: Option<String>,
    },

    /// The command could not be encoded
    #[error("Failed to encode command: {reason}")]
    Encode {
        /// The reason encoding failed.
        reason: String,
    },
}

fn diagnostic_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(": {}", m),
        _ => String::new(),
    }
}

/// Misuse of the request/response alternation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkStateError {
    /// Operation attempted in the wrong state
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        /// The attempted operation.
        operation: String,
        /// The current link state name.
        state: String,
    },
}

/// Main error type for StrokePlot
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// File format error
    #[error(transparent)]
    FileFormat(#[from] FileFormatError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Transaction error
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Link state error
    #[error(transparent)]
    LinkState(#[from] LinkStateError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a response timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transaction(TransactionError::Timeout { .. }))
    }

    /// Check if this is a protocol failure of a single transaction
    pub fn is_transaction_failure(&self) -> bool {
        matches!(self, Error::Transaction(_))
    }

    /// Check if this is a transport error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
