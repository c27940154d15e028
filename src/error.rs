//! Error types for the HANA driver
//!
//! Errors fall into three classes that callers can test for:
//!
//! - **usage** errors: the caller misused the API (wrong parameter shape,
//!   cursor used after close, fetch before execute). Nothing was sent.
//! - **interface** errors: the reply violated a protocol invariant the
//!   driver relies on, or the transport failed. Not recoverable locally.
//! - **database** errors: the server rejected the statement.

use std::io;
use thiserror::Error;

use crate::constants::{FunctionCode, PartKind};
use crate::types::LocatorId;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the HANA driver
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    // =========================================================================
    // Usage Errors
    // =========================================================================
    /// General API misuse
    #[error("programming error: {0}")]
    Usage(String),

    /// Cursor was closed, or its connection was
    #[error("cursor closed")]
    CursorClosed,

    /// Positional parameter count does not match the statement
    #[error("prepared statement parameters expected {expected} supplied {supplied}")]
    ParameterCount { expected: usize, supplied: usize },

    /// Keyed parameters are missing values for some statement parameters
    #[error("prepared statement parameters misses values for: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    /// Parameters were supplied in a container the binder cannot use
    #[error("prepared statement parameters supplied as {0}, shall be a sequence or a map")]
    UnsupportedParameterShape(&'static str),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Interface Errors
    // =========================================================================
    /// Function code number not known to the driver
    #[error("invalid function code: {0}")]
    InvalidFunctionCode(u16),

    /// Function code known, but no handler exists for it
    #[error("invalid or unsupported function code received: {0:?}")]
    UnsupportedFunctionCode(FunctionCode),

    /// Part kind number not known to the driver
    #[error("invalid part kind: {0}")]
    InvalidPartKind(u8),

    /// Part kind not allowed in the segment it arrived in
    #[error("{context}, unexpected part kind {kind:?}")]
    UnexpectedPartKind { context: &'static str, kind: PartKind },

    /// Column type code without a known decoder
    #[error("unknown column data type: {0}")]
    UnknownTypeCode(u8),

    /// Decoded data does not fit the metadata it was decoded against
    #[error("data conversion error: {0}")]
    DataConversion(String),

    /// General protocol invariant violation
    #[error("interface error: {0}")]
    Interface(String),

    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Connection closed
    #[error("connection closed")]
    ConnectionClosed,

    // =========================================================================
    // Database Errors
    // =========================================================================
    /// Error reported by the server
    #[error("SQL error {code}: {message}")]
    Database { code: i32, message: String },

    /// A large object continuation write failed part way through
    #[error("writing large object data for locator {locator} failed: {source}")]
    LobWrite {
        locator: LocatorId,
        #[source]
        source: Box<Error>,
    },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (should not happen)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Error::Usage(message.into())
    }

    /// Create an interface error
    pub fn interface(message: impl Into<String>) -> Self {
        Error::Interface(message.into())
    }

    /// Create a database error without a server error code
    pub fn database(message: impl Into<String>) -> Self {
        Error::Database {
            code: 0,
            message: message.into(),
        }
    }

    /// Check if this error was caused by API misuse
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::Usage(_)
                | Error::CursorClosed
                | Error::ParameterCount { .. }
                | Error::MissingParameters(_)
                | Error::UnsupportedParameterShape(_)
                | Error::InvalidConfig(_)
        )
    }

    /// Check if this error is a protocol or transport failure
    pub fn is_interface_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidFunctionCode(_)
                | Error::UnsupportedFunctionCode(_)
                | Error::InvalidPartKind(_)
                | Error::UnexpectedPartKind { .. }
                | Error::UnknownTypeCode(_)
                | Error::DataConversion(_)
                | Error::Interface(_)
                | Error::Io(_)
                | Error::ConnectionClosed
                | Error::Internal(_)
        )
    }

    /// Check if this error was reported by (or left state on) the server
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Database { .. } | Error::LobWrite { .. })
    }

    /// The server's message text, for database errors
    pub fn database_message(&self) -> Option<&str> {
        match self {
            Error::Database { message, .. } => Some(message),
            _ => None,
        }
    }
}
