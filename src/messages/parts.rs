//! Decoded reply parts

use bytes::Bytes;

use crate::constants::{part_attributes, PartKind, TypeCode};
use crate::error::{Error, Result};
use crate::row::{Row, Value};
use crate::statement::{ParameterMetadata, ResultSetMetadata};
use crate::types::{LocatorId, ResultSetId, StatementId};

/// A decoded part of a reply segment
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Id of a freshly prepared statement
    StatementId(StatementId),
    /// Parameter metadata of a freshly prepared statement
    ParameterMetadata(Vec<ParameterMetadata>),
    /// Column metadata of a result set
    ResultSetMetadata(ResultSetMetadata),
    /// Id of a result set
    ResultSetId(ResultSetId),
    /// Row data of the last announced result set
    ResultSet(ResultSetPart),
    /// Affected row counts, one per executed parameter row
    RowsAffected(Vec<i64>),
    /// Output parameter values of a procedure call
    OutputParameters(OutputParametersPart),
    /// Locators for LOB values that were not fully sent
    WriteLobReply(Vec<LocatorId>),
    /// Transaction state changes
    TransactionFlags(TransactionFlags),
    /// Statement context, kept opaque
    StatementContext(Bytes),
    /// Errors and warnings reported by the server
    Error(Vec<ServerError>),
    /// Any other part, kept opaque
    Opaque {
        /// Kind tag
        kind: PartKind,
        /// Undecoded payload
        payload: Bytes,
    },
}

impl Part {
    /// Kind tag of the part
    pub fn kind(&self) -> PartKind {
        match self {
            Part::StatementId(_) => PartKind::StatementId,
            Part::ParameterMetadata(_) => PartKind::ParameterMetadata,
            Part::ResultSetMetadata(_) => PartKind::ResultSetMetadata,
            Part::ResultSetId(_) => PartKind::ResultSetId,
            Part::ResultSet(_) => PartKind::ResultSet,
            Part::RowsAffected(_) => PartKind::RowsAffected,
            Part::OutputParameters(_) => PartKind::OutputParameters,
            Part::WriteLobReply(_) => PartKind::WriteLobReply,
            Part::TransactionFlags(_) => PartKind::TransactionFlags,
            Part::StatementContext(_) => PartKind::StatementContext,
            Part::Error(_) => PartKind::Error,
            Part::Opaque { kind, .. } => *kind,
        }
    }
}

/// Row data of one result set part
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSetPart {
    /// Part attribute bits
    pub attributes: u8,
    /// Rows as decoded by the transport
    pub rows: Vec<Vec<Value>>,
}

impl ResultSetPart {
    /// Create a result set part
    pub fn new(attributes: u8, rows: Vec<Vec<Value>>) -> Self {
        Self { attributes, rows }
    }

    /// Whether the server closed the result set after this part
    pub fn is_closed(&self) -> bool {
        part_attributes::is_resultset_closed(self.attributes)
    }

    /// Check each row against the column codecs and turn it into a [`Row`]
    pub fn unpack_rows(self, codecs: &[TypeCode]) -> Result<Vec<Row>> {
        self.rows
            .into_iter()
            .map(|values| check_row(values, codecs.iter().copied()))
            .collect()
    }
}

/// Output parameter row of a procedure call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputParametersPart {
    /// Rows as decoded by the transport; the server sends one
    pub rows: Vec<Vec<Value>>,
}

impl OutputParametersPart {
    /// Create an output parameters part
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        Self { rows }
    }

    /// Check the rows against the output-capable parameters of the statement.
    ///
    /// Without statement metadata (a directly executed `CALL`) the values are
    /// taken as sent.
    pub fn unpack_rows(self, parameters: Option<&[ParameterMetadata]>) -> Result<Vec<Row>> {
        match parameters {
            Some(parameters) => {
                let codecs: Vec<TypeCode> = parameters
                    .iter()
                    .filter(|p| p.mode.is_output())
                    .map(|p| p.type_code)
                    .collect();
                self.rows
                    .into_iter()
                    .map(|values| check_row(values, codecs.iter().copied()))
                    .collect()
            }
            None => Ok(self.rows.into_iter().map(Row::new).collect()),
        }
    }
}

fn check_row(values: Vec<Value>, codecs: impl ExactSizeIterator<Item = TypeCode>) -> Result<Row> {
    if values.len() != codecs.len() {
        return Err(Error::DataConversion(format!(
            "row has {} values for {} columns",
            values.len(),
            codecs.len()
        )));
    }
    for (index, (value, codec)) in values.iter().zip(codecs).enumerate() {
        if !codec.accepts(value) {
            return Err(Error::DataConversion(format!(
                "column {} of type {:?} cannot hold a {} value",
                index,
                codec,
                value.type_name()
            )));
        }
    }
    Ok(Row::new(values))
}

/// Severity of a server error entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ErrorLevel {
    Warning = 0,
    Error = 1,
    Fatal = 2,
}

/// One entry of an error part
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError {
    /// Server error code
    pub code: i32,
    /// Position in the SQL text
    pub position: i32,
    /// Severity
    pub level: ErrorLevel,
    /// SQLSTATE
    pub sql_state: String,
    /// Message text
    pub message: String,
}

impl ServerError {
    /// Create an error-level entry
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            position: 0,
            level: ErrorLevel::Error,
            sql_state: "HY000".to_string(),
            message: message.into(),
        }
    }

    /// Create a warning-level entry
    pub fn warning(code: i32, message: impl Into<String>) -> Self {
        Self {
            level: ErrorLevel::Warning,
            ..Self::new(code, message)
        }
    }

    /// Check if the entry is only a warning
    pub fn is_warning(&self) -> bool {
        self.level == ErrorLevel::Warning
    }
}

impl From<ServerError> for Error {
    fn from(err: ServerError) -> Self {
        Error::Database {
            code: err.code,
            message: err.message,
        }
    }
}

/// Transaction state changes reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionFlags {
    /// The transaction was committed
    pub committed: bool,
    /// The transaction was rolled back
    pub rolled_back: bool,
    /// A write transaction was started
    pub write_transaction_started: bool,
    /// The session is being closed by the server
    pub session_closing: bool,
}
