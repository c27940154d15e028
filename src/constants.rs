//! HANA protocol constants
//!
//! Message types, segment function codes, part kinds, parameter modes and
//! column type codes used by the SQL command network protocol.

use crate::error::Error;
use crate::row::Value;

// =============================================================================
// Sizes
// =============================================================================

/// Largest message the driver sends in one request
pub const MAX_MESSAGE_SIZE: usize = 131_072;

/// Message header size
pub const MESSAGE_HEADER_SIZE: usize = 32;

/// Segment header size
pub const SEGMENT_HEADER_SIZE: usize = 24;

/// Part header size
pub const PART_HEADER_SIZE: usize = 16;

/// Payload available to a single part in a maximum sized request
pub const MAX_PART_PAYLOAD: usize =
    MAX_MESSAGE_SIZE - MESSAGE_HEADER_SIZE - SEGMENT_HEADER_SIZE - PART_HEADER_SIZE;

/// Size of a LOB descriptor inside a parameters part (type, options, length, position)
pub const LOB_DESCRIPTOR_SIZE: usize = 10;

/// Per-chunk header inside a write-lob request (locator, options, offset, length)
pub const WRITE_LOB_CHUNK_HEADER_SIZE: usize = 21;

/// Block size used by `fetchall`
pub const FETCHALL_BLOCK_SIZE: usize = 1024;

/// Message text the server uses when it trips over a literal `%`
pub const PERCENT_SUBSTITUTION_SIGNATURE: &str = "incorrect syntax near \"%\"";

// =============================================================================
// Message Types
// =============================================================================

/// Request message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Execute SQL text without preparing it
    ExecuteDirect = 2,
    /// Prepare SQL text
    Prepare = 3,
    /// Execute a prepared statement
    Execute = 13,
    /// Send large object data
    WriteLob = 16,
    /// Read large object data
    ReadLob = 17,
    /// Fetch more rows from a result set
    FetchNext = 71,
}

// =============================================================================
// Function Codes
// =============================================================================

/// Function code reported by the server in each reply segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum FunctionCode {
    Nil = 0,
    Ddl = 1,
    Insert = 2,
    Update = 3,
    Delete = 4,
    Select = 5,
    SelectForUpdate = 6,
    Explain = 7,
    DbProcedureCall = 8,
    DbProcedureCallWithResult = 9,
    Fetch = 10,
    Commit = 11,
    Rollback = 12,
    Savepoint = 13,
    Connect = 14,
    WriteLob = 15,
    ReadLob = 16,
    Ping = 17,
    Disconnect = 18,
    CloseCursor = 19,
    FindLob = 20,
    AbapStream = 21,
    XaStart = 22,
    XaJoin = 23,
}

impl FunctionCode {
    /// Queries producing result sets
    pub fn is_query(self) -> bool {
        matches!(self, FunctionCode::Select | FunctionCode::SelectForUpdate)
    }

    /// INSERT, UPDATE and DELETE
    pub fn is_dml(self) -> bool {
        matches!(
            self,
            FunctionCode::Insert | FunctionCode::Update | FunctionCode::Delete
        )
    }

    /// Stored procedure calls, with or without result sets
    pub fn is_procedure_call(self) -> bool {
        matches!(
            self,
            FunctionCode::DbProcedureCall | FunctionCode::DbProcedureCallWithResult
        )
    }
}

impl TryFrom<u16> for FunctionCode {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self, Error> {
        let code = match value {
            0 => FunctionCode::Nil,
            1 => FunctionCode::Ddl,
            2 => FunctionCode::Insert,
            3 => FunctionCode::Update,
            4 => FunctionCode::Delete,
            5 => FunctionCode::Select,
            6 => FunctionCode::SelectForUpdate,
            7 => FunctionCode::Explain,
            8 => FunctionCode::DbProcedureCall,
            9 => FunctionCode::DbProcedureCallWithResult,
            10 => FunctionCode::Fetch,
            11 => FunctionCode::Commit,
            12 => FunctionCode::Rollback,
            13 => FunctionCode::Savepoint,
            14 => FunctionCode::Connect,
            15 => FunctionCode::WriteLob,
            16 => FunctionCode::ReadLob,
            17 => FunctionCode::Ping,
            18 => FunctionCode::Disconnect,
            19 => FunctionCode::CloseCursor,
            20 => FunctionCode::FindLob,
            21 => FunctionCode::AbapStream,
            22 => FunctionCode::XaStart,
            23 => FunctionCode::XaJoin,
            _ => return Err(Error::InvalidFunctionCode(value)),
        };
        Ok(code)
    }
}

// =============================================================================
// Part Kinds
// =============================================================================

/// Kind tag of a request or reply part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum PartKind {
    Command = 3,
    ResultSet = 5,
    Error = 6,
    StatementId = 10,
    TransactionId = 11,
    RowsAffected = 12,
    ResultSetId = 13,
    TopologyInformation = 15,
    TableLocation = 16,
    ReadLobRequest = 17,
    ReadLobReply = 18,
    CommandInfo = 27,
    WriteLobRequest = 28,
    ClientContext = 29,
    WriteLobReply = 30,
    Parameters = 32,
    Authentication = 33,
    SessionContext = 34,
    StatementContext = 39,
    PartitionInformation = 40,
    OutputParameters = 41,
    ConnectOptions = 42,
    CommitOptions = 43,
    FetchOptions = 44,
    FetchSize = 45,
    ParameterMetadata = 47,
    ResultSetMetadata = 48,
    TransactionFlags = 64,
}

impl TryFrom<u8> for PartKind {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        let kind = match value {
            3 => PartKind::Command,
            5 => PartKind::ResultSet,
            6 => PartKind::Error,
            10 => PartKind::StatementId,
            11 => PartKind::TransactionId,
            12 => PartKind::RowsAffected,
            13 => PartKind::ResultSetId,
            15 => PartKind::TopologyInformation,
            16 => PartKind::TableLocation,
            17 => PartKind::ReadLobRequest,
            18 => PartKind::ReadLobReply,
            27 => PartKind::CommandInfo,
            28 => PartKind::WriteLobRequest,
            29 => PartKind::ClientContext,
            30 => PartKind::WriteLobReply,
            32 => PartKind::Parameters,
            33 => PartKind::Authentication,
            34 => PartKind::SessionContext,
            39 => PartKind::StatementContext,
            40 => PartKind::PartitionInformation,
            41 => PartKind::OutputParameters,
            42 => PartKind::ConnectOptions,
            43 => PartKind::CommitOptions,
            44 => PartKind::FetchOptions,
            45 => PartKind::FetchSize,
            47 => PartKind::ParameterMetadata,
            48 => PartKind::ResultSetMetadata,
            64 => PartKind::TransactionFlags,
            _ => return Err(Error::InvalidPartKind(value)),
        };
        Ok(kind)
    }
}

/// Part attribute bits
#[allow(missing_docs)]
pub mod part_attributes {
    pub const LAST_PACKET: u8 = 0x01;
    pub const NEXT_PACKET: u8 = 0x02;
    pub const FIRST_PACKET: u8 = 0x04;
    pub const ROW_NOT_FOUND: u8 = 0x08;
    pub const RESULTSET_CLOSED: u8 = 0x10;

    /// Whether the server closed the result set after this part
    pub fn is_resultset_closed(attributes: u8) -> bool {
        attributes & RESULTSET_CLOSED != 0
    }
}

/// Column option bits in result set metadata
#[allow(missing_docs)]
pub mod column_options {
    pub const MANDATORY: u8 = 0b01;
    pub const OPTIONAL: u8 = 0b10;
}

/// Option bits of a write-lob chunk
#[allow(missing_docs)]
pub mod lob_options {
    pub const NULL_INDICATOR: u8 = 0x01;
    pub const DATA_INCLUDED: u8 = 0x02;
    pub const LAST_DATA: u8 = 0x04;
}

// =============================================================================
// Parameter Modes
// =============================================================================

/// Direction of a prepared statement parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ParameterMode {
    /// IN parameter
    Input = 1,
    /// IN OUT parameter
    InOut = 2,
    /// OUT parameter
    Output = 4,
}

impl ParameterMode {
    /// IN and IN OUT parameters take a value from the caller
    pub fn is_input(self) -> bool {
        matches!(self, ParameterMode::Input | ParameterMode::InOut)
    }

    /// OUT and IN OUT parameters come back in the output parameter row
    pub fn is_output(self) -> bool {
        matches!(self, ParameterMode::Output | ParameterMode::InOut)
    }
}

impl TryFrom<u8> for ParameterMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            1 => Ok(ParameterMode::Input),
            2 => Ok(ParameterMode::InOut),
            4 => Ok(ParameterMode::Output),
            _ => Err(Error::interface(format!("invalid parameter mode: {}", value))),
        }
    }
}

// =============================================================================
// Type Codes
// =============================================================================

/// Column and parameter type codes with a known decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum TypeCode {
    Null = 0,
    TinyInt = 1,
    SmallInt = 2,
    Int = 3,
    BigInt = 4,
    Decimal = 5,
    Real = 6,
    Double = 7,
    Char = 8,
    Varchar = 9,
    NChar = 10,
    NVarchar = 11,
    Binary = 12,
    VarBinary = 13,
    Date = 14,
    Time = 15,
    Timestamp = 16,
    Clob = 25,
    NClob = 26,
    Blob = 27,
    Boolean = 28,
    String = 29,
    NString = 30,
    BString = 33,
    SmallDecimal = 47,
    Text = 51,
    ShortText = 52,
    AlphaNum = 55,
    LongDate = 61,
    SecondDate = 62,
    DayDate = 63,
    SecondTime = 64,
}

impl TypeCode {
    /// CLOB, NCLOB, BLOB and TEXT are sent through LOB descriptors
    pub fn is_lob(self) -> bool {
        matches!(
            self,
            TypeCode::Clob | TypeCode::NClob | TypeCode::Blob | TypeCode::Text
        )
    }

    /// Whether a decoded value can belong to a column of this type
    pub fn accepts(self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Boolean(_) => matches!(self, TypeCode::Boolean | TypeCode::TinyInt),
            Value::Integer(_) => matches!(
                self,
                TypeCode::TinyInt
                    | TypeCode::SmallInt
                    | TypeCode::Int
                    | TypeCode::BigInt
                    | TypeCode::Decimal
                    | TypeCode::SmallDecimal
                    | TypeCode::Real
                    | TypeCode::Double
            ),
            Value::Double(_) => matches!(self, TypeCode::Real | TypeCode::Double),
            Value::Decimal(_) => matches!(self, TypeCode::Decimal | TypeCode::SmallDecimal),
            Value::String(_) => matches!(
                self,
                TypeCode::Char
                    | TypeCode::Varchar
                    | TypeCode::NChar
                    | TypeCode::NVarchar
                    | TypeCode::String
                    | TypeCode::NString
                    | TypeCode::ShortText
                    | TypeCode::AlphaNum
                    | TypeCode::Clob
                    | TypeCode::NClob
                    | TypeCode::Text
            ),
            Value::Bytes(_) => matches!(
                self,
                TypeCode::Binary | TypeCode::VarBinary | TypeCode::BString | TypeCode::Blob
            ),
            Value::Date(_) => matches!(self, TypeCode::Date | TypeCode::DayDate),
            Value::Time(_) => matches!(self, TypeCode::Time | TypeCode::SecondTime),
            Value::Timestamp(_) => matches!(
                self,
                TypeCode::Timestamp | TypeCode::LongDate | TypeCode::SecondDate
            ),
        }
    }
}

impl TryFrom<u8> for TypeCode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        let code = match value {
            0 => TypeCode::Null,
            1 => TypeCode::TinyInt,
            2 => TypeCode::SmallInt,
            3 => TypeCode::Int,
            4 => TypeCode::BigInt,
            5 => TypeCode::Decimal,
            6 => TypeCode::Real,
            7 => TypeCode::Double,
            8 => TypeCode::Char,
            9 => TypeCode::Varchar,
            10 => TypeCode::NChar,
            11 => TypeCode::NVarchar,
            12 => TypeCode::Binary,
            13 => TypeCode::VarBinary,
            14 => TypeCode::Date,
            15 => TypeCode::Time,
            16 => TypeCode::Timestamp,
            25 => TypeCode::Clob,
            26 => TypeCode::NClob,
            27 => TypeCode::Blob,
            28 => TypeCode::Boolean,
            29 => TypeCode::String,
            30 => TypeCode::NString,
            33 => TypeCode::BString,
            47 => TypeCode::SmallDecimal,
            51 => TypeCode::Text,
            52 => TypeCode::ShortText,
            55 => TypeCode::AlphaNum,
            61 => TypeCode::LongDate,
            62 => TypeCode::SecondDate,
            63 => TypeCode::DayDate,
            64 => TypeCode::SecondTime,
            _ => return Err(Error::UnknownTypeCode(value)),
        };
        Ok(code)
    }
}
