//! Prepared statements and their metadata
//!
//! This module provides the parameter and column metadata returned by the
//! server when a statement is prepared or a result set is opened, and the
//! column descriptions derived from it.

use crate::constants::{column_options, ParameterMode, TypeCode};
use crate::error::Result;
use crate::types::StatementId;

/// Metadata for one prepared statement parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMetadata {
    /// Parameter name as reported by the server (e.g. `"1"` or `"A"`)
    pub id: String,
    /// Parameter direction
    pub mode: ParameterMode,
    /// Declared type
    pub type_code: TypeCode,
    /// Declared length
    pub length: i32,
    /// Declared fraction (scale for decimals)
    pub fraction: i16,
    /// Raw option bits
    pub options: u8,
}

impl ParameterMetadata {
    /// Create metadata for a parameter with default length and options
    pub fn new(id: impl Into<String>, mode: ParameterMode, type_code: TypeCode) -> Self {
        Self {
            id: id.into(),
            mode,
            type_code,
            length: 0,
            fraction: 0,
            options: 0,
        }
    }

    /// Set the declared length
    pub fn with_length(mut self, length: i32) -> Self {
        self.length = length;
        self
    }

    /// Set the declared fraction
    pub fn with_fraction(mut self, fraction: i16) -> Self {
        self.fraction = fraction;
        self
    }
}

/// Metadata for one result set column, as found in a result set metadata part
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    /// Raw option bits (nullable is `0b10`)
    pub options: u8,
    /// Raw type code, validated when the column is described
    pub type_code: u8,
    /// Declared fraction
    pub fraction: i16,
    /// Declared length
    pub length: i32,
    /// Table name
    pub table_name: Option<String>,
    /// Schema name
    pub schema_name: Option<String>,
    /// Column name
    pub column_name: Option<String>,
    /// Column display name (label)
    pub display_name: String,
}

impl ColumnMetadata {
    /// Create metadata for a column with the given label and type
    pub fn new(display_name: impl Into<String>, type_code: u8) -> Self {
        Self {
            options: column_options::OPTIONAL,
            type_code,
            fraction: 0,
            length: 0,
            table_name: None,
            schema_name: None,
            column_name: None,
            display_name: display_name.into(),
        }
    }

    /// Set the declared length
    pub fn with_length(mut self, length: i32) -> Self {
        self.length = length;
        self
    }

    /// Set the declared fraction
    pub fn with_fraction(mut self, fraction: i16) -> Self {
        self.fraction = fraction;
        self
    }

    /// Set the option bits
    pub fn with_options(mut self, options: u8) -> Self {
        self.options = options;
        self
    }

    /// Check if the column accepts NULL
    pub fn is_nullable(&self) -> bool {
        self.options & column_options::OPTIONAL != 0
    }
}

/// Column metadata of one result set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSetMetadata {
    /// Columns in select-list order
    pub columns: Vec<ColumnMetadata>,
}

impl ResultSetMetadata {
    /// Create result set metadata from columns
    pub fn new(columns: Vec<ColumnMetadata>) -> Self {
        Self { columns }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column descriptions, failing on the first unknown type code
    pub fn describe(&self) -> Result<Vec<ColumnDescription>> {
        self.columns.iter().map(ColumnDescription::from_metadata).collect()
    }

    /// Type codecs used to decode row parts of this result set
    pub fn codecs(&self) -> Result<Vec<TypeCode>> {
        self.columns
            .iter()
            .map(|column| TypeCode::try_from(column.type_code))
            .collect()
    }
}

/// DB-API style description of a result set column.
///
/// Display size and scale are never reported by the server and stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescription {
    /// Column label
    pub name: String,
    /// Column type
    pub type_code: TypeCode,
    /// Display size
    pub display_size: Option<i32>,
    /// Declared length
    pub internal_size: i32,
    /// Declared fraction
    pub precision: i16,
    /// Scale
    pub scale: Option<i16>,
    /// Whether the column accepts NULL
    pub null_ok: bool,
}

impl ColumnDescription {
    /// Describe a column; an unknown type code is an interface error
    pub fn from_metadata(column: &ColumnMetadata) -> Result<Self> {
        Ok(Self {
            name: column.display_name.clone(),
            type_code: TypeCode::try_from(column.type_code)?,
            display_size: None,
            internal_size: column.length,
            precision: column.fraction,
            scale: None,
            null_ok: column.is_nullable(),
        })
    }
}

/// A statement prepared on the server.
///
/// Created by `Cursor::prepare` and owned by the connection's statement
/// cache. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedStatement {
    id: StatementId,
    sql: String,
    parameters: Vec<ParameterMetadata>,
    result_metadata: Option<ResultSetMetadata>,
}

impl PreparedStatement {
    /// Create a prepared statement from a prepare reply
    pub fn new(
        id: StatementId,
        sql: impl Into<String>,
        parameters: Vec<ParameterMetadata>,
        result_metadata: Option<ResultSetMetadata>,
    ) -> Self {
        Self {
            id,
            sql: sql.into(),
            parameters,
            result_metadata,
        }
    }

    /// Server-assigned statement id
    pub fn id(&self) -> StatementId {
        self.id
    }

    /// SQL text the statement was prepared from
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// All parameter metadata, in statement order
    pub fn parameters(&self) -> &[ParameterMetadata] {
        &self.parameters
    }

    /// Parameters that take a value from the caller (IN and IN OUT)
    pub fn input_parameters(&self) -> impl Iterator<Item = &ParameterMetadata> {
        self.parameters.iter().filter(|p| p.mode.is_input())
    }

    /// Parameters returned in the output parameter row (OUT and IN OUT)
    pub fn output_parameters(&self) -> impl Iterator<Item = &ParameterMetadata> {
        self.parameters.iter().filter(|p| p.mode.is_output())
    }

    /// Result set metadata, for queries
    pub fn result_metadata(&self) -> Option<&ResultSetMetadata> {
        self.result_metadata.as_ref()
    }
}
