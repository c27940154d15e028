//! Parameter binding for prepared statements
//!
//! This module matches caller-supplied parameter values against the input
//! parameters of a prepared statement, one row at a time.
//!
//! # Example
//!
//! ```rust,ignore
//! use hana_rs::{Params, Value};
//!
//! let statement = cursor.prepare("INSERT INTO T (A, B) VALUES (?, ?)")?;
//! let rows = vec![
//!     Params::from(vec![Value::Integer(1), Value::from("one")]),
//!     Params::from(vec![Value::Integer(2), Value::from("two")]),
//! ];
//! cursor.execute_prepared(&statement, rows)?;
//! println!("rows affected: {}", cursor.rowcount());
//! ```

use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::TypeCode;
use crate::error::{Error, Result};
use crate::row::Value;
use crate::statement::{ParameterMetadata, PreparedStatement};

/// Parameter values for one execution of a statement
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// Values matched by position against the input parameters
    Positional(Vec<Value>),
    /// Values matched by parameter id
    Keyed(IndexMap<String, Value>),
    /// A single bare value; never accepted by the binder
    Scalar(Value),
}

impl Params {
    /// Empty positional parameters
    pub fn none() -> Self {
        Params::Positional(Vec::new())
    }

    /// Check if no values were supplied
    pub fn is_empty(&self) -> bool {
        match self {
            Params::Positional(values) => values.is_empty(),
            Params::Keyed(values) => values.is_empty(),
            Params::Scalar(_) => false,
        }
    }

    /// Name of the container shape, used in error messages
    pub fn shape(&self) -> &'static str {
        match self {
            Params::Positional(_) => "sequence",
            Params::Keyed(_) => "map",
            Params::Scalar(value) => value.type_name(),
        }
    }

    /// Look up a keyed value
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Params::Keyed(values) => values.get(key),
            _ => None,
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::none()
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Params::none()
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }
}

impl<const N: usize> From<[Value; N]> for Params {
    fn from(values: [Value; N]) -> Self {
        Params::Positional(values.into())
    }
}

impl From<IndexMap<String, Value>> for Params {
    fn from(values: IndexMap<String, Value>) -> Self {
        Params::Keyed(values)
    }
}

impl From<HashMap<String, Value>> for Params {
    fn from(values: HashMap<String, Value>) -> Self {
        Params::Keyed(values.into_iter().collect())
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        Params::Scalar(value)
    }
}

/// One bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    /// Parameter id from the statement metadata
    pub id: String,
    /// Declared type
    pub type_code: TypeCode,
    /// Declared length
    pub length: i32,
    /// Value supplied by the caller
    pub value: Value,
}

impl BoundParameter {
    fn new(metadata: &ParameterMetadata, value: Value) -> Self {
        Self {
            id: metadata.id.clone(),
            type_code: metadata.type_code,
            length: metadata.length,
            value,
        }
    }

    /// Check if this parameter is sent through a LOB descriptor
    pub fn is_lob(&self) -> bool {
        self.type_code.is_lob() && !self.value.is_null()
    }

    /// Raw bytes of a LOB value
    pub fn lob_bytes(&self) -> Option<&[u8]> {
        if self.is_lob() {
            self.value.as_bytes()
        } else {
            None
        }
    }

    /// Encoded size in a parameters part, excluding LOB data
    pub fn encoded_len(&self) -> usize {
        if self.is_lob() {
            return crate::constants::LOB_DESCRIPTOR_SIZE;
        }
        // one type byte precedes every value
        1 + match &self.value {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Integer(_) => match self.type_code {
                TypeCode::TinyInt => 1,
                TypeCode::SmallInt => 2,
                TypeCode::Int => 4,
                TypeCode::BigInt => 8,
                TypeCode::Real => 4,
                TypeCode::Double => 8,
                _ => 16,
            },
            Value::Double(_) => match self.type_code {
                TypeCode::Real => 4,
                _ => 8,
            },
            Value::Decimal(_) => 16,
            Value::String(s) => length_indicator_len(s.len()) + s.len(),
            Value::Bytes(b) => length_indicator_len(b.len()) + b.len(),
            Value::Date(_) | Value::Time(_) => 4,
            Value::Timestamp(_) => 16,
        }
    }
}

fn length_indicator_len(len: usize) -> usize {
    match len {
        0..=245 => 1,
        246..=32_767 => 3,
        _ => 5,
    }
}

/// Bound values for one execution, in input parameter order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterRow {
    values: Vec<BoundParameter>,
}

impl ParameterRow {
    /// Bound parameters in statement order
    pub fn values(&self) -> &[BoundParameter] {
        &self.values
    }

    /// Number of bound parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row binds no parameters
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check if any parameter is a non-NULL LOB
    pub fn has_lobs(&self) -> bool {
        self.values.iter().any(BoundParameter::is_lob)
    }

    /// Encoded size of the row in a parameters part, excluding LOB data
    pub fn encoded_len(&self) -> usize {
        self.values.iter().map(BoundParameter::encoded_len).sum()
    }
}

/// Bind one row of caller values to the input parameters of `parameters`.
///
/// Output-only parameters are skipped; they never take a caller value.
pub fn bind_row(parameters: &[ParameterMetadata], params: &Params) -> Result<ParameterRow> {
    let inputs: Vec<&ParameterMetadata> = parameters.iter().filter(|p| p.mode.is_input()).collect();

    let values = match params {
        Params::Positional(values) => {
            if values.len() != inputs.len() {
                return Err(Error::ParameterCount {
                    expected: inputs.len(),
                    supplied: values.len(),
                });
            }
            inputs
                .iter()
                .zip(values)
                .map(|(metadata, value)| BoundParameter::new(metadata, value.clone()))
                .collect()
        }
        Params::Keyed(values) => {
            let missing: Vec<String> = inputs
                .iter()
                .filter(|metadata| !values.contains_key(&metadata.id))
                .map(|metadata| metadata.id.clone())
                .collect();
            if !missing.is_empty() {
                return Err(Error::MissingParameters(missing));
            }
            inputs
                .iter()
                .filter_map(|metadata| {
                    values
                        .get(&metadata.id)
                        .map(|value| BoundParameter::new(metadata, value.clone()))
                })
                .collect()
        }
        Params::Scalar(value) => return Err(Error::UnsupportedParameterShape(value.type_name())),
    };

    Ok(ParameterRow { values })
}

/// Forward cursor over the parameter rows of one prepared execution.
///
/// Rows are bound lazily. A row that fails to bind leaves the position
/// unchanged so the caller sees the same error again on retry.
#[derive(Debug, Clone)]
pub struct ParameterBatch {
    statement: Arc<PreparedStatement>,
    rows: Vec<Params>,
    position: usize,
}

impl ParameterBatch {
    /// Create a batch over `rows` for `statement`
    pub fn new(statement: Arc<PreparedStatement>, rows: Vec<Params>) -> Self {
        Self {
            statement,
            rows,
            position: 0,
        }
    }

    /// The statement the rows are bound to
    pub fn statement(&self) -> &Arc<PreparedStatement> {
        &self.statement
    }

    /// Bind and return the next row, or `None` when all rows were consumed
    pub fn advance(&mut self) -> Result<Option<ParameterRow>> {
        let Some(params) = self.rows.get(self.position) else {
            return Ok(None);
        };
        let row = bind_row(self.statement.parameters(), params)?;
        self.position += 1;
        Ok(Some(row))
    }

    /// Step back one row so it is produced again by the next `advance`
    pub fn retreat(&mut self) -> Result<()> {
        if self.position == 0 {
            return Err(Error::usage(
                "cannot step back before the first parameter row",
            ));
        }
        self.position -= 1;
        Ok(())
    }

    /// Whether rows remain to be bound
    pub fn has_next(&self) -> bool {
        self.position < self.rows.len()
    }

    /// Index of the next row
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the batch has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
