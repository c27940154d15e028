//! Stored procedure calls

use indexmap::IndexMap;

use crate::batch::Params;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::format::escape_value;
use crate::row::Value;

impl Cursor {
    /// Call a stored procedure and return its parameters with the output
    /// values filled in.
    ///
    /// `name` is either `PROC` (looked up in the current schema) or
    /// `SCHEMA.PROC`. Input values may be keyed by parameter name or given
    /// in order; the result is always keyed by parameter name.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut params = IndexMap::new();
    /// params.insert("A".to_string(), Value::Integer(2));
    /// let result = cursor.callproc("ADD_ONE", params)?;
    /// assert_eq!(result["B"], Value::Integer(3));
    /// ```
    pub fn callproc(
        &mut self,
        name: &str,
        params: impl Into<Params>,
    ) -> Result<IndexMap<String, Value>> {
        self.connection()?;
        let params = params.into();

        let (schema_filter, procedure) = match name.split('.').collect::<Vec<_>>().as_slice() {
            [procedure] => ("CURRENT_SCHEMA".to_string(), *procedure),
            [schema, procedure] => (escape_value(&Value::from(*schema))?, *procedure),
            _ => {
                return Err(Error::usage(format!(
                    "invalid name for stored procedure: '{}'",
                    name
                )))
            }
        };

        let count_sql = format!(
            "SELECT NUM_INPUT_PARAMS, NUM_INOUT_PARAMS, NUM_OUTPUT_PARAMS \
             FROM SYS.P_PROCEDURES_ WHERE SCHEMA={} AND NAME={}",
            schema_filter,
            escape_value(&Value::from(procedure))?
        );
        self.execute(&count_sql, ())?;
        let counts = self
            .fetchone()?
            .ok_or_else(|| Error::database(format!("Stored procedure '{}' does not exist", name)))?;
        let param_count = counts
            .iter()
            .map(|value| {
                value
                    .as_i64()
                    .and_then(|count| usize::try_from(count).ok())
                    .ok_or_else(|| {
                        Error::DataConversion(format!("invalid parameter count: {}", value))
                    })
            })
            .sum::<Result<usize>>()?;

        let placeholders = vec!["?"; param_count].join(", ");
        let call_sql = format!("CALL {} ({})", name, placeholders);
        let statement_id = self.prepare(&call_sql)?;
        let statement = self.get_prepared_statement(&statement_id)?;
        tracing::debug!(
            procedure = name,
            parameters = param_count,
            statement_id = %statement_id,
            "Calling stored procedure"
        );

        let mut result: IndexMap<String, Value> = match &params {
            Params::Keyed(values) => values.clone(),
            Params::Positional(values) => statement
                .input_parameters()
                .map(|p| p.id.clone())
                .zip(values.iter().cloned())
                .collect(),
            Params::Scalar(_) => IndexMap::new(),
        };

        self.execute_prepared(&statement, vec![params])?;

        if self.stream.has_output_params() {
            if let Some(row) = self.fetchone()? {
                for (parameter, value) in statement.output_parameters().zip(row) {
                    result.insert(parameter.id.clone(), value);
                }
            }
            self.nextset()?;
        }
        Ok(result)
    }
}
