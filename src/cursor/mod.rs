//! Cursor over a HANA connection
//!
//! A cursor prepares and executes statements, interprets the replies, and
//! hands out the rows of the result sets and output parameters they
//! produce. All of its state belongs to the current logical execution and
//! is reset when the next one starts.
//!
//! # Example
//!
//! ```rust,ignore
//! use hana_rs::{Params, Value};
//!
//! let mut cursor = conn.cursor()?;
//! cursor.execute("INSERT INTO T (A) VALUES (?)", vec![Value::Integer(1)])?;
//! assert_eq!(cursor.rowcount(), 1);
//!
//! cursor.execute("SELECT A FROM T", ())?;
//! for row in cursor.fetchall()? {
//!     println!("{}", row[0]);
//! }
//! ```

mod dispatch;
mod fetch;
mod lob;
mod procedure;
mod result_stream;

use std::collections::VecDeque;
use std::sync::Arc;

use crate::batch::{ParameterBatch, Params};
use crate::connection::Connection;
use crate::constants::PERCENT_SUBSTITUTION_SIGNATURE;
use crate::error::{Error, Result};
use crate::format::format_operation;
use crate::messages::{
    ExecuteDirectMessage, ExecuteMessage, ParametersPart, Part, PrepareMessage, Request,
};
use crate::statement::{ColumnDescription, PreparedStatement};
use crate::types::{ResultSetId, StatementId};

use result_stream::ResultStream;

/// Cursor for executing statements and fetching their results
#[derive(Debug)]
pub struct Cursor {
    connection: Option<Connection>,
    arraysize: usize,
    rowcount: i64,
    rowcount_reported: bool,
    executed: bool,
    stream: ResultStream,
}

impl Cursor {
    pub(crate) fn new(connection: Connection) -> Self {
        let arraysize = connection.config().arraysize;
        Self {
            connection: Some(connection),
            arraysize,
            rowcount: -1,
            rowcount_reported: false,
            executed: false,
            stream: ResultStream::default(),
        }
    }

    fn connection(&self) -> Result<&Connection> {
        match &self.connection {
            Some(connection) if !connection.is_closed() => Ok(connection),
            _ => Err(Error::CursorClosed),
        }
    }

    fn send(&self, request: &Request) -> Result<crate::messages::Reply> {
        self.connection()?.send_request(request)
    }

    fn auto_commit(&self) -> Result<bool> {
        Ok(self.connection()?.config().auto_commit)
    }

    fn max_payload_size(&self) -> Result<usize> {
        Ok(self.connection()?.config().max_payload_size)
    }

    /// Clear all state of the previous execution
    fn reset(&mut self) {
        self.rowcount = -1;
        self.rowcount_reported = false;
        self.executed = false;
        self.stream.reset();
    }

    /// Record the affected row counts of one reply.
    ///
    /// Counts from several requests of one execution add up; any negative
    /// count makes the total unknown.
    fn record_rows_affected(&mut self, counts: &[i64]) {
        let count = if counts.iter().any(|c| *c < 0) {
            -1
        } else {
            counts.iter().sum()
        };
        self.rowcount = if !self.rowcount_reported {
            count
        } else if self.rowcount < 0 || count < 0 {
            -1
        } else {
            self.rowcount + count
        };
        self.rowcount_reported = true;
    }

    /// Check if the cursor, or its connection, is closed
    pub fn is_closed(&self) -> bool {
        self.connection().is_err()
    }

    /// Rows affected by the last execution, or -1 when unknown
    pub fn rowcount(&self) -> i64 {
        self.rowcount
    }

    /// Default number of rows for [`Cursor::fetchmany`]
    pub fn arraysize(&self) -> usize {
        self.arraysize
    }

    /// Set the default number of rows for [`Cursor::fetchmany`]
    pub fn set_arraysize(&mut self, arraysize: usize) -> Result<()> {
        if arraysize == 0 {
            return Err(Error::usage("arraysize must be positive"));
        }
        self.arraysize = arraysize;
        Ok(())
    }

    /// Column descriptions of the selected result set
    pub fn description(&self) -> Option<&[ColumnDescription]> {
        self.stream.current().map(|state| state.description.as_slice())
    }

    /// Ids of the result sets opened by the last execution, in arrival order
    pub fn result_set_ids(&self) -> Vec<ResultSetId> {
        self.stream.ids()
    }

    /// Ids of all statements prepared on the connection
    pub fn prepared_statement_ids(&self) -> Result<Vec<StatementId>> {
        self.connection()?.cached_statement_ids()
    }

    /// Look up a prepared statement by id
    pub fn get_prepared_statement(&self, id: &StatementId) -> Result<Arc<PreparedStatement>> {
        self.connection()?
            .cached_statement(id)?
            .ok_or_else(|| Error::usage(format!("unknown prepared statement {}", id)))
    }

    /// Prepare `sql` on the server and cache the statement.
    ///
    /// Returns the server-assigned statement id.
    pub fn prepare(&mut self, sql: &str) -> Result<StatementId> {
        let connection = self.connection()?;
        let request = PrepareMessage::new(sql).build_request(connection.config().auto_commit);
        let reply = connection.send_request(&request)?;

        let mut statement_id = None;
        let mut parameters = None;
        let mut result_metadata = None;
        for part in reply.segments.into_iter().take(1).flat_map(|s| s.parts) {
            match part {
                Part::StatementId(id) => statement_id = Some(id),
                Part::ParameterMetadata(metadata) => parameters = Some(metadata),
                Part::ResultSetMetadata(metadata) => result_metadata = Some(metadata),
                _ => {}
            }
        }

        let statement_id = statement_id
            .ok_or_else(|| Error::interface("prepare reply without statement id"))?;
        let statement = PreparedStatement::new(
            statement_id,
            sql,
            parameters.unwrap_or_default(),
            result_metadata,
        );
        tracing::trace!(
            statement_id = %statement_id,
            parameters = statement.parameters().len(),
            sql = sql,
            "Prepared statement"
        );
        connection.cache_statement(statement)?;
        Ok(statement_id)
    }

    /// Execute a prepared statement once per parameter row.
    ///
    /// An empty `rows` executes the statement once without parameters.
    pub fn execute_prepared(
        &mut self,
        statement: &Arc<PreparedStatement>,
        rows: Vec<Params>,
    ) -> Result<()> {
        let rows = if rows.is_empty() {
            vec![Params::none()]
        } else {
            rows
        };
        self.run_prepared(statement, rows)
    }

    fn run_prepared(&mut self, statement: &Arc<PreparedStatement>, rows: Vec<Params>) -> Result<()> {
        self.connection()?;
        self.reset();

        let auto_commit = self.auto_commit()?;
        let max_payload = self.max_payload_size()?;
        let mut batch = ParameterBatch::new(Arc::clone(statement), rows);

        while batch.has_next() {
            let (parameters, mut unwritten_lobs) = ParametersPart::pack(&mut batch, max_payload)?;
            let request = ExecuteMessage::new(statement.id(), Some(parameters)).build_request(auto_commit);
            let reply = self.send(&request)?;
            self.handle_reply(reply, Some(statement.as_ref()), &mut unwritten_lobs)?;
            if !unwritten_lobs.is_empty() {
                return Err(Error::interface(format!(
                    "execute reply left {} unwritten LOBs without locators",
                    unwritten_lobs.len()
                )));
            }
        }
        Ok(())
    }

    fn execute_direct(&mut self, sql: &str) -> Result<()> {
        self.reset();
        self.send_direct(sql)
    }

    /// Execute `sql` directly as part of the current execution
    fn send_direct(&mut self, sql: &str) -> Result<()> {
        let request = ExecuteDirectMessage::new(sql).build_request(self.auto_commit()?);
        let reply = self.send(&request)?;
        self.handle_reply(reply, None, &mut VecDeque::new())
    }

    /// Execute `sql`.
    ///
    /// Without parameters the statement is executed directly; otherwise it
    /// goes through [`Cursor::executemany`] with a single row.
    pub fn execute(&mut self, sql: &str, params: impl Into<Params>) -> Result<&mut Self> {
        self.connection()?;
        let params = params.into();
        if params.is_empty() {
            self.execute_direct(sql)?;
        } else {
            self.executemany(sql, vec![params])?;
        }
        Ok(self)
    }

    /// Prepare `sql` and execute it for every row of parameters.
    ///
    /// When the server rejects the statement because of a literal `%`, each
    /// row is substituted into the SQL text on the client and executed
    /// directly instead.
    pub fn executemany<I>(&mut self, sql: &str, rows: I) -> Result<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Params>,
    {
        let rows: Vec<Params> = rows.into_iter().map(Into::into).collect();
        match self.prepare(sql) {
            Ok(statement_id) => {
                let statement = self.get_prepared_statement(&statement_id)?;
                self.run_prepared(&statement, rows)?;
            }
            Err(err)
                if err
                    .database_message()
                    .is_some_and(|message| message.contains(PERCENT_SUBSTITUTION_SIGNATURE)) =>
            {
                tracing::debug!(
                    rows = rows.len(),
                    "Server rejected percent placeholders, substituting on the client"
                );
                self.reset();
                for row in &rows {
                    let operation = format_operation(sql, row)?;
                    self.send_direct(&operation)?;
                }
            }
            Err(err) => return Err(err),
        }
        Ok(self)
    }

    /// Advance to the next result set.
    ///
    /// Pending output parameters count as the first source. Returns `false`
    /// when nothing further is available.
    pub fn nextset(&mut self) -> Result<bool> {
        self.connection()?;
        Ok(self.stream.next_result_set())
    }

    /// Close the cursor. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.connection.take().is_some() {
            self.stream.reset();
            tracing::trace!("Cursor closed");
        }
    }
}
