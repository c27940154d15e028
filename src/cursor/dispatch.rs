//! Reply routing by function code

use std::collections::VecDeque;

use crate::constants::FunctionCode;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::messages::{Part, Reply};
use crate::statement::PreparedStatement;
use crate::types::LobBuffer;

impl Cursor {
    /// Route every segment of an execute reply to its handler.
    ///
    /// `unwritten_lobs` holds the LOB data of the request that did not fit
    /// inline; it is drained when the server asks for it.
    pub(super) fn handle_reply(
        &mut self,
        reply: Reply,
        statement: Option<&PreparedStatement>,
        unwritten_lobs: &mut VecDeque<LobBuffer>,
    ) -> Result<()> {
        for segment in reply.segments {
            let function_code = segment.function_code()?;
            match function_code {
                FunctionCode::Select | FunctionCode::SelectForUpdate => {
                    self.handle_select(segment.parts, statement)?
                }
                FunctionCode::Insert | FunctionCode::Update | FunctionCode::Delete => {
                    self.handle_upsert(segment.parts, unwritten_lobs)?
                }
                FunctionCode::Ddl => {}
                FunctionCode::DbProcedureCall | FunctionCode::DbProcedureCallWithResult => {
                    self.handle_procedure_call(segment.parts, statement)?
                }
                FunctionCode::Nil
                | FunctionCode::Explain
                | FunctionCode::Fetch
                | FunctionCode::Commit
                | FunctionCode::Rollback
                | FunctionCode::Savepoint
                | FunctionCode::Connect
                | FunctionCode::WriteLob
                | FunctionCode::ReadLob
                | FunctionCode::Ping
                | FunctionCode::Disconnect
                | FunctionCode::CloseCursor
                | FunctionCode::FindLob
                | FunctionCode::AbapStream
                | FunctionCode::XaStart
                | FunctionCode::XaJoin => {
                    return Err(Error::UnsupportedFunctionCode(function_code));
                }
            }
        }
        self.executed = true;
        Ok(())
    }

    fn handle_select(
        &mut self,
        parts: Vec<Part>,
        statement: Option<&PreparedStatement>,
    ) -> Result<()> {
        self.rowcount = -1;
        if let Some(metadata) = statement.and_then(PreparedStatement::result_metadata) {
            self.stream.absorb_metadata(metadata)?;
        }

        for part in parts {
            match part {
                Part::ResultSetId(id) => self.stream.absorb_id(id),
                Part::ResultSetMetadata(metadata) => self.stream.absorb_metadata(&metadata)?,
                Part::ResultSet(rows) => self.stream.absorb_rows(rows)?,
                // warnings were logged by the connection
                Part::StatementContext(_) | Part::TransactionFlags(_) | Part::Error(_) => {}
                other => {
                    return Err(Error::UnexpectedPartKind {
                        context: "select statement reply",
                        kind: other.kind(),
                    })
                }
            }
        }
        Ok(())
    }

    fn handle_upsert(
        &mut self,
        parts: Vec<Part>,
        unwritten_lobs: &mut VecDeque<LobBuffer>,
    ) -> Result<()> {
        for part in parts {
            match part {
                Part::RowsAffected(counts) => self.record_rows_affected(&counts),
                Part::WriteLobReply(locator_ids) => {
                    super::lob::attach_locators(unwritten_lobs, &locator_ids)?;
                    self.write_lobs(unwritten_lobs)?;
                }
                Part::StatementContext(_) | Part::TransactionFlags(_) | Part::Error(_) => {}
                other => {
                    return Err(Error::UnexpectedPartKind {
                        context: "insert or update statement reply",
                        kind: other.kind(),
                    })
                }
            }
        }
        Ok(())
    }

    fn handle_procedure_call(
        &mut self,
        parts: Vec<Part>,
        statement: Option<&PreparedStatement>,
    ) -> Result<()> {
        for part in parts {
            match part {
                Part::RowsAffected(counts) => self.record_rows_affected(&counts),
                Part::OutputParameters(output) => {
                    let rows = output.unpack_rows(statement.map(PreparedStatement::parameters))?;
                    self.stream.absorb_output_params(rows);
                }
                Part::ResultSetMetadata(metadata) => self.stream.absorb_metadata(&metadata)?,
                Part::ResultSetId(id) => self.stream.absorb_id(id),
                Part::ResultSet(rows) => self.stream.absorb_rows(rows)?,
                Part::StatementContext(_) | Part::TransactionFlags(_) | Part::Error(_) => {}
                other => {
                    return Err(Error::UnexpectedPartKind {
                        context: "stored procedure call reply",
                        kind: other.kind(),
                    })
                }
            }
        }
        Ok(())
    }
}
