//! Prepare and execute messages
//!
//! This module builds the requests that prepare SQL text, execute it
//! directly, or execute a prepared statement with bound parameter rows.

use bytes::Bytes;
use std::collections::VecDeque;

use crate::batch::{ParameterBatch, ParameterRow};
use crate::constants::MessageType;
use crate::error::Result;
use crate::messages::{Request, RequestPart};
use crate::types::{LobBuffer, StatementId};

/// Request preparing SQL text on the server
#[derive(Debug)]
pub struct PrepareMessage<'a> {
    sql: &'a str,
}

impl<'a> PrepareMessage<'a> {
    /// Create a new prepare message
    pub fn new(sql: &'a str) -> Self {
        Self { sql }
    }

    /// Build the prepare request
    pub fn build_request(&self, auto_commit: bool) -> Request {
        Request::new(MessageType::Prepare, auto_commit)
            .with_part(RequestPart::Command(self.sql.to_string()))
    }
}

/// Request executing SQL text without preparing it
#[derive(Debug)]
pub struct ExecuteDirectMessage<'a> {
    sql: &'a str,
}

impl<'a> ExecuteDirectMessage<'a> {
    /// Create a new execute-direct message
    pub fn new(sql: &'a str) -> Self {
        Self { sql }
    }

    /// Build the execute-direct request
    pub fn build_request(&self, auto_commit: bool) -> Request {
        Request::new(MessageType::ExecuteDirect, auto_commit)
            .with_part(RequestPart::Command(self.sql.to_string()))
    }
}

/// Request executing a prepared statement
#[derive(Debug)]
pub struct ExecuteMessage {
    statement_id: StatementId,
    parameters: Option<ParametersPart>,
}

impl ExecuteMessage {
    /// Create a new execute message
    pub fn new(statement_id: StatementId, parameters: Option<ParametersPart>) -> Self {
        Self {
            statement_id,
            parameters,
        }
    }

    /// Build the execute request
    ///
    /// A parameters part without rows is left out.
    pub fn build_request(self, auto_commit: bool) -> Request {
        let request = Request::new(MessageType::Execute, auto_commit)
            .with_part(RequestPart::StatementId(self.statement_id));
        match self.parameters {
            Some(parameters) if !parameters.rows.is_empty() => {
                request.with_part(RequestPart::Parameters(parameters))
            }
            _ => request,
        }
    }
}

/// LOB bytes sent inline after the row data of a parameters part
#[derive(Debug, Clone, PartialEq)]
pub struct InlineLob {
    /// Row within the part
    pub row: usize,
    /// Parameter index within the row
    pub parameter: usize,
    /// Bytes sent inline
    pub data: Bytes,
    /// Whether the inline bytes complete the value
    pub complete: bool,
}

/// Bound parameter rows of one execute request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParametersPart {
    /// Rows in send order
    pub rows: Vec<ParameterRow>,
    /// LOB data following the rows
    pub inline_lobs: Vec<InlineLob>,
}

impl ParametersPart {
    /// Pack as many rows from `batch` as fit into `max_payload` bytes.
    ///
    /// The first row is always taken, even when it alone exceeds the
    /// budget. A later row that does not fit is stepped back and left for
    /// the next request. A row holding LOB values ends the part; LOB bytes
    /// that do not fit inline are returned as buffers to be written once
    /// the server hands out locators for them.
    pub fn pack(
        batch: &mut ParameterBatch,
        max_payload: usize,
    ) -> Result<(ParametersPart, VecDeque<LobBuffer>)> {
        let mut part = ParametersPart::default();
        let mut unwritten = VecDeque::new();
        let mut used = 0usize;

        while let Some(row) = batch.advance()? {
            let row_len = row.encoded_len();
            if !part.rows.is_empty() && used + row_len > max_payload {
                batch.retreat()?;
                break;
            }
            used += row_len;

            if !row.has_lobs() {
                part.rows.push(row);
                continue;
            }

            let row_index = part.rows.len();
            for (index, param) in row.values().iter().enumerate() {
                let Some(bytes) = param.lob_bytes() else {
                    continue;
                };
                let data = Bytes::copy_from_slice(bytes);
                let room = max_payload.saturating_sub(used);
                let sent = room.min(data.len());
                used += sent;
                part.inline_lobs.push(InlineLob {
                    row: row_index,
                    parameter: index,
                    data: data.slice(..sent),
                    complete: sent == data.len(),
                });
                if sent < data.len() {
                    unwritten.push_back(LobBuffer::new(param.type_code, data, sent));
                }
            }
            part.rows.push(row);
            break;
        }

        tracing::trace!(
            rows = part.rows.len(),
            payload = used,
            unwritten_lobs = unwritten.len(),
            "Packed parameters part"
        );
        Ok((part, unwritten))
    }

    /// Number of rows in the part
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the part has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
